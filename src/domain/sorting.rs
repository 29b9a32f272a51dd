use crate::domain::task::{normalize_key, Task};
use crate::error::BoardError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ordering applied inside each board column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortPolicy {
    /// Manual drag order
    #[default]
    None,
    /// Urgent first, then high, medium, low, unrecognized
    #[serde(alias = "priority")]
    PriorityDesc,
    /// Earliest due date first, undated tasks last
    #[serde(alias = "due-date", alias = "dueDate")]
    DueDateAsc,
}

impl FromStr for SortPolicy {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "none" | "" => Ok(SortPolicy::None),
            "priority" | "priority_desc" => Ok(SortPolicy::PriorityDesc),
            "due_date" | "duedate" | "due_date_asc" => Ok(SortPolicy::DueDateAsc),
            _ => Err(BoardError::InvalidSortPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::PriorityDesc => write!(f, "priority-desc"),
            Self::DueDateAsc => write!(f, "due-date-asc"),
        }
    }
}

/// Sorts one column in place according to `policy`.
///
/// The sort is stable: tasks with equal keys keep their current relative
/// order, so manual drag order acts as the tie-breaker. `SortPolicy::None`
/// leaves the slice untouched.
///
/// # Examples
/// ```
/// use ascenda_board::domain::sorting::{sort_tasks, SortPolicy};
/// use ascenda_board::domain::task::{Priority, Task, TaskId};
///
/// let mut tasks = vec![
///     Task::new(TaskId::new("1"), "A".to_string()).with_priority(Priority::Low),
///     Task::new(TaskId::new("2"), "B".to_string()).with_priority(Priority::Urgent),
/// ];
///
/// sort_tasks(&mut tasks, SortPolicy::PriorityDesc);
/// assert_eq!(tasks[0].id.as_str(), "2");
/// ```
pub fn sort_tasks(tasks: &mut [Task], policy: SortPolicy) {
    match policy {
        SortPolicy::None => {}
        SortPolicy::PriorityDesc => {
            tasks.sort_by(|a, b| a.priority_rank().cmp(&b.priority_rank()).reverse())
        }
        SortPolicy::DueDateAsc => {
            tasks.sort_by(|a, b| compare_option_dates(a.due_date, b.due_date))
        }
    }
}

/// Compare optional dates with `None` always sorting to the end
fn compare_option_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => a_date.cmp(&b_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
