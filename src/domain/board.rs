use crate::domain::sorting::{sort_tasks, SortPolicy};
use crate::domain::task::{normalize_key, Task, TaskId, TaskRecord, TaskStatus};
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Configuration for a kanban board column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub status: TaskStatus,
}

impl Column {
    pub fn new(name: String, status: TaskStatus) -> Self {
        Self { name, status }
    }
}

/// Board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    pub columns: Vec<Column>,
    /// Sort policy applied when the board is first built
    #[serde(default)]
    pub default_sort: SortPolicy,
    /// Extra status labels used by the task collection, e.g. `"Backlog" -> todo`
    #[serde(default)]
    pub status_aliases: HashMap<String, TaskStatus>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Tasks".to_string(),
            columns: TaskStatus::ALL
                .iter()
                .map(|status| Column::new(status.to_string(), *status))
                .collect(),
            default_sort: SortPolicy::None,
            status_aliases: HashMap::new(),
        }
    }
}

impl BoardConfig {
    /// Parses and validates a JSON board configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BoardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every status has exactly one column and that no two
    /// aliases spell the same label with different statuses
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.status) {
                return Err(BoardError::ConfigError(format!(
                    "status '{}' has more than one column",
                    column.status.as_str()
                )));
            }
        }

        if let Some(missing) = TaskStatus::ALL.iter().find(|s| !seen.contains(*s)) {
            return Err(BoardError::ConfigError(format!(
                "status '{}' has no column",
                missing.as_str()
            )));
        }

        let mut aliases: HashMap<String, (&str, TaskStatus)> = HashMap::new();
        for (alias, status) in &self.status_aliases {
            let previous = aliases.insert(normalize_key(alias), (alias.as_str(), *status));
            if let Some((other, other_status)) = previous {
                if other_status != *status {
                    return Err(BoardError::ConfigError(format!(
                        "aliases '{}' and '{}' name the same label with different statuses",
                        other, alias
                    )));
                }
            }
        }

        Ok(())
    }

    /// Gets the column configuration for a status
    pub fn column_for_status(&self, status: TaskStatus) -> Option<&Column> {
        self.columns.iter().find(|col| col.status == status)
    }

    /// Resolves a raw status string, checking configured aliases first
    pub fn resolve_status(&self, raw: &str) -> Result<TaskStatus> {
        let key = normalize_key(raw);
        if let Some(status) = self
            .status_aliases
            .iter()
            .find(|(alias, _)| normalize_key(alias) == key)
            .map(|(_, status)| *status)
        {
            return Ok(status);
        }
        raw.parse()
    }
}

/// Why a record was kept off the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineReason {
    UnknownStatus,
    DuplicateId,
}

/// A record that could not be placed in any column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedRecord {
    pub record: TaskRecord,
    pub reason: QuarantineReason,
}

/// A position inside a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSlot {
    pub status: TaskStatus,
    pub index: usize,
}

impl ColumnSlot {
    pub fn new(status: TaskStatus, index: usize) -> Self {
        Self { status, index }
    }
}

/// Result of a drag gesture as reported by the UI layer.
///
/// `destination` is `None` when the card was dropped outside any column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub source: ColumnSlot,
    pub destination: Option<ColumnSlot>,
}

/// Kanban board state: one ordered bucket of tasks per status
#[derive(Debug, Clone, Default)]
pub struct Board {
    columns: [Vec<Task>; 4],
    sort_policy: SortPolicy,
    quarantined: Vec<QuarantinedRecord>,
}

impl Board {
    pub fn new(sort_policy: SortPolicy) -> Self {
        Self {
            sort_policy,
            ..Self::default()
        }
    }

    /// Rebuilds the board from a full task listing.
    ///
    /// Records whose status cannot be resolved, and records repeating an id
    /// already placed, are set aside in the quarantine instead of a column.
    pub fn load<I>(&mut self, records: I, config: &BoardConfig)
    where
        I: IntoIterator<Item = TaskRecord>,
    {
        self.columns.iter_mut().for_each(Vec::clear);
        self.quarantined.clear();

        let mut seen: HashSet<TaskId> = HashSet::new();
        for record in records {
            let status = match config.resolve_status(&record.status) {
                Ok(status) => status,
                Err(_) => {
                    tracing::warn!(
                        task_id = %record.id,
                        status = %record.status,
                        "task has unknown status, keeping it off the board"
                    );
                    self.quarantine(record, QuarantineReason::UnknownStatus);
                    continue;
                }
            };

            if !seen.insert(record.id.clone()) {
                tracing::warn!(task_id = %record.id, "duplicate task id, keeping it off the board");
                self.quarantine(record, QuarantineReason::DuplicateId);
                continue;
            }

            self.columns[status.index()].push(record.into_task(status));
        }

        self.apply_sort_policy();
        tracing::debug!(
            tasks = self.len(),
            quarantined = self.quarantined.len(),
            "board loaded"
        );
    }

    fn quarantine(&mut self, record: TaskRecord, reason: QuarantineReason) {
        self.quarantined.push(QuarantinedRecord { record, reason });
    }

    /// Switches the sort policy and re-sorts every column
    pub fn set_sort_policy(&mut self, policy: SortPolicy) {
        self.sort_policy = policy;
        self.apply_sort_policy();
    }

    fn apply_sort_policy(&mut self) {
        let policy = self.sort_policy;
        for column in self.columns.iter_mut() {
            sort_tasks(column, policy);
        }
    }

    /// Moves a task to another position in the same column.
    ///
    /// Returns `false` and leaves the board untouched if either index is out
    /// of range. Under an active sort policy the column is re-sorted right
    /// after the move, so the manual position only survives among ties.
    pub fn move_within_column(&mut self, status: TaskStatus, from: usize, to: usize) -> bool {
        let policy = self.sort_policy;
        let column = &mut self.columns[status.index()];
        if from >= column.len() || to >= column.len() {
            tracing::debug!(%status, from, to, len = column.len(), "reorder out of range");
            return false;
        }

        let task = column.remove(from);
        column.insert(to, task);
        sort_tasks(column, policy);
        true
    }

    /// Moves a task into another column and updates its status.
    ///
    /// `to` may equal the destination length to append. Returns the moved
    /// task, or `None` when an index is out of range. Moving within the same
    /// column delegates to [`Board::move_within_column`] and also returns
    /// `None` since no status changes.
    pub fn move_across_columns(
        &mut self,
        from_status: TaskStatus,
        from: usize,
        to_status: TaskStatus,
        to: usize,
    ) -> Option<Task> {
        if from_status == to_status {
            self.move_within_column(from_status, from, to);
            return None;
        }

        let source_len = self.columns[from_status.index()].len();
        let dest_len = self.columns[to_status.index()].len();
        if from >= source_len || to > dest_len {
            tracing::debug!(
                %from_status, from, %to_status, to,
                source_len, dest_len,
                "move out of range"
            );
            return None;
        }

        let mut task = self.columns[from_status.index()].remove(from);
        task.set_status(to_status);

        let policy = self.sort_policy;
        let dest = &mut self.columns[to_status.index()];
        dest.insert(to, task.clone());
        sort_tasks(dest, policy);

        Some(task)
    }

    /// Tasks in one column, in display order
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        &self.columns[status.index()]
    }

    /// All columns in board order
    pub fn columns(&self) -> impl Iterator<Item = (TaskStatus, &[Task])> {
        TaskStatus::ALL
            .into_iter()
            .map(move |status| (status, self.column(status)))
    }

    /// All tasks on the board, column by column
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flatten()
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sort_policy(&self) -> SortPolicy {
        self.sort_policy
    }

    /// Records left out of the last load
    pub fn quarantined(&self) -> &[QuarantinedRecord] {
        &self.quarantined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, status: &str) -> TaskRecord {
        TaskRecord::new(id, format!("Task {}", id), status)
    }

    fn loaded(records: Vec<TaskRecord>) -> Board {
        let mut board = Board::default();
        board.load(records, &BoardConfig::default());
        board
    }

    fn ids(board: &Board, status: TaskStatus) -> Vec<&str> {
        board.column(status).iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = BoardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.columns.len(), 4);
        assert_eq!(
            config.column_for_status(TaskStatus::AwaitingReview).unwrap().name,
            "Awaiting Review"
        );
    }

    #[test]
    fn test_config_rejects_duplicate_and_missing_columns() {
        let mut config = BoardConfig::default();
        config.columns[3].status = TaskStatus::Todo;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, BoardError::ConfigError(_)));

        let mut config = BoardConfig::default();
        config.columns.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_json_with_aliases() {
        let json = r#"{
            "name": "Interns",
            "columns": [
                {"name": "Backlog", "status": "todo"},
                {"name": "Doing", "status": "in_progress"},
                {"name": "Review", "status": "awaiting_review"},
                {"name": "Shipped", "status": "done"}
            ],
            "default_sort": "priority",
            "status_aliases": {"Backlog": "todo", "Shipped": "done"}
        }"#;

        let config = BoardConfig::from_json(json).unwrap();
        assert_eq!(config.default_sort, SortPolicy::PriorityDesc);
        assert_eq!(config.resolve_status("backlog").unwrap(), TaskStatus::Todo);
        assert_eq!(config.resolve_status("SHIPPED").unwrap(), TaskStatus::Done);
        assert_eq!(config.resolve_status("Pendente").unwrap(), TaskStatus::Todo);
        assert!(config.resolve_status("archived").is_err());
    }

    #[test]
    fn test_load_empty_yields_four_empty_columns() {
        let board = loaded(vec![]);
        assert!(board.is_empty());
        assert_eq!(board.columns().count(), 4);
        assert!(board.columns().all(|(_, tasks)| tasks.is_empty()));
    }

    #[test]
    fn test_load_partitions_by_status() {
        let board = loaded(vec![
            record("1", "todo"),
            record("2", "in_progress"),
            record("3", "Aguardando Revisão"),
            record("4", "done"),
            record("5", "Pendente"),
        ]);

        assert_eq!(ids(&board, TaskStatus::Todo), vec!["1", "5"]);
        assert_eq!(ids(&board, TaskStatus::InProgress), vec!["2"]);
        assert_eq!(ids(&board, TaskStatus::AwaitingReview), vec!["3"]);
        assert_eq!(ids(&board, TaskStatus::Done), vec!["4"]);
        assert_eq!(board.column(TaskStatus::InProgress)[0].status, TaskStatus::InProgress);
    }

    #[test]
    fn test_load_union_matches_known_statuses_without_duplicates() {
        let records = vec![
            record("1", "todo"),
            record("2", "archived"),
            record("3", "done"),
            record("1", "done"),
            record("4", "in_progress"),
        ];
        let board = loaded(records);

        let mut all: Vec<&str> = board.tasks().map(|t| t.id.as_str()).collect();
        all.sort();
        assert_eq!(all, vec!["1", "3", "4"]);
        assert_eq!(board.len(), 3);

        let reasons: Vec<QuarantineReason> =
            board.quarantined().iter().map(|q| q.reason).collect();
        assert_eq!(
            reasons,
            vec![QuarantineReason::UnknownStatus, QuarantineReason::DuplicateId]
        );
        assert_eq!(board.quarantined()[0].record.id.as_str(), "2");
    }

    #[test]
    fn test_reload_replaces_previous_state() {
        let mut board = loaded(vec![record("1", "todo"), record("x", "bogus")]);
        board.load(vec![record("2", "done")], &BoardConfig::default());

        assert!(board.find(&TaskId::new("1")).is_none());
        assert!(board.find(&TaskId::new("2")).is_some());
        assert!(board.quarantined().is_empty());
    }

    #[test]
    fn test_priority_sort_is_independent_of_input_order() {
        let high = record("1", "Pendente").with_priority("high");
        let low = record("2", "Pendente").with_priority("low");

        let mut board = loaded(vec![high.clone(), low.clone()]);
        board.set_sort_policy(SortPolicy::PriorityDesc);
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["1", "2"]);

        let mut board = loaded(vec![low, high]);
        board.set_sort_policy(SortPolicy::PriorityDesc);
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["1", "2"]);
    }

    #[test]
    fn test_priority_sort_orders_every_column() {
        let mut board = loaded(vec![
            record("a", "todo").with_priority("low"),
            record("b", "todo").with_priority("urgent"),
            record("c", "todo"),
            record("d", "done").with_priority("medium"),
            record("e", "done").with_priority("high"),
            record("f", "done").with_priority("nonsense"),
        ]);

        board.set_sort_policy(SortPolicy::PriorityDesc);

        for (_, tasks) in board.columns() {
            for pair in tasks.windows(2) {
                assert!(pair[0].priority_rank() >= pair[1].priority_rank());
            }
        }
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["b", "c", "a"]);
        assert_eq!(ids(&board, TaskStatus::Done), vec!["e", "d", "f"]);
    }

    #[test]
    fn test_due_date_sort_puts_undated_last() {
        let mut board = loaded(vec![
            record("a", "todo"),
            record("b", "todo").with_due_date("2024-05-01"),
            record("c", "todo").with_due_date("2024-02-01"),
            record("d", "todo"),
        ]);

        board.set_sort_policy(SortPolicy::DueDateAsc);

        assert_eq!(ids(&board, TaskStatus::Todo), vec!["c", "b", "a", "d"]);
        let dated: Vec<_> = board
            .column(TaskStatus::Todo)
            .iter()
            .filter_map(|t| t.due_date)
            .collect();
        assert!(dated.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_load_applies_active_policy() {
        let mut board = Board::new(SortPolicy::PriorityDesc);
        board.load(
            vec![
                record("1", "todo").with_priority("low"),
                record("2", "todo").with_priority("urgent"),
            ],
            &BoardConfig::default(),
        );
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["2", "1"]);
    }

    #[test]
    fn test_move_within_column_and_back_restores_order() {
        let mut board = loaded(vec![
            record("1", "todo"),
            record("2", "todo"),
            record("3", "todo"),
            record("4", "todo"),
        ]);

        assert!(board.move_within_column(TaskStatus::Todo, 0, 2));
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["2", "3", "1", "4"]);

        assert!(board.move_within_column(TaskStatus::Todo, 2, 0));
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_move_within_column_out_of_range_is_noop() {
        let mut board = loaded(vec![record("1", "todo"), record("2", "todo")]);

        assert!(!board.move_within_column(TaskStatus::Todo, 2, 0));
        assert!(!board.move_within_column(TaskStatus::Todo, 0, 2));
        assert!(!board.move_within_column(TaskStatus::Done, 0, 0));
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["1", "2"]);
    }

    #[test]
    fn test_move_within_column_resorted_under_policy() {
        let mut board = loaded(vec![
            record("1", "todo").with_priority("urgent"),
            record("2", "todo").with_priority("low"),
            record("3", "todo").with_priority("low"),
        ]);
        board.set_sort_policy(SortPolicy::PriorityDesc);

        // Dragging a low task above the urgent one does not stick...
        assert!(board.move_within_column(TaskStatus::Todo, 2, 0));
        // ...but it does reorder it among its equals.
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_move_across_columns() {
        let mut board = loaded(vec![record("1", "todo"), record("2", "todo")]);

        let moved = board
            .move_across_columns(TaskStatus::Todo, 0, TaskStatus::Done, 0)
            .unwrap();

        assert_eq!(moved.id.as_str(), "1");
        assert_eq!(moved.status, TaskStatus::Done);
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["2"]);
        assert_eq!(ids(&board, TaskStatus::Done), vec!["1"]);
        assert_eq!(board.column(TaskStatus::Done)[0].status, TaskStatus::Done);
    }

    #[test]
    fn test_move_across_columns_appends_at_end() {
        let mut board = loaded(vec![
            record("1", "todo"),
            record("2", "done"),
            record("3", "done"),
        ]);

        assert!(board
            .move_across_columns(TaskStatus::Todo, 0, TaskStatus::Done, 2)
            .is_some());
        assert_eq!(ids(&board, TaskStatus::Done), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_move_across_columns_out_of_range_is_noop() {
        let mut board = loaded(vec![record("1", "todo"), record("2", "done")]);

        assert!(board
            .move_across_columns(TaskStatus::Todo, 1, TaskStatus::Done, 0)
            .is_none());
        assert!(board
            .move_across_columns(TaskStatus::Todo, 0, TaskStatus::Done, 2)
            .is_none());

        assert_eq!(ids(&board, TaskStatus::Todo), vec!["1"]);
        assert_eq!(ids(&board, TaskStatus::Done), vec!["2"]);
    }

    #[test]
    fn test_move_across_same_column_reorders_without_status_change() {
        let mut board = loaded(vec![record("1", "todo"), record("2", "todo")]);

        assert!(board
            .move_across_columns(TaskStatus::Todo, 0, TaskStatus::Todo, 1)
            .is_none());
        assert_eq!(ids(&board, TaskStatus::Todo), vec!["2", "1"]);
    }

    #[test]
    fn test_every_transition_is_allowed() {
        for from in TaskStatus::ALL {
            for to in TaskStatus::ALL {
                if from == to {
                    continue;
                }
                let mut board = loaded(vec![record("1", from.as_str())]);
                let moved = board.move_across_columns(from, 0, to, 0).unwrap();
                assert_eq!(moved.status, to);
                assert_eq!(board.column(to).len(), 1);
                assert!(board.column(from).is_empty());
            }
        }
    }

    #[test]
    fn test_move_across_resorts_destination() {
        let mut board = loaded(vec![
            record("1", "todo").with_priority("low"),
            record("2", "done").with_priority("high"),
        ]);
        board.set_sort_policy(SortPolicy::PriorityDesc);

        board.move_across_columns(TaskStatus::Todo, 0, TaskStatus::Done, 0);

        assert_eq!(ids(&board, TaskStatus::Done), vec!["2", "1"]);
    }

    #[test]
    fn test_config_rejects_conflicting_aliases() {
        let mut config = BoardConfig::default();
        config
            .status_aliases
            .insert("Em Espera".to_string(), TaskStatus::Todo);
        config
            .status_aliases
            .insert("em-espera".to_string(), TaskStatus::InProgress);

        let err = config.validate().unwrap_err();
        assert!(matches!(err, BoardError::ConfigError(msg) if msg.contains("same label")));
    }

    #[test]
    fn test_config_allows_equivalent_aliases() {
        let mut config = BoardConfig::default();
        config
            .status_aliases
            .insert("Backlog".to_string(), TaskStatus::Todo);
        config
            .status_aliases
            .insert("backlog".to_string(), TaskStatus::Todo);

        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_status("BACKLOG").unwrap(), TaskStatus::Todo);
    }
}
