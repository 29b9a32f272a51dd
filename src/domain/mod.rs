pub mod board;
pub mod sorting;
pub mod task;

pub use board::{
    Board, BoardConfig, Column, ColumnSlot, DropEvent, QuarantineReason, QuarantinedRecord,
};
pub use sorting::{sort_tasks, SortPolicy};
pub use task::{parse_due_date, Priority, Task, TaskId, TaskRecord, TaskStatus};
