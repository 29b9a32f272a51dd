//! # Ascenda Board
//!
//! Task board model for the Ascenda internship portal.
//!
//! Tasks are grouped into four status columns, sorted per column by
//! priority or due date, reordered and moved by drag gestures, and status
//! changes are pushed to a task collection service optimistically. The
//! crate has no dependency on any particular UI or backend.

pub mod domain;
pub mod error;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use domain::{
    board::{Board, BoardConfig, Column, ColumnSlot, DropEvent},
    sorting::SortPolicy,
    task::{Priority, Task, TaskId, TaskRecord, TaskStatus},
};
pub use error::{BoardError, Result};
pub use storage::TaskCollection;
pub use store::{SyncReport, TaskBoardStore};
