use crate::{
    domain::{TaskId, TaskRecord, TaskStatus},
    error::Result,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory;

#[cfg(feature = "file-storage")]
pub use file_storage::FileCollection;
pub use memory::MemoryCollection;

/// The task collection service backing a board
#[async_trait]
pub trait TaskCollection: Send + Sync {
    /// Lists every task record, in the collection's own order
    async fn list(&self) -> Result<Vec<TaskRecord>>;

    /// Persists a status change for one task
    async fn update_status(&self, id: &TaskId, status: TaskStatus) -> Result<()>;
}
