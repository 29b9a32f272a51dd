use crate::{
    domain::{TaskId, TaskRecord, TaskStatus},
    error::{BoardError, Result},
    storage::TaskCollection,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory task collection, used for mocked data and tests
#[derive(Debug, Default)]
pub struct MemoryCollection {
    records: RwLock<Vec<TaskRecord>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection pre-filled with records
    pub fn with_records(records: Vec<TaskRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Adds a task and assigns it a fresh id
    pub async fn create(&self, title: impl Into<String>, status: TaskStatus) -> TaskId {
        let id = TaskId::generate();
        let record = TaskRecord::new(id.as_str(), title, status.as_str());
        self.records.write().await.push(record);
        id
    }

    /// Adds a record as-is, keeping its id
    pub async fn insert(&self, record: TaskRecord) {
        self.records.write().await.push(record);
    }

    /// Fetches a single record
    pub async fn get(&self, id: &TaskId) -> Result<TaskRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))
    }
}

#[async_trait]
impl TaskCollection for MemoryCollection {
    async fn list(&self) -> Result<Vec<TaskRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn update_status(&self, id: &TaskId, status: TaskStatus) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))?;
        record.status = status.as_str().to_string();
        Ok(())
    }
}
