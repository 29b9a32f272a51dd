use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Unknown task status: {0}")]
    UnknownStatus(String),

    #[error("Unknown task priority: {0}")]
    UnknownPriority(String),

    #[error("Invalid sort policy '{0}'. Valid policies: none, priority, due-date")]
    InvalidSortPolicy(String),

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Board not initialized. Call initialize() first.")]
    BoardNotInitialized,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
