use crate::{
    domain::{BoardConfig, TaskId, TaskRecord, TaskStatus},
    error::{BoardError, Result},
    storage::TaskCollection,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based task collection: one JSON document per task
pub struct FileCollection {
    root_path: PathBuf,
}

impl FileCollection {
    const ASCENDA_DIR: &'static str = ".ascenda";
    const TASKS_DIR: &'static str = "tasks";
    const BOARD_FILE: &'static str = "board.json";

    /// Creates a new FileCollection for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::ASCENDA_DIR),
        }
    }

    fn tasks_dir(&self) -> PathBuf {
        self.root_path.join(Self::TASKS_DIR)
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    fn task_file(&self, id: &TaskId) -> Result<PathBuf> {
        let raw = id.as_str();
        if raw.is_empty() || raw.contains(['/', '\\']) || raw.starts_with('.') {
            return Err(BoardError::StorageError(format!(
                "task id '{}' cannot be used as a file name",
                raw
            )));
        }
        Ok(self.tasks_dir().join(format!("{}.json", raw)))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Creates the directory layout and a default board configuration
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.tasks_dir()).await?;

        if !self.board_file().exists() {
            self.save_config(&BoardConfig::default()).await?;
        }

        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }

    /// Writes a task record, replacing any previous version
    pub async fn save_task(&self, record: &TaskRecord) -> Result<()> {
        let file_path = self.task_file(&record.id)?;
        self.ensure_directory_exists(&self.tasks_dir()).await?;

        let json = serde_json::to_string_pretty(record)?;
        fs::write(file_path, json).await?;
        Ok(())
    }

    pub async fn load_task(&self, id: &TaskId) -> Result<TaskRecord> {
        let file_path = self.task_file(id)?;

        if !file_path.exists() {
            return Err(BoardError::TaskNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&file_path).await?;
        let record: TaskRecord = serde_json::from_str(&contents)?;

        Ok(record)
    }

    /// Saves the board configuration
    pub async fn save_config(&self, config: &BoardConfig) -> Result<()> {
        config.validate()?;
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(config)?;
        fs::write(self.board_file(), json).await?;

        Ok(())
    }

    /// Loads and validates the board configuration
    pub async fn load_config(&self) -> Result<BoardConfig> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(BoardError::BoardNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        BoardConfig::from_json(&contents)
    }
}

#[async_trait]
impl TaskCollection for FileCollection {
    async fn list(&self) -> Result<Vec<TaskRecord>> {
        let tasks_dir = self.tasks_dir();

        if !tasks_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&tasks_dir).await?;
        let mut records: Vec<TaskRecord> = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let contents = fs::read_to_string(&path).await?;
            match serde_json::from_str::<TaskRecord>(&contents) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable task file");
                }
            }
        }

        records.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(records)
    }

    async fn update_status(&self, id: &TaskId, status: TaskStatus) -> Result<()> {
        let mut record = self.load_task(id).await?;
        record.status = status.as_str().to_string();
        self.save_task(&record).await
    }
}
