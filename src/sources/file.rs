use crate::errors::Result;
use crate::models::snapshot::Snapshot;
use crate::sources::base::SnapshotSource;
use async_trait::async_trait;
use log::info;
use std::path::{Path, PathBuf};

/// 从本地 JSON 文件读取快照
pub struct FileSnapshotSource {
    path: PathBuf,
    id: String,
}

impl FileSnapshotSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let id = format!("file://{}", path.display());
        Self { path, id }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    fn source_id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self) -> Result<Snapshot> {
        info!("Loading snapshot from {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await?;
        Snapshot::from_slice(&bytes)
    }
}
