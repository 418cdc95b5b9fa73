use crate::errors::Result;
use crate::models::snapshot::Snapshot;
use async_trait::async_trait;

/// Base trait for snapshot sources
#[async_trait]
pub trait SnapshotSource {
    /// 数据源标识，作为缓存 key 的一部分
    fn source_id(&self) -> &str;

    /// Fetch the full snapshot
    async fn fetch(&self) -> Result<Snapshot>;
}
