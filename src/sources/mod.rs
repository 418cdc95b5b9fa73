pub mod base;
pub mod file;
pub mod http;

use std::sync::Arc;

use crate::config::Config;
use crate::errors::Result;
use base::SnapshotSource;
use file::FileSnapshotSource;
use http::HttpSnapshotSource;

/// 按配置中的 source 选择 HTTP 或本地文件数据源
pub fn source_from_config(config: &Config) -> Result<Arc<dyn SnapshotSource + Send + Sync>> {
    if config.is_remote_source() {
        Ok(Arc::new(HttpSnapshotSource::new(
            &config.source,
            config.request_timeout_secs,
        )?))
    } else {
        Ok(Arc::new(FileSnapshotSource::new(&config.source)))
    }
}
