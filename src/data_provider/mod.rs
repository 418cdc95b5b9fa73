use log::{info, warn};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::{FlowError, Result};
use crate::models::snapshot::Snapshot;
use crate::sources::base::SnapshotSource;
use crate::table::{build_table, FlowTable};

/// 构建结果。构建失败同样缓存到周期结束，只保留错误信息。
#[derive(Debug, Clone)]
enum CachedTable {
    Built(Arc<FlowTable>),
    Failed(String),
}

/// 缓存条目，key 为 (数据源标识, 刷新周期序号)
#[derive(Debug, Clone)]
struct CacheEntry {
    source_id: String,
    epoch: u64,
    snapshot: Arc<Snapshot>,
    table: CachedTable,
}

/// 快照缓存，只保存最近一次的快照与构建好的数据表。
///
/// 同一数据源在同一刷新周期内最多抓取一次；抓取失败视为 "暂无数据"，
/// 空表同样缓存到周期结束。快照结构错误（如日期无法解析）在本周期内
/// 直接返回缓存的错误，不重新抓取。
#[derive(Debug)]
pub struct SnapshotCache {
    refresh_interval_secs: u64,
    entry: Option<CacheEntry>,
}

impl SnapshotCache {
    pub fn new(refresh_interval_secs: u64) -> Self {
        Self {
            refresh_interval_secs: refresh_interval_secs.max(1),
            entry: None,
        }
    }

    /// 时间点所在的刷新周期序号
    pub fn epoch_of(&self, now: SystemTime) -> u64 {
        let secs = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        secs / self.refresh_interval_secs
    }

    /// 缓存中没有该数据源在当前周期的条目
    pub fn is_stale(&self, source_id: &str, now: SystemTime) -> bool {
        let epoch = self.epoch_of(now);
        !matches!(&self.entry, Some(entry) if entry.source_id == source_id && entry.epoch == epoch)
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.entry.as_ref().map(|entry| Arc::clone(&entry.snapshot))
    }

    /// 最近一次成功构建的数据表
    pub fn table(&self) -> Option<Arc<FlowTable>> {
        match self.entry.as_ref().map(|entry| &entry.table) {
            Some(CachedTable::Built(table)) => Some(Arc::clone(table)),
            _ => None,
        }
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// 命中则返回缓存的数据表，否则抓取并重建。
    ///
    /// 日期格式错误等结构性错误会向上返回，并在本周期内缓存。
    pub async fn get_or_refresh<S>(&mut self, source: &S, now: SystemTime) -> Result<Arc<FlowTable>>
    where
        S: SnapshotSource + Send + Sync + ?Sized,
    {
        let source_id = source.source_id().to_string();
        if !self.is_stale(&source_id, now) {
            if let Some(entry) = &self.entry {
                return match &entry.table {
                    CachedTable::Built(table) => Ok(Arc::clone(table)),
                    CachedTable::Failed(message) => Err(FlowError::DataError(message.clone())),
                };
            }
        }

        let snapshot = match source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to fetch snapshot from {}: {}, treating as no data", source_id, e);
                Snapshot::empty()
            }
        };

        let epoch = self.epoch_of(now);
        let (table, result) = match build_table(&snapshot) {
            Ok(table) => {
                let table = Arc::new(table);
                info!(
                    "Refreshed {} for epoch {}: {} rows",
                    source_id,
                    epoch,
                    table.len()
                );
                (CachedTable::Built(Arc::clone(&table)), Ok(table))
            }
            Err(e) => {
                warn!("Snapshot from {} is malformed for epoch {}: {}", source_id, epoch, e);
                (CachedTable::Failed(e.to_string()), Err(e))
            }
        };

        self.entry = Some(CacheEntry {
            source_id,
            epoch,
            snapshot: Arc::new(snapshot),
            table,
        });
        result
    }
}
