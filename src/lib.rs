// 公开导出的模块，供外部使用
pub mod models;
pub mod normalizer;
pub mod table;
pub mod analytics;
pub mod data_provider;
pub mod errors;

// 命令行程序需要这些模块，库使用场景下视为内部模块
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod sources;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::row::{CanonicalRow, Cell, Column, ColumnKind};
pub use models::snapshot::{DailyRecord, DatedRecords, Participant, Snapshot};
pub use table::{build_table, FlowTable, TableView};
pub use analytics::{DatedSeries, Outcome};
pub use config::Config;
pub use errors::{Result, FlowError};
