use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;

use crate::analytics::correlation::{correlation, correlation_matrix, Correlation, CorrelationMatrix};
use crate::analytics::rolling::{moving_average, rolling_std_dev};
use crate::analytics::sentiment::participant_sentiment;
use crate::analytics::summary::{activity_summary, key_metrics, KeyMetrics, SegmentActivity};
use crate::analytics::volatility::{volatility, NIFTY_CHANGE_COLUMN};
use crate::analytics::{column_series, DatedSeries, Outcome};
use crate::config::Config;
use crate::data_provider::SnapshotCache;
use crate::errors::Result;
use crate::models::snapshot::Participant;
use crate::normalizer::schema::{DII_CUMULATIVE_NET, FII_CUMULATIVE_NET};
use crate::sources::base::SnapshotSource;
use crate::table::{FlowTable, TableView};

/// 报告中需要计算的内容
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// 滚动统计的目标列
    pub column: String,
    pub volatility_column: String,
    pub correlations: Vec<(String, String)>,
    /// 需要计算综合情绪的参与者
    pub participants: Vec<Participant>,
    pub include_matrix: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            column: "fii_cash_net".to_string(),
            volatility_column: NIFTY_CHANGE_COLUMN.to_string(),
            correlations: vec![
                ("fii_cash_net".to_string(), "nifty".to_string()),
                ("fii_cash_net".to_string(), "nifty_change_percent".to_string()),
                ("dii_cash_net".to_string(), "nifty_change_percent".to_string()),
            ],
            participants: Participant::ALL.to_vec(),
            include_matrix: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrelationEntry {
    pub a: String,
    pub b: String,
    pub result: Outcome<Correlation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantSentiment {
    pub participant: Participant,
    pub scores: Outcome<DatedSeries>,
}

/// 一个日期区间内的完整分析结果
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub as_of_label: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub rows: usize,
    pub key_metrics: KeyMetrics,
    pub activity: Vec<SegmentActivity>,
    pub window: usize,
    pub moving_average: Outcome<DatedSeries>,
    pub rolling_std_dev: Outcome<DatedSeries>,
    pub volatility_window: usize,
    pub volatility: Outcome<DatedSeries>,
    pub fii_cumulative_net: Outcome<DatedSeries>,
    pub dii_cumulative_net: Outcome<DatedSeries>,
    pub sentiment: Vec<ParticipantSentiment>,
    pub correlations: Vec<CorrelationEntry>,
    pub matrix: Option<CorrelationMatrix>,
}

/// 计算视图上的全部分析结果
pub fn build_report(
    view: &TableView<'_>,
    as_of_label: &str,
    config: &Config,
    options: &ReportOptions,
) -> Result<FlowReport> {
    let correlations = options
        .correlations
        .iter()
        .map(|(a, b)| {
            Ok(CorrelationEntry {
                a: a.clone(),
                b: b.clone(),
                result: correlation(view, a, b)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let sentiment = options
        .participants
        .iter()
        .map(|&participant| ParticipantSentiment {
            participant,
            scores: participant_sentiment(view, participant, config.missing_view_policy),
        })
        .collect();

    Ok(FlowReport {
        as_of_label: as_of_label.to_string(),
        from: view.first_date(),
        to: view.last_date(),
        rows: view.len(),
        key_metrics: key_metrics(view),
        activity: activity_summary(view),
        window: config.rolling_window,
        moving_average: moving_average(view, &options.column, config.rolling_window)?,
        rolling_std_dev: rolling_std_dev(view, &options.column, config.rolling_window)?,
        volatility_window: config.volatility_window,
        volatility: volatility(view, &options.volatility_column, config.volatility_window)?,
        fii_cumulative_net: column_series(view, FII_CUMULATIVE_NET)?,
        dii_cumulative_net: column_series(view, DII_CUMULATIVE_NET)?,
        sentiment,
        correlations,
        matrix: options.include_matrix.then(|| correlation_matrix(view)),
    })
}

/// 分析服务：持有数据源与缓存，按需刷新数据表并生成报告
pub struct AnalysisService {
    config: Config,
    source: Arc<dyn SnapshotSource + Send + Sync>,
    cache: SnapshotCache,
}

impl AnalysisService {
    pub fn new(config: Config, source: Arc<dyn SnapshotSource + Send + Sync>) -> Self {
        let cache = SnapshotCache::new(config.refresh_interval_secs);
        Self {
            config,
            source,
            cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 获取当前周期的数据表
    pub async fn load_table(&mut self) -> Result<Arc<FlowTable>> {
        self.cache
            .get_or_refresh(self.source.as_ref(), SystemTime::now())
            .await
    }

    pub fn as_of_label(&self) -> String {
        self.cache
            .snapshot()
            .map(|snapshot| snapshot.as_of_label.clone())
            .unwrap_or_default()
    }

    /// 刷新（如需要）并生成报告
    pub async fn report(&mut self, options: &ReportOptions) -> Result<FlowReport> {
        let table = self.load_table().await?;
        let view = table.between(options.start, options.end);
        info!(
            "Analyzing {} of {} rows ({:?} - {:?})",
            view.len(),
            table.len(),
            view.first_date(),
            view.last_date()
        );
        build_report(&view, &self.as_of_label(), &self.config, options)
    }
}
