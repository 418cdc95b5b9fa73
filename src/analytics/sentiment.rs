use serde::{Deserialize, Serialize};

use super::{DatedSeries, Outcome};
use crate::models::snapshot::Participant;
use crate::table::TableView;

/// 观点字段的类型化投影，只用于打分。原始字符串在表中保持不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Unknown,
}

impl Sentiment {
    /// 精确匹配，不做大小写转换
    pub fn from_view(view: &str) -> Self {
        match view {
            "BULLISH" => Sentiment::Bullish,
            "BEARISH" => Sentiment::Bearish,
            _ => Sentiment::Unknown,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Sentiment::Bullish => 1.0,
            Sentiment::Bearish => -1.0,
            Sentiment::Unknown => 0.0,
        }
    }
}

/// 观点缺失或为空字符串时的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingViewPolicy {
    /// 记为 0
    #[default]
    Neutral,
    /// 该位置缺失
    Skip,
}

pub fn score_view(view: Option<&str>, policy: MissingViewPolicy) -> Option<f64> {
    match view {
        Some(view) if !view.is_empty() => Some(Sentiment::from_view(view).score()),
        _ => match policy {
            MissingViewPolicy::Neutral => Some(0.0),
            MissingViewPolicy::Skip => None,
        },
    }
}

/// 单个观点列的逐行得分
pub fn sentiment_series(
    view: &TableView<'_>,
    column: &str,
    policy: MissingViewPolicy,
) -> Outcome<DatedSeries> {
    let Some(views) = view.text_values(column) else {
        return Outcome::unavailable(column);
    };
    let scores = views.into_iter().map(|v| score_view(v, policy)).collect();
    Outcome::Value(DatedSeries::new(view.dates(), scores))
}

/// 参与者在各市场上的观点列
pub fn view_columns(participant: Participant) -> [String; 3] {
    let p = participant.prefix();
    [
        format!("{}_cash_view", p),
        format!("{}_future_view", p),
        format!("{}_option_view", p),
    ]
}

/// 参与者综合得分：现货、期货（按数量）、期权三个观点得分的逐行平均。
///
/// 只使用表中存在的列；某行所有得分都缺失时该位置缺失。
pub fn participant_sentiment(
    view: &TableView<'_>,
    participant: Participant,
    policy: MissingViewPolicy,
) -> Outcome<DatedSeries> {
    let columns = view_columns(participant);
    let available: Vec<Vec<Option<&str>>> = columns
        .iter()
        .filter_map(|column| view.text_values(column))
        .collect();
    if available.is_empty() {
        return Outcome::unavailable(&columns[0]);
    }

    let scores = (0..view.len())
        .map(|i| {
            let present: Vec<f64> = available
                .iter()
                .filter_map(|values| score_view(values[i], policy))
                .collect();
            super::stats::mean(&present)
        })
        .collect();
    Outcome::Value(DatedSeries::new(view.dates(), scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::Snapshot;
    use crate::table::build_table;
    use serde_json::json;

    #[test]
    fn scoring_is_exact() {
        assert_eq!(Sentiment::from_view("BULLISH").score(), 1.0);
        assert_eq!(Sentiment::from_view("BEARISH").score(), -1.0);
        assert_eq!(Sentiment::from_view("bullish"), Sentiment::Unknown);
        assert_eq!(Sentiment::from_view("NEUTRAL").score(), 0.0);
    }

    #[test]
    fn missing_policy_is_explicit() {
        assert_eq!(score_view(None, MissingViewPolicy::Neutral), Some(0.0));
        assert_eq!(score_view(Some(""), MissingViewPolicy::Neutral), Some(0.0));
        assert_eq!(score_view(None, MissingViewPolicy::Skip), None);
        assert_eq!(score_view(Some(""), MissingViewPolicy::Skip), None);
        // 非空但未知的观点仍记为 0
        assert_eq!(score_view(Some("SIDEWAYS"), MissingViewPolicy::Skip), Some(0.0));
    }

    fn table() -> crate::table::FlowTable {
        let snapshot: Snapshot = serde_json::from_value(json!({"data": {
            "2025-03-05": {
                "cash": {"fii": {"net_view": "BULLISH"}},
                "option": {"fii": {"overall_net_oi_change_view": "BULLISH"}}
            },
            "2025-03-06": {
                "cash": {"fii": {"net_view": "BEARISH"}},
                "option": {"fii": {"overall_net_oi_change_view": ""}}
            },
            "2025-03-07": {"nifty": 22552.5}
        }}))
        .unwrap();
        build_table(&snapshot).unwrap()
    }

    #[test]
    fn series_follows_policy() {
        let table = table();
        let view = table.view();

        let neutral = sentiment_series(&view, "fii_cash_view", MissingViewPolicy::Neutral)
            .value()
            .unwrap();
        assert_eq!(neutral.values, vec![Some(1.0), Some(-1.0), Some(0.0)]);

        let skip = sentiment_series(&view, "fii_cash_view", MissingViewPolicy::Skip)
            .value()
            .unwrap();
        assert_eq!(skip.values, vec![Some(1.0), Some(-1.0), None]);
    }

    #[test]
    fn participant_composite_averages_available_segments() {
        let table = table();
        let view = table.view();

        let skip = participant_sentiment(&view, Participant::Fii, MissingViewPolicy::Skip)
            .value()
            .unwrap();
        assert_eq!(skip.values, vec![Some(1.0), Some(-1.0), None]);

        let neutral = participant_sentiment(&view, Participant::Fii, MissingViewPolicy::Neutral)
            .value()
            .unwrap();
        assert_eq!(neutral.values, vec![Some(1.0), Some(-0.5), Some(0.0)]);

        assert!(!participant_sentiment(&view, Participant::Dii, MissingViewPolicy::Neutral).is_value());
    }
}
