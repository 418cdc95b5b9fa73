use chrono::NaiveDate;
use serde::Serialize;

use crate::models::row::Cell;
use crate::models::snapshot::Participant;
use crate::table::TableView;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// 大于 0 为上行，否则为下行
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestFlow {
    pub value: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexLevel {
    pub level: f64,
    pub change_percent: Option<f64>,
}

/// 视图最后一行的关键指标，空视图时各项均为 None
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub as_of: Option<NaiveDate>,
    pub fii_cash_net: Option<LatestFlow>,
    pub dii_cash_net: Option<LatestFlow>,
    pub nifty: Option<IndexLevel>,
    pub banknifty: Option<IndexLevel>,
}

fn latest_number(view: &TableView<'_>, column: &str) -> Option<f64> {
    view.latest(column).and_then(Cell::as_f64)
}

fn latest_flow(view: &TableView<'_>, column: &str) -> Option<LatestFlow> {
    latest_number(view, column).map(|value| LatestFlow {
        value,
        trend: Trend::of(value),
    })
}

fn latest_index(view: &TableView<'_>, level: &str, change: &str) -> Option<IndexLevel> {
    latest_number(view, level).map(|level| IndexLevel {
        level,
        change_percent: latest_number(view, change),
    })
}

pub fn key_metrics(view: &TableView<'_>) -> KeyMetrics {
    KeyMetrics {
        as_of: view.last_date(),
        fii_cash_net: latest_flow(view, "fii_cash_net"),
        dii_cash_net: latest_flow(view, "dii_cash_net"),
        nifty: latest_index(view, "nifty", "nifty_change_percent"),
        banknifty: latest_index(view, "banknifty", "banknifty_change_percent"),
    }
}

/// 某市场上某参与者的最新动作与观点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentActivity {
    pub segment: &'static str,
    pub fii_action: String,
    pub fii_view: String,
    pub dii_action: String,
    pub dii_view: String,
}

// (标签, action 列后缀, view 列后缀, strength 列后缀)
const SEGMENTS: [(&str, Option<&str>, &str, Option<&str>); 4] = [
    ("Cash Market", Some("cash_action"), "cash_view", Some("cash_view_strength")),
    ("Futures (Qty)", Some("future_action"), "future_view", Some("future_view_strength")),
    ("Futures (Amt)", None, "future_view_amt", None),
    ("Options", Some("option_action"), "option_view", Some("option_view_strength")),
];

fn latest_text(view: &TableView<'_>, participant: Participant, suffix: &str) -> Option<String> {
    let column = format!("{}_{}", participant.prefix(), suffix);
    view.latest(&column)
        .and_then(Cell::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn action(view: &TableView<'_>, participant: Participant, suffix: Option<&str>) -> String {
    suffix
        .and_then(|suffix| latest_text(view, participant, suffix))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn view_with_strength(
    view: &TableView<'_>,
    participant: Participant,
    view_suffix: &str,
    strength_suffix: Option<&str>,
) -> String {
    let Some(sentiment) = latest_text(view, participant, view_suffix) else {
        return NOT_AVAILABLE.to_string();
    };
    match strength_suffix.and_then(|suffix| latest_text(view, participant, suffix)) {
        Some(strength) => format!("{} ({})", sentiment, strength),
        None => sentiment,
    }
}

/// 最新一行的动作 / 观点汇总，字段不存在时为 "N/A"
pub fn activity_summary(view: &TableView<'_>) -> Vec<SegmentActivity> {
    SEGMENTS
        .iter()
        .map(|&(segment, action_suffix, view_suffix, strength_suffix)| SegmentActivity {
            segment,
            fii_action: action(view, Participant::Fii, action_suffix),
            fii_view: view_with_strength(view, Participant::Fii, view_suffix, strength_suffix),
            dii_action: action(view, Participant::Dii, action_suffix),
            dii_view: view_with_strength(view, Participant::Dii, view_suffix, strength_suffix),
        })
        .collect()
}
