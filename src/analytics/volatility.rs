use super::rolling::{rolling, RollingStat};
use super::{DatedSeries, Outcome};
use crate::errors::Result;
use crate::table::TableView;

pub const DEFAULT_VOLATILITY_WINDOW: usize = 5;
pub const NIFTY_CHANGE_COLUMN: &str = "nifty_change_percent";
pub const BANKNIFTY_CHANGE_COLUMN: &str = "banknifty_change_percent";

/// 已实现波动率近似：涨跌幅的滚动样本标准差乘以 sqrt(window)
pub fn volatility(view: &TableView<'_>, column: &str, window: usize) -> Result<Outcome<DatedSeries>> {
    let scale = (window as f64).sqrt();
    Ok(rolling(view, column, window, RollingStat::StdDev)?.map(|series| DatedSeries {
        values: series.values.iter().map(|v| v.map(|v| v * scale)).collect(),
        dates: series.dates,
    }))
}

pub fn nifty_volatility(view: &TableView<'_>, window: usize) -> Result<Outcome<DatedSeries>> {
    volatility(view, NIFTY_CHANGE_COLUMN, window)
}

pub fn banknifty_volatility(view: &TableView<'_>, window: usize) -> Result<Outcome<DatedSeries>> {
    volatility(view, BANKNIFTY_CHANGE_COLUMN, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::Snapshot;
    use crate::table::build_table;
    use serde_json::json;

    fn table() -> crate::table::FlowTable {
        let snapshot: Snapshot = serde_json::from_value(json!({"data": {
            "2025-03-03": {"nifty_change_percent": 1.0},
            "2025-03-04": {"nifty_change_percent": -1.0},
            "2025-03-05": {"nifty_change_percent": 1.0},
            "2025-03-06": {},
            "2025-03-07": {"nifty_change_percent": -1.0}
        }}))
        .unwrap();
        build_table(&snapshot).unwrap()
    }

    #[test]
    fn scaled_rolling_std_dev() {
        let table = table();
        let series = nifty_volatility(&table.view(), 4).unwrap().value().unwrap();

        assert_eq!(&series.values[..3], &[None, None, None]);
        // 窗口 [1, -1, 1, 缺失]：样本标准差 = sqrt(4/3)，乘以 sqrt(4)
        let expected = (4.0f64 / 3.0).sqrt() * 2.0;
        assert!((series.values[3].unwrap() - expected).abs() < 1e-12);
        assert!((series.values[4].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn same_history_policy_as_rolling() {
        let table = table();
        let outcome = nifty_volatility(&table.view(), DEFAULT_VOLATILITY_WINDOW + 1).unwrap();
        assert_eq!(
            outcome,
            Outcome::InsufficientHistory {
                required: 6,
                available: 5
            }
        );

        // 列存在但全部缺失
        let series = banknifty_volatility(&table.view(), 2).unwrap().value().unwrap();
        assert_eq!(series.values, vec![None; 5]);
    }
}
