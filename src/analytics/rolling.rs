use serde::{Deserialize, Serialize};

use super::{check_window, stats, DatedSeries, Outcome};
use crate::errors::Result;
use crate::table::TableView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollingStat {
    Mean,
    StdDev,
}

/// 惰性滚动窗口。
///
/// 位置 `i` 在凑满 `window` 行之前为 None；窗口内的缺失值被忽略
/// （有效窗口缩小），不会按 0 参与计算。
#[derive(Debug, Clone)]
pub struct RollingWindow<'a> {
    values: &'a [Option<f64>],
    window: usize,
    stat: RollingStat,
    position: usize,
}

impl<'a> RollingWindow<'a> {
    pub fn new(values: &'a [Option<f64>], window: usize, stat: RollingStat) -> Self {
        Self {
            values,
            window: window.max(1),
            stat,
            position: 0,
        }
    }
}

impl Iterator for RollingWindow<'_> {
    type Item = Option<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.values.len() {
            return None;
        }
        let end = self.position + 1;
        self.position = end;

        if end < self.window {
            return Some(None);
        }
        let present: Vec<f64> = self.values[end - self.window..end]
            .iter()
            .flatten()
            .copied()
            .collect();
        Some(match self.stat {
            RollingStat::Mean => stats::mean(&present),
            RollingStat::StdDev => stats::sample_std_dev(&present),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.values.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RollingWindow<'_> {}

/// 对某列计算滚动统计量。
///
/// 视图行数少于窗口时返回 `InsufficientHistory`，不产生部分序列。
pub fn rolling(
    view: &TableView<'_>,
    column: &str,
    window: usize,
    stat: RollingStat,
) -> Result<Outcome<DatedSeries>> {
    check_window(window)?;
    let Some(values) = view.numeric_values(column)? else {
        return Ok(Outcome::unavailable(column));
    };
    if values.len() < window {
        return Ok(Outcome::InsufficientHistory {
            required: window,
            available: values.len(),
        });
    }

    let series = RollingWindow::new(&values, window, stat).collect();
    Ok(Outcome::Value(DatedSeries::new(view.dates(), series)))
}

pub fn moving_average(view: &TableView<'_>, column: &str, window: usize) -> Result<Outcome<DatedSeries>> {
    rolling(view, column, window, RollingStat::Mean)
}

pub fn rolling_std_dev(view: &TableView<'_>, column: &str, window: usize) -> Result<Outcome<DatedSeries>> {
    rolling(view, column, window, RollingStat::StdDev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FlowError;
    use crate::models::snapshot::Snapshot;
    use crate::table::{build_table, FlowTable};
    use serde_json::json;

    fn table(nets: &[Option<f64>]) -> FlowTable {
        let mut data = serde_json::Map::new();
        for (i, net) in nets.iter().enumerate() {
            let date = format!("2025-03-{:02}", i + 1);
            let record = match net {
                Some(v) => json!({"cash": {"fii": {"buy_sell_difference": v}}}),
                None => json!({"cash": {"fii": {}}}),
            };
            data.insert(date, record);
        }
        let snapshot: Snapshot = serde_json::from_value(json!({ "data": data })).unwrap();
        build_table(&snapshot).unwrap()
    }

    #[test]
    fn window_iterator_waits_for_full_window() {
        let values = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let out: Vec<_> = RollingWindow::new(&values, 3, RollingStat::Mean).collect();
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn missing_values_shrink_the_window() {
        let values = [Some(1.0), None, Some(5.0), None, None];
        let out: Vec<_> = RollingWindow::new(&values, 3, RollingStat::Mean).collect();
        assert_eq!(out, vec![None, None, Some(3.0), Some(5.0), Some(5.0)]);

        let out: Vec<_> = RollingWindow::new(&values, 3, RollingStat::StdDev).collect();
        assert_eq!(out[3], None);
        assert!((out[2].unwrap() - 8f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn all_missing_window_is_missing_not_zero() {
        let values = [None, None, Some(1.0)];
        let out: Vec<_> = RollingWindow::new(&values, 2, RollingStat::Mean).collect();
        assert_eq!(out, vec![None, None, Some(1.0)]);
    }

    #[test]
    fn exactly_window_rows_gives_full_mean_at_last_row() {
        let table = table(&[Some(10.0), Some(20.0), Some(60.0)]);
        let series = moving_average(&table.view(), "fii_cash_net", 3).unwrap().value().unwrap();
        assert_eq!(series.values, vec![None, None, Some(30.0)]);
    }

    #[test]
    fn fewer_rows_than_window_is_insufficient() {
        let table = table(&[Some(10.0), Some(20.0)]);
        let outcome = moving_average(&table.view(), "fii_cash_net", 3).unwrap();
        assert_eq!(
            outcome,
            Outcome::InsufficientHistory {
                required: 3,
                available: 2
            }
        );
    }

    #[test]
    fn missing_column_and_bad_window() {
        let table = table(&[Some(10.0)]);
        let view = table.view();
        assert_eq!(
            moving_average(&view, "dii_cash_net", 1).unwrap(),
            Outcome::ColumnUnavailable {
                column: "dii_cash_net".into()
            }
        );
        assert!(matches!(
            moving_average(&view, "fii_cash_net", 0),
            Err(FlowError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rolling_respects_filtered_view() {
        let table = table(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let start = chrono::NaiveDate::from_ymd_opt(2025, 3, 3);
        let view = table.between(start, None);
        let series = moving_average(&view, "fii_cash_net", 2).unwrap().value().unwrap();
        assert_eq!(series.values, vec![None, Some(3.5)]);
        assert_eq!(series.dates.len(), 2);
    }
}
