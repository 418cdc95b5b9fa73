use super::{DatedSeries, Outcome};
use crate::errors::Result;
use crate::table::TableView;

/// 前缀和，缺失值按 0 计入，结果不含缺失
pub fn cumulative_sum(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, value| {
            *total += value.unwrap_or(0.0);
            Some(*total)
        })
        .collect()
}

/// 任意数值列在视图内的累计值，从视图第一行开始累计
pub fn cumulative(view: &TableView<'_>, column: &str) -> Result<Outcome<DatedSeries>> {
    let Some(values) = view.numeric_values(column)? else {
        return Ok(Outcome::unavailable(column));
    };
    let totals = cumulative_sum(&values).into_iter().map(Some).collect();
    Ok(Outcome::Value(DatedSeries::new(view.dates(), totals)))
}
