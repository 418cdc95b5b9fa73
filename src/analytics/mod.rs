//! 基于规范化数据表的分析函数。
//!
//! 所有函数都是无状态的纯函数，输入为 [`crate::table::TableView`]
//! 与显式参数。数据不足、列缺失等情况通过 [`Outcome`] 返回，
//! 只有调用方参数错误才返回 `Err`。

pub mod correlation;
pub mod cumulative;
pub mod rolling;
pub mod sentiment;
pub mod stats;
pub mod summary;
pub mod volatility;

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::{FlowError, Result};
use crate::table::TableView;

/// 分析结果。除 `Value` 外都表示 "结果不可用"，不能当作 0 处理。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome<T> {
    Value(T),
    /// 样本数不足
    InsufficientHistory { required: usize, available: usize },
    /// 表中没有该列
    ColumnUnavailable { column: String },
    /// 某列方差为 0，相关系数无定义
    ZeroVariance { column: String },
}

impl<T> Outcome<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Outcome::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Outcome::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Value(value) => Outcome::Value(f(value)),
            Outcome::InsufficientHistory { required, available } => {
                Outcome::InsufficientHistory { required, available }
            }
            Outcome::ColumnUnavailable { column } => Outcome::ColumnUnavailable { column },
            Outcome::ZeroVariance { column } => Outcome::ZeroVariance { column },
        }
    }

    pub(crate) fn unavailable(column: &str) -> Self {
        Outcome::ColumnUnavailable {
            column: column.to_string(),
        }
    }
}

/// 与视图行顺序对齐的序列，缺失位置为 None
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

impl DatedSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, Option<f64>)> + ExactSizeIterator + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// 最后一个位置的值
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    /// 最近一个非缺失值
    pub fn last_present(&self) -> Option<(NaiveDate, f64)> {
        self.iter().rev().find_map(|(date, value)| value.map(|v| (date, v)))
    }
}

/// 直接取某数值列作为序列
pub fn column_series(view: &TableView<'_>, column: &str) -> Result<Outcome<DatedSeries>> {
    Ok(match view.numeric_values(column)? {
        Some(values) => Outcome::Value(DatedSeries::new(view.dates(), values)),
        None => Outcome::unavailable(column),
    })
}

pub(crate) fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(FlowError::InvalidParameter(
            "window size must be at least 1".to_string(),
        ));
    }
    Ok(())
}
