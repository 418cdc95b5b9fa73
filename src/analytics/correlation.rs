use serde::Serialize;

use super::{stats, Outcome};
use crate::errors::Result;
use crate::models::row::ColumnKind;
use crate::table::TableView;

/// 计算相关系数所需的最少配对样本数
pub const MIN_PAIRS: usize = 2;

/// Pearson 相关系数及双侧显著性
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub p_value: f64,
    pub observations: usize,
}

/// 两列都有值的行（成对完整样本）
pub fn paired_values(xs: &[Option<f64>], ys: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip()
}

/// 对两个对齐序列计算相关系数，`names` 用于标注零方差的列
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>], names: (&str, &str)) -> Outcome<Correlation> {
    let (xs, ys) = paired_values(xs, ys);
    let n = xs.len();
    if n < MIN_PAIRS {
        return Outcome::InsufficientHistory {
            required: MIN_PAIRS,
            available: n,
        };
    }

    let (Some(mean_x), Some(mean_y)) = (stats::mean(&xs), stats::mean(&ys)) else {
        return Outcome::InsufficientHistory {
            required: MIN_PAIRS,
            available: n,
        };
    };

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if stats::is_constant(sxx, &xs) {
        return Outcome::ZeroVariance {
            column: names.0.to_string(),
        };
    }
    if stats::is_constant(syy, &ys) {
        return Outcome::ZeroVariance {
            column: names.1.to_string(),
        };
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    Outcome::Value(Correlation {
        coefficient: r,
        p_value: p_value(r, n),
        observations: n,
    })
}

fn p_value(r: f64, n: usize) -> f64 {
    // 两个点总能连成一条直线，没有剩余自由度
    if n <= 2 {
        return 1.0;
    }
    if r.abs() >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    stats::t_two_sided_p_value(t, df)
}

/// 两列的相关性，缺失值按成对删除
pub fn correlation(view: &TableView<'_>, a: &str, b: &str) -> Result<Outcome<Correlation>> {
    let Some(xs) = view.numeric_values(a)? else {
        return Ok(Outcome::unavailable(a));
    };
    let Some(ys) = view.numeric_values(b)? else {
        return Ok(Outcome::unavailable(b));
    };
    Ok(pearson(&xs, &ys, (a, b)))
}

/// 数值列的两两相关系数矩阵，无定义处为 None
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// 只包含数值列；文本列（action / view 等）完全排除
pub fn correlation_matrix(view: &TableView<'_>) -> CorrelationMatrix {
    let numeric: Vec<(&str, Vec<Option<f64>>)> = view
        .columns()
        .iter()
        .filter(|column| column.kind == ColumnKind::Number)
        .filter_map(|column| {
            let values = view.numeric_values(&column.name).ok().flatten()?;
            Some((column.name.as_str(), values))
        })
        .collect();

    let size = numeric.len();
    let mut values = vec![vec![None; size]; size];
    for i in 0..size {
        for j in i..size {
            let (a, xs) = &numeric[i];
            let (b, ys) = &numeric[j];
            let r = pearson(xs, ys, (*a, *b))
                .value()
                .map(|c| if i == j { 1.0 } else { c.coefficient });
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: numeric.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    }
}
