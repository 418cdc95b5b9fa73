//! 将单日嵌套记录映射为扁平行。
//!
//! 字段表 [`schema::FIELDS`] 决定可以产生哪些列：
//! 分支（市场 / 参与者 / 子视图）缺失时该分支不产生任何列；
//! 分支存在但叶子缺失时产生该列，值为 `None`。

pub mod schema;

use log::debug;
use serde_json::Value;

use crate::models::row::{Cell, ColumnKind};
use crate::models::snapshot::{find_key, DailyRecord};
use schema::{FieldSpec, FIELDS};

/// 单条记录规范化后的结果，尚未与整表结构对齐
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub date: String,
    pub fields: Vec<(&'static FieldSpec, Option<Cell>)>,
}

impl NormalizedRow {
    /// 该行是否提供了某列（值可以是 None）
    pub fn has_column(&self, column: &str) -> bool {
        self.fields.iter().any(|(spec, _)| spec.column == column)
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(spec, _)| spec.column == column)
            .and_then(|(_, cell)| cell.as_ref())
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(spec, _)| spec.column)
    }
}

/// 规范化一条 (日期, 记录)
pub fn normalize_record(date: &str, record: &DailyRecord) -> NormalizedRow {
    let mut fields = Vec::with_capacity(FIELDS.len());

    for spec in FIELDS {
        let Some(branch) = record.branch(spec.branch()) else {
            continue;
        };
        let cell = find_key(branch, spec.leaf()).and_then(|value| coerce(date, spec, value));
        fields.push((spec, cell));
    }

    NormalizedRow {
        date: date.to_string(),
        fields,
    }
}

fn coerce(date: &str, spec: &FieldSpec, value: &Value) -> Option<Cell> {
    match (spec.kind, value) {
        (_, Value::Null) => None,
        (ColumnKind::Number, Value::Number(n)) => n.as_f64().map(Cell::Number),
        (ColumnKind::Number, Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Cell::Number(n)),
            _ => {
                debug!("{} {}: non-numeric value {:?} treated as missing", date, spec.column, s);
                None
            }
        },
        (ColumnKind::Text, Value::String(s)) => Some(Cell::Text(s.clone())),
        (ColumnKind::Text, Value::Number(_) | Value::Bool(_)) => Some(Cell::Text(value.to_string())),
        _ => {
            debug!("{} {}: unexpected value {} treated as missing", date, spec.column, value);
            None
        }
    }
}
