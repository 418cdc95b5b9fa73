use chrono::NaiveDate;
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};

use crate::analytics::cumulative::cumulative_sum;
use crate::errors::Result;
use crate::models::row::{CanonicalRow, Cell, Column, ColumnKind};
use crate::models::snapshot::{DailyRecord, Snapshot};
use crate::normalizer::schema::{CUMULATIVE_COLUMNS, FIELDS};
use crate::normalizer::{normalize_record, NormalizedRow};
use crate::table::FlowTable;
use crate::util::parse_date;

/// 由快照构建规范化数据表
pub fn build_table(snapshot: &Snapshot) -> Result<FlowTable> {
    build_table_from_pairs(snapshot.records())
}

/// 由 (日期, 记录) 序列构建数据表。
///
/// 任一日期无法解析时整体失败；同一日期出现多次时以最后一条为准。
pub fn build_table_from_pairs<'a, I>(pairs: I) -> Result<FlowTable>
where
    I: IntoIterator<Item = (&'a str, &'a DailyRecord)>,
{
    let mut by_date: BTreeMap<NaiveDate, NormalizedRow> = BTreeMap::new();

    for (date_str, record) in pairs {
        let date = parse_date(date_str)?;
        if let Some(previous) = by_date.insert(date, normalize_record(date_str, record)) {
            warn!(
                "Duplicate date {} ({:?} replaced by {:?}), keeping the last record",
                date, previous.date, date_str
            );
        }
    }

    if by_date.is_empty() {
        info!("Snapshot has no data, returning empty table");
        return Ok(FlowTable::empty());
    }

    // 表结构只包含至少一行提供过的列，顺序与字段表一致
    let mut columns: Vec<Column> = FIELDS
        .iter()
        .filter(|spec| by_date.values().any(|row| row.has_column(spec.column)))
        .map(|spec| Column::new(spec.column, spec.kind))
        .collect();

    let index: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| (column.name.as_str(), i))
        .collect();

    let mut rows: Vec<CanonicalRow> = by_date
        .into_iter()
        .map(|(date, normalized)| {
            let mut cells = vec![None; columns.len()];
            for (spec, cell) in normalized.fields {
                if let Some(&i) = index.get(spec.column) {
                    cells[i] = cell;
                }
            }
            CanonicalRow { date, cells }
        })
        .collect();

    for (cumulative, source) in CUMULATIVE_COLUMNS {
        let Some(source_index) = columns.iter().position(|column| column.name == source) else {
            continue;
        };
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|row| row.cell(source_index).and_then(Cell::as_f64))
            .collect();
        for (row, total) in rows.iter_mut().zip(cumulative_sum(&values)) {
            row.cells.push(Some(Cell::Number(total)));
        }
        columns.push(Column::new(cumulative, ColumnKind::Number));
    }

    info!("Built table with {} rows and {} columns", rows.len(), columns.len());
    FlowTable::from_parts(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FlowError;
    use serde_json::json;

    fn snapshot(data: serde_json::Value) -> Snapshot {
        serde_json::from_value(json!({ "data": data })).unwrap()
    }

    #[test]
    fn rows_are_sorted_by_calendar_date() {
        let table = build_table(&snapshot(json!({
            "2025-03-10": {"nifty": 3.0},
            "2025-03-07": {"nifty": 2.0},
            "2024-12-31": {"nifty": 1.0}
        })))
        .unwrap();

        let nifty = table.view().numeric_values("nifty").unwrap().unwrap();
        assert_eq!(nifty, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn malformed_date_fails_whole_build() {
        let result = build_table(&snapshot(json!({
            "2025-03-07": {"nifty": 2.0},
            "not-a-date": {"nifty": 1.0}
        })));
        assert!(matches!(result, Err(FlowError::MalformedDate { date }) if date == "not-a-date"));
    }

    #[test]
    fn empty_snapshot_is_empty_table() {
        let table = build_table(&Snapshot::empty()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 0);
    }

    #[test]
    fn cumulative_treats_missing_as_zero_but_keeps_source_missing() {
        let table = build_table(&snapshot(json!({
            "2025-03-05": {"cash": {"fii": {"buy_sell_difference": 100.0}}},
            "2025-03-06": {"cash": {"fii": {"buy": 5.0}}},
            "2025-03-07": {"nifty": 22552.5},
            "2025-03-10": {"cash": {"fii": {"buy_sell_difference": -40.0}}}
        })))
        .unwrap();

        let view = table.view();
        let net = view.numeric_values("fii_cash_net").unwrap().unwrap();
        let cumulative = view.numeric_values("fii_cumulative_net").unwrap().unwrap();
        assert_eq!(net, vec![Some(100.0), None, None, Some(-40.0)]);
        assert_eq!(cumulative, vec![Some(100.0), Some(100.0), Some(100.0), Some(60.0)]);
        assert!(!table.has_column("dii_cumulative_net"));
    }

    #[test]
    fn cumulative_columns_come_last() {
        let table = build_table(&snapshot(json!({
            "2025-03-07": {"cash": {"fii": {"buy_sell_difference": 1.0}, "dii": {"buy_sell_difference": 2.0}}}
        })))
        .unwrap();
        let names: Vec<_> = table.column_names().collect();
        assert_eq!(&names[names.len() - 2..], &["fii_cumulative_net", "dii_cumulative_net"]);
    }

    #[test]
    fn duplicate_calendar_dates_keep_last_in_input_order() {
        let first = DailyRecord::from_value(json!({"nifty": 1.0})).unwrap();
        let second = DailyRecord::from_value(json!({"nifty": 2.0})).unwrap();
        let table =
            build_table_from_pairs(vec![("2025-03-07", &first), ("07-03-2025", &second)]).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.latest("nifty"), Some(&Cell::Number(2.0)));
    }

    #[test]
    fn duplicate_dates_in_snapshot_json_keep_last_written() {
        // 按字符串排序时 "07-03-2025" 在前，必须按 JSON 中的出现顺序处理
        let snapshot = Snapshot::from_json_str(
            r#"{"data": {"2025-03-07": {"nifty": 1}, "07-03-2025": {"nifty": 2}}}"#,
        )
        .unwrap();
        let table = build_table(&snapshot).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.latest("nifty"), Some(&Cell::Number(2.0)));

        let reversed = Snapshot::from_json_str(
            r#"{"data": {"07-03-2025": {"nifty": 2}, "2025-03-07": {"nifty": 1}}}"#,
        )
        .unwrap();
        let table = build_table(&reversed).unwrap();
        assert_eq!(table.latest("nifty"), Some(&Cell::Number(1.0)));
    }
}
