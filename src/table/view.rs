use chrono::NaiveDate;

use crate::errors::{FlowError, Result};
use crate::models::row::{CanonicalRow, Cell, Column, ColumnKind};
use crate::table::FlowTable;

/// 表的连续子区间，借用基础表，不做任何修改
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    table: &'a FlowTable,
    rows: &'a [CanonicalRow],
}

impl<'a> TableView<'a> {
    pub(crate) fn new(table: &'a FlowTable, rows: &'a [CanonicalRow]) -> Self {
        Self { table, rows }
    }

    pub fn table(&self) -> &'a FlowTable {
        self.table
    }

    pub fn columns(&self) -> &'a [Column] {
        self.table.columns()
    }

    pub fn column(&self, name: &str) -> Option<&'a Column> {
        self.table.column_index(name).map(|i| &self.table.columns()[i])
    }

    pub fn rows(&self) -> &'a [CanonicalRow] {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|row| row.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|row| row.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.date)
    }

    /// 闭区间过滤。行已按日期排序，区间用二分查找确定。
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> TableView<'a> {
        let lo = start.map_or(0, |start| self.rows.partition_point(|row| row.date < start));
        let hi = end.map_or(self.rows.len(), |end| {
            self.rows.partition_point(|row| row.date <= end)
        });
        let rows = if lo < hi { &self.rows[lo..hi] } else { &self.rows[..0] };
        TableView::new(self.table, rows)
    }

    /// 数值列。列不存在返回 `Ok(None)`，文本列返回错误。
    pub fn numeric_values(&self, name: &str) -> Result<Option<Vec<Option<f64>>>> {
        let Some(index) = self.table.column_index(name) else {
            return Ok(None);
        };
        if self.table.columns()[index].kind != ColumnKind::Number {
            return Err(FlowError::NotNumeric {
                column: name.to_string(),
            });
        }
        Ok(Some(
            self.rows
                .iter()
                .map(|row| row.cell(index).and_then(Cell::as_f64))
                .collect(),
        ))
    }

    /// 文本列，列不存在返回 None
    pub fn text_values(&self, name: &str) -> Option<Vec<Option<&'a str>>> {
        let index = self.table.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.cell(index).and_then(Cell::as_str))
                .collect(),
        )
    }

    /// 最后一行的值。空视图时为 None，调用方应视为 "不可用"。
    pub fn latest(&self, name: &str) -> Option<&'a Cell> {
        let index = self.table.column_index(name)?;
        self.rows.last()?.cell(index)
    }

    /// 最近一个非缺失值及其日期
    pub fn latest_present(&self, name: &str) -> Option<(NaiveDate, &'a Cell)> {
        let index = self.table.column_index(name)?;
        self.rows
            .iter()
            .rev()
            .find_map(|row| row.cell(index).map(|cell| (row.date, cell)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table() -> FlowTable {
        let columns = vec![
            Column::new("nifty", ColumnKind::Number),
            Column::new("fii_cash_view", ColumnKind::Text),
        ];
        let rows = ["2025-03-03", "2025-03-04", "2025-03-06", "2025-03-07"]
            .iter()
            .enumerate()
            .map(|(i, d)| CanonicalRow {
                date: date(d),
                cells: vec![
                    if i == 3 { None } else { Some(Cell::Number(22000.0 + i as f64)) },
                    Some(Cell::Text("BULLISH".to_string())),
                ],
            })
            .collect();
        FlowTable::from_parts(columns, rows).unwrap()
    }

    #[test]
    fn between_is_inclusive_and_tolerates_gaps() {
        let table = table();
        let view = table.between(Some(date("2025-03-04")), Some(date("2025-03-06")));
        assert_eq!(view.dates(), vec![date("2025-03-04"), date("2025-03-06")]);

        let view = table.between(Some(date("2025-03-05")), None);
        assert_eq!(view.first_date(), Some(date("2025-03-06")));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn inverted_range_is_empty() {
        let table = table();
        let view = table.between(Some(date("2025-03-07")), Some(date("2025-03-03")));
        assert!(view.is_empty());
        assert_eq!(view.latest("nifty"), None);
    }

    #[test]
    fn filtering_does_not_touch_base_table() {
        let table = table();
        let before = table.clone();
        let _ = table.between(Some(date("2025-03-06")), None);
        assert_eq!(table, before);
    }

    #[test]
    fn numeric_values_distinguish_missing_and_text_columns() {
        let table = table();
        let view = table.view();
        assert_eq!(view.numeric_values("banknifty").unwrap(), None);
        assert!(matches!(
            view.numeric_values("fii_cash_view"),
            Err(FlowError::NotNumeric { .. })
        ));
        let nifty = view.numeric_values("nifty").unwrap().unwrap();
        assert_eq!(nifty[3], None);
    }

    #[test]
    fn latest_and_latest_present() {
        let table = table();
        let view = table.view();
        assert_eq!(view.latest("nifty"), None);
        assert_eq!(
            view.latest_present("nifty"),
            Some((date("2025-03-06"), &Cell::Number(22002.0)))
        );
    }
}
