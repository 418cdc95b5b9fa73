pub mod builder;
pub mod view;

use chrono::NaiveDate;

use crate::errors::{FlowError, Result};
use crate::models::row::{CanonicalRow, Cell, Column};
pub use builder::{build_table, build_table_from_pairs};
pub use view::TableView;

/// 按日期升序排列的规范化数据表。构建后只读，过滤只产生视图。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowTable {
    columns: Vec<Column>,
    rows: Vec<CanonicalRow>,
}

impl FlowTable {
    /// 空表，对应 "暂无数据" 的快照
    pub fn empty() -> Self {
        Self::default()
    }

    /// 从已对齐的列与行构建，校验行宽与日期严格升序
    pub fn from_parts(columns: Vec<Column>, rows: Vec<CanonicalRow>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|row| row.cells.len() != columns.len()) {
            return Err(FlowError::DataError(format!(
                "Row {} has {} cells, expected {}",
                row.date,
                row.cells.len(),
                columns.len()
            )));
        }
        if let Some(pair) = rows.windows(2).find(|pair| pair[0].date >= pair[1].date) {
            return Err(FlowError::DataError(format!(
                "Rows are not in ascending date order at {}",
                pair[1].date
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// 整表视图
    pub fn view(&self) -> TableView<'_> {
        TableView::new(self, &self.rows)
    }

    /// 闭区间日期过滤，边界可省略
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> TableView<'_> {
        self.view().between(start, end)
    }

    /// 最后一行的值，空表或缺失时为 None
    pub fn latest(&self, column: &str) -> Option<&Cell> {
        self.view().latest(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::row::ColumnKind;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn from_parts_rejects_misaligned_rows() {
        let columns = vec![Column::new("nifty", ColumnKind::Number)];
        let rows = vec![CanonicalRow {
            date: date("2025-03-07"),
            cells: vec![],
        }];
        assert!(FlowTable::from_parts(columns, rows).is_err());
    }

    #[test]
    fn from_parts_rejects_unsorted_rows() {
        let columns = vec![Column::new("nifty", ColumnKind::Number)];
        let rows = vec![
            CanonicalRow {
                date: date("2025-03-07"),
                cells: vec![None],
            },
            CanonicalRow {
                date: date("2025-03-06"),
                cells: vec![None],
            },
        ];
        assert!(FlowTable::from_parts(columns, rows).is_err());
    }

    #[test]
    fn empty_table_latest_is_unavailable() {
        let table = FlowTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.latest("nifty"), None);
        assert!(table.view().is_empty());
    }
}
