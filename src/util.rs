use chrono::{DateTime, NaiveDate, NaiveDateTime};
use crate::errors::{FlowError, Result};

// 日期转换工具
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d-%b-%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// 将快照中的日期字符串解析为日历日期，时间部分丢弃
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    let trimmed = date_str.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(datetime.date_naive());
    }

    Err(FlowError::MalformedDate {
        date: date_str.to_string(),
    })
}

/// CLI 的日期参数，统一使用 YYYY-MM-DD
pub fn parse_cli_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| FlowError::MalformedDate {
        date: date_str.to_string(),
    })
}

// Arrow数据转换工具
pub mod arrow_utils {
    use super::*;
    use crate::models::row::{CanonicalRow, Cell, Column, ColumnKind};
    use crate::table::{FlowTable, TableView};
    use arrow::array::{ArrayRef, Float64Builder, StringBuilder};
    use arrow::record_batch::RecordBatch;
    use arrow_array::types::Date32Type;
    use arrow_array::{Array, Date32Array, Float64Array, StringArray};
    use arrow_ipc::reader::FileReader;
    use arrow_ipc::writer::FileWriter;
    use arrow_schema::{DataType, Field, Schema};
    use log::info;
    use std::io::Cursor;
    use std::sync::Arc;

    fn arrow_type(kind: ColumnKind) -> DataType {
        match kind {
            ColumnKind::Number => DataType::Float64,
            ColumnKind::Text => DataType::Utf8,
        }
    }

    /// 表结构对应的 Arrow Schema，首列为 date
    pub fn table_schema(columns: &[Column]) -> Schema {
        let mut fields = vec![Field::new("date", DataType::Date32, false)];
        fields.extend(
            columns
                .iter()
                .map(|column| Field::new(&column.name, arrow_type(column.kind), true)),
        );
        Schema::new(fields)
    }

    // 将视图转换为Arrow记录批次
    pub fn table_to_record_batch(view: &TableView<'_>) -> Result<RecordBatch> {
        let columns = view.columns();
        let rows = view.rows();

        let dates = Date32Array::from(
            rows.iter()
                .map(|row| Date32Type::from_naive_date(row.date))
                .collect::<Vec<i32>>(),
        );
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(dates)];

        for (i, column) in columns.iter().enumerate() {
            let array: ArrayRef = match column.kind {
                ColumnKind::Number => {
                    let mut builder = Float64Builder::with_capacity(rows.len());
                    for row in rows {
                        builder.append_option(row.cell(i).and_then(Cell::as_f64));
                    }
                    Arc::new(builder.finish())
                }
                ColumnKind::Text => {
                    let mut builder = StringBuilder::new();
                    for row in rows {
                        builder.append_option(row.cell(i).and_then(Cell::as_str));
                    }
                    Arc::new(builder.finish())
                }
            };
            arrays.push(array);
        }

        Ok(RecordBatch::try_new(Arc::new(table_schema(columns)), arrays)?)
    }

    /// 由记录批次还原数据表
    pub fn record_batch_to_table(batch: &RecordBatch) -> Result<FlowTable> {
        let schema = batch.schema();
        let date_array = batch
            .column_by_name("date")
            .and_then(|a| a.as_any().downcast_ref::<Date32Array>())
            .ok_or_else(|| FlowError::ArrowError("Missing date column".to_string()))?;

        let mut rows: Vec<CanonicalRow> = (0..batch.num_rows())
            .map(|i| {
                date_array
                    .value_as_date(i)
                    .map(|date| CanonicalRow { date, cells: Vec::new() })
                    .ok_or_else(|| FlowError::ArrowError(format!("Invalid date at row {}", i)))
            })
            .collect::<Result<_>>()?;

        let mut columns = Vec::new();
        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            if field.name() == "date" {
                continue;
            }
            if let Some(values) = array.as_any().downcast_ref::<Float64Array>() {
                for (i, row) in rows.iter_mut().enumerate() {
                    let cell = (!values.is_null(i)).then(|| Cell::Number(values.value(i)));
                    row.cells.push(cell);
                }
                columns.push(Column::new(field.name(), ColumnKind::Number));
            } else if let Some(values) = array.as_any().downcast_ref::<StringArray>() {
                for (i, row) in rows.iter_mut().enumerate() {
                    let cell = (!values.is_null(i)).then(|| Cell::Text(values.value(i).to_string()));
                    row.cells.push(cell);
                }
                columns.push(Column::new(field.name(), ColumnKind::Text));
            } else {
                return Err(FlowError::ArrowError(format!(
                    "Unsupported column type {} for {}",
                    field.data_type(),
                    field.name()
                )));
            }
        }

        FlowTable::from_parts(columns, rows)
    }

    /// 编码为 Arrow IPC 文件格式的字节，供前端直接读取
    pub fn table_to_ipc_bytes(view: &TableView<'_>) -> Result<Vec<u8>> {
        let batch = table_to_record_batch(view)?;
        let mut buffer = Vec::new();
        {
            let mut writer = FileWriter::try_new(&mut buffer, &batch.schema())?;
            writer.write(&batch)?;
            writer.finish()?;
        }
        info!("Encoded {} rows into {} IPC bytes", batch.num_rows(), buffer.len());
        Ok(buffer)
    }

    // 从内存中读取Arrow数据
    pub fn read_table_from_ipc(data: &[u8]) -> Result<FlowTable> {
        let reader = FileReader::try_new(Cursor::new(data), None)?;
        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }

        match batches.len() {
            0 => Ok(FlowTable::empty()),
            1 => record_batch_to_table(&batches[0]),
            _ => {
                let batch = arrow::compute::concat_batches(&batches[0].schema(), &batches)?;
                record_batch_to_table(&batch)
            }
        }
    }

    /// JSON 行数组，缺失值省略
    pub fn table_to_json_rows(view: &TableView<'_>) -> Result<Vec<u8>> {
        let batch = table_to_record_batch(view)?;
        let mut writer = arrow_json::ArrayWriter::new(Vec::new());
        writer.write_batches(&[&batch])?;
        writer.finish()?;
        Ok(writer.into_inner())
    }
}
