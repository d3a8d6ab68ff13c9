use chrono::NaiveDate;
use crate::errors::Result;

/// 解析 `YYYY-MM-DD` 格式日期
pub fn parse_iso_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
}

// Arrow数据转换工具
pub mod arrow_utils {
    use crate::errors::{Result, DataHubError};
    use crate::models::equity::{Company, DailyRecord, RecommendationRecord};
    use arrow::record_batch::RecordBatch;
    use arrow_array::{Array, ArrayRef, BooleanArray, Float32Array, Float64Array, StringArray, UInt64Array};
    use arrow_ipc::reader::FileReader;
    use arrow_ipc::writer::FileWriter;
    use arrow_json::LineDelimitedWriter;
    use arrow_schema::{DataType, Field, Schema, SchemaRef};
    use log::debug;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;

    pub fn company_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("symbol", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("date", DataType::Utf8, false),
            Field::new("is_enabled", DataType::Boolean, false),
            Field::new("kind", DataType::Utf8, false),
            Field::new("iex_id", DataType::Utf8, false),
        ]))
    }

    pub fn equity_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("symbol", DataType::Utf8, false),
            Field::new("date", DataType::Utf8, false),
            Field::new("open", DataType::Float32, false),
            Field::new("high", DataType::Float32, false),
            Field::new("low", DataType::Float32, false),
            Field::new("close", DataType::Float32, false),
            Field::new("volume", DataType::UInt64, false),
        ]))
    }

    pub fn recommendation_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("symbol", DataType::Utf8, false),
            Field::new("last_date", DataType::Utf8, false),
            Field::new("last_open", DataType::Float32, false),
            Field::new("last_high", DataType::Float32, false),
            Field::new("last_low", DataType::Float32, false),
            Field::new("last_close", DataType::Float32, false),
            Field::new("last_volume", DataType::UInt64, false),
            Field::new("average_volume", DataType::Float64, false),
            Field::new("average_price", DataType::Float64, false),
            Field::new("high_price", DataType::Float64, false),
            Field::new("low_price", DataType::Float64, false),
            Field::new("recommendation", DataType::Utf8, false),
        ]))
    }

    fn utf8<'a, T: 'a, F>(rows: &'a [T], f: F) -> ArrayRef
    where
        F: Fn(&'a T) -> &'a str,
    {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    }

    fn column<'a, A: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a A> {
        batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<A>())
            .ok_or_else(|| DataHubError::ArrowError(format!("Missing or mistyped column {}", name)))
    }

    pub fn companies_to_record_batch(companies: &[Company]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            utf8(companies, |c| c.symbol.as_str()),
            utf8(companies, |c| c.name.as_str()),
            utf8(companies, |c| c.date.as_str()),
            Arc::new(BooleanArray::from(companies.iter().map(|c| c.is_enabled).collect::<Vec<_>>())),
            utf8(companies, |c| c.kind.as_str()),
            utf8(companies, |c| c.iex_id.as_str()),
        ];
        Ok(RecordBatch::try_new(company_schema(), columns)?)
    }

    pub fn record_batch_to_companies(batch: &RecordBatch) -> Result<Vec<Company>> {
        let symbol = column::<StringArray>(batch, "symbol")?;
        let name = column::<StringArray>(batch, "name")?;
        let date = column::<StringArray>(batch, "date")?;
        let is_enabled = column::<BooleanArray>(batch, "is_enabled")?;
        let kind = column::<StringArray>(batch, "kind")?;
        let iex_id = column::<StringArray>(batch, "iex_id")?;

        Ok((0..batch.num_rows())
            .map(|i| Company {
                symbol: symbol.value(i).to_string(),
                name: name.value(i).to_string(),
                date: date.value(i).to_string(),
                is_enabled: is_enabled.value(i),
                kind: kind.value(i).to_string(),
                iex_id: iex_id.value(i).to_string(),
            })
            .collect())
    }

    pub fn records_to_record_batch(records: &[DailyRecord]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            utf8(records, |r| r.symbol.as_str()),
            utf8(records, |r| r.date.as_str()),
            Arc::new(Float32Array::from(records.iter().map(|r| r.open).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(records.iter().map(|r| r.high).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(records.iter().map(|r| r.low).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(records.iter().map(|r| r.close).collect::<Vec<_>>())),
            Arc::new(UInt64Array::from(records.iter().map(|r| r.volume).collect::<Vec<_>>())),
        ];
        Ok(RecordBatch::try_new(equity_schema(), columns)?)
    }

    pub fn record_batch_to_records(batch: &RecordBatch) -> Result<Vec<DailyRecord>> {
        let symbol = column::<StringArray>(batch, "symbol")?;
        let date = column::<StringArray>(batch, "date")?;
        let open = column::<Float32Array>(batch, "open")?;
        let high = column::<Float32Array>(batch, "high")?;
        let low = column::<Float32Array>(batch, "low")?;
        let close = column::<Float32Array>(batch, "close")?;
        let volume = column::<UInt64Array>(batch, "volume")?;

        Ok((0..batch.num_rows())
            .map(|i| DailyRecord {
                symbol: symbol.value(i).to_string(),
                date: date.value(i).to_string(),
                open: open.value(i),
                high: high.value(i),
                low: low.value(i),
                close: close.value(i),
                volume: volume.value(i),
            })
            .collect())
    }

    pub fn recommendations_to_record_batch(rows: &[RecommendationRecord]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            utf8(rows, |r| r.symbol.as_str()),
            utf8(rows, |r| r.last_date.as_str()),
            Arc::new(Float32Array::from(rows.iter().map(|r| r.last_open).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(rows.iter().map(|r| r.last_high).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(rows.iter().map(|r| r.last_low).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(rows.iter().map(|r| r.last_close).collect::<Vec<_>>())),
            Arc::new(UInt64Array::from(rows.iter().map(|r| r.last_volume).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.average_volume).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.average_price).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.high_price).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.low_price).collect::<Vec<_>>())),
            utf8(rows, |r| r.recommendation.as_str()),
        ];
        Ok(RecordBatch::try_new(recommendation_schema(), columns)?)
    }

    pub fn record_batch_to_recommendations(batch: &RecordBatch) -> Result<Vec<RecommendationRecord>> {
        let symbol = column::<StringArray>(batch, "symbol")?;
        let last_date = column::<StringArray>(batch, "last_date")?;
        let last_open = column::<Float32Array>(batch, "last_open")?;
        let last_high = column::<Float32Array>(batch, "last_high")?;
        let last_low = column::<Float32Array>(batch, "last_low")?;
        let last_close = column::<Float32Array>(batch, "last_close")?;
        let last_volume = column::<UInt64Array>(batch, "last_volume")?;
        let average_volume = column::<Float64Array>(batch, "average_volume")?;
        let average_price = column::<Float64Array>(batch, "average_price")?;
        let high_price = column::<Float64Array>(batch, "high_price")?;
        let low_price = column::<Float64Array>(batch, "low_price")?;
        let recommendation = column::<StringArray>(batch, "recommendation")?;

        Ok((0..batch.num_rows())
            .map(|i| RecommendationRecord {
                symbol: symbol.value(i).to_string(),
                last_date: last_date.value(i).to_string(),
                last_open: last_open.value(i),
                last_high: last_high.value(i),
                last_low: last_low.value(i),
                last_close: last_close.value(i),
                last_volume: last_volume.value(i),
                average_volume: average_volume.value(i),
                average_price: average_price.value(i),
                high_price: high_price.value(i),
                low_price: low_price.value(i),
                recommendation: recommendation.value(i).to_string(),
            })
            .collect())
    }

    /// 读取 Arrow 文件中的全部批次，文件不存在时返回空
    pub fn read_batches(path: &Path) -> Result<Vec<RecordBatch>> {
        if !path.exists() {
            debug!("{} does not exist, treating as empty", path.display());
            return Ok(Vec::new());
        }

        let reader = FileReader::try_new(File::open(path)?, None)?;
        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }
        Ok(batches)
    }

    /// 将批次写入 Arrow 文件
    pub fn write_batch(path: &Path, batch: &RecordBatch) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // 使用默认选项，不启用压缩
        let mut writer = FileWriter::try_new(File::create(path)?, &batch.schema())?;
        writer.write(batch)?;
        writer.finish()?;

        debug!("Wrote {} rows to {}", batch.num_rows(), path.display());
        Ok(())
    }

    pub fn read_companies(path: &Path) -> Result<Vec<Company>> {
        let mut companies = Vec::new();
        for batch in read_batches(path)? {
            companies.extend(record_batch_to_companies(&batch)?);
        }
        Ok(companies)
    }

    pub fn read_records(path: &Path) -> Result<Vec<DailyRecord>> {
        let mut records = Vec::new();
        for batch in read_batches(path)? {
            records.extend(record_batch_to_records(&batch)?);
        }
        Ok(records)
    }

    pub fn read_recommendations(path: &Path) -> Result<Vec<RecommendationRecord>> {
        let mut rows = Vec::new();
        for batch in read_batches(path)? {
            rows.extend(record_batch_to_recommendations(&batch)?);
        }
        Ok(rows)
    }

    /// Writes the batches as newline-delimited JSON, one object per row.
    pub fn write_json_lines<W: Write>(out: W, batches: &[RecordBatch]) -> Result<()> {
        let mut writer = LineDelimitedWriter::new(out);
        let refs: Vec<&RecordBatch> = batches.iter().collect();
        writer.write_batches(&refs)?;
        writer.finish()?;
        Ok(())
    }
}
