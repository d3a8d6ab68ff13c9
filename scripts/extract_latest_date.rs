use anyhow::{bail, Context, Result};
use arrow_array::{Array, StringArray};
use arrow_ipc::reader::FileReader;
use chrono::NaiveDate;
use iex_datahub::util::parse_iso_date;
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    // 检查数据文件是否存在
    let arrow_path = Path::new("data/equities.arrow");
    if !arrow_path.exists() {
        bail!("data/equities.arrow not found, run 'cargo run --bin iex_datahub -- chart -s <SYMBOL> --save' first");
    }

    let file = fs::File::open(arrow_path)?;
    let reader = FileReader::try_new(file, None)?;

    // 查找最新交易日期
    let mut latest_date: Option<NaiveDate> = None;

    for batch_result in reader {
        let batch = batch_result?;
        let date_array = batch
            .column_by_name("date")
            .and_then(|a| a.as_any().downcast_ref::<StringArray>())
            .context("equities.arrow has no utf8 date column")?;

        for i in 0..date_array.len() {
            let date = parse_iso_date(date_array.value(i))
                .with_context(|| format!("invalid date {}", date_array.value(i)))?;
            if latest_date.map_or(true, |latest| date > latest) {
                latest_date = Some(date);
            }
        }
    }

    match latest_date {
        Some(date) => println!("Latest trading date: {}", date),
        None => println!("No trading dates stored"),
    }

    Ok(())
}
