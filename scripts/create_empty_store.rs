use anyhow::Result;
use iex_datahub::data_provider::EquityStore;
use std::path::Path;

fn main() -> Result<()> {
    let dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let dir = Path::new(&dir);

    // 写入三个空表
    EquityStore::new().save_to_dir(dir)?;

    println!("Created empty store in {}", dir.display());
    Ok(())
}
