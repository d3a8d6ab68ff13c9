use std::env;
use std::path::Path;

fn main() {
    // 获取项目根目录
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();

    // 检查本地数据是否存在
    let companies_file = Path::new(&manifest_dir).join("data").join("companies.arrow");
    if !companies_file.exists() {
        println!("cargo:warning=data/companies.arrow not found. Recommendations need stored companies.");
        println!("cargo:warning=Run 'cargo run --bin iex_datahub -- symbols --save' to populate it.");
    }
    println!("cargo:rerun-if-changed=data/companies.arrow");
}
