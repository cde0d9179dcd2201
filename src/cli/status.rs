use std::path::Path;

use crate::error::Result;
use crate::model::Model;
use crate::settings::{Settings, DB_FILENAME};

pub fn run(settings: &Settings, data_dir: &Path) -> Result<()> {
    let db_path = data_dir.join(DB_FILENAME);

    println!("Data dir:      {}", data_dir.display());
    println!("Database:      {}", db_path.display());
    println!("Default count: {}", settings.default_count);

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `oregano init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:       {size} bytes");

    let model = Model::open(&db_path)?;
    let accounts = model.accounts().count()?;
    let transactions = model.transactions().count()?;
    let imports: i64 = model
        .connection()
        .query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;

    println!();
    println!("Accounts:      {accounts}");
    println!("Transactions:  {transactions}");
    println!("Imports:       {imports}");
    Ok(())
}
