use std::path::Path;

use crate::error::Result;
use crate::model::Model;
use crate::settings::{save_settings, Settings, DB_FILENAME};

/// Create the data directory and database, and remember the directory in
/// settings so later runs find it without `--data-dir`.
pub fn run(mut settings: Settings, data_dir: &Path) -> Result<()> {
    let db_path = data_dir.join(DB_FILENAME);
    let existed = db_path.exists();
    Model::open(&db_path)?;

    let dir = data_dir.to_string_lossy().to_string();
    if settings.data_dir != dir {
        settings.data_dir = dir;
        save_settings(&settings)?;
    }

    if existed {
        println!("Database already initialized at {}", db_path.display());
    } else {
        println!("Initialized database at {}", db_path.display());
    }
    Ok(())
}
