use std::path::{Path, PathBuf};

use rusqlite::backup::Backup;

use crate::db::get_connection;
use crate::error::{OreganoError, Result};
use crate::settings::{shellexpand_path, DB_FILENAME};

/// Copy the live database with SQLite's online backup. Returns where it went.
pub fn run(data_dir: &Path, output: Option<String>) -> Result<PathBuf> {
    let db_path = data_dir.join(DB_FILENAME);
    if !db_path.exists() {
        return Err(OreganoError::Other(format!(
            "No database at {}. Run `oregano init` first.",
            db_path.display()
        )));
    }
    let conn = get_connection(&db_path)?;

    let dest_path = match output {
        Some(p) => PathBuf::from(shellexpand_path(&p)),
        None => {
            let backups_dir = data_dir.join("backups");
            std::fs::create_dir_all(&backups_dir)?;
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            backups_dir.join(format!("oregano-{stamp}.db"))
        }
    };

    let mut dest_conn = rusqlite::Connection::open(&dest_path)?;
    let backup = Backup::new(&conn, &mut dest_conn)?;
    backup.run_to_completion(100, std::time::Duration::from_millis(10), None)?;
    tracing::info!(dest = %dest_path.display(), "backup written");

    let size = std::fs::metadata(&dest_path)?.len();
    println!("Backup saved to {} ({size} bytes)", dest_path.display());
    Ok(dest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::models::Account;

    #[test]
    fn test_backup_copies_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let model = Model::open(&dir.path().join(DB_FILENAME)).unwrap();
        model.add_account(&Account::builder().alias("chase").build()).unwrap();

        let dest = run(dir.path(), Some(dir.path().join("copy.db").to_string_lossy().to_string())).unwrap();
        let copy = Model::open(&dest).unwrap();
        assert!(copy.is_valid_account_alias("chase").unwrap());
    }

    #[test]
    fn test_backup_default_location() {
        let dir = tempfile::tempdir().unwrap();
        Model::open(&dir.path().join(DB_FILENAME)).unwrap();
        let dest = run(dir.path(), None).unwrap();
        assert!(dest.starts_with(dir.path().join("backups")));
    }

    #[test]
    fn test_backup_without_database() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(dir.path(), None).is_err());
    }
}
