pub mod accounts;
pub mod backup;
pub mod import;
pub mod init;
pub mod report;
pub mod session;
pub mod shell;
pub mod status;
pub mod transactions;
pub mod view;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "oregano", version, about = "Track accounts and transactions from the terminal.")]
pub struct Cli {
    /// Directory holding oregano.db (overrides settings and OREGANO_DATA_DIR)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// More log output; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive shell (default).
    Shell,
    /// Create the data directory and database.
    Init,
    /// Show the data directory and record counts.
    Status,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/oregano-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_shell() {
        let cli = Cli::try_parse_from(["oregano"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["oregano", "backup", "--output", "x.db", "--data-dir", "/d", "-vv"]).unwrap();
        assert_eq!(cli.data_dir.as_deref(), Some("/d"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Backup { output: Some(ref o) }) if o == "x.db"));
    }
}
