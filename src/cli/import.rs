use std::io::IsTerminal;
use std::path::PathBuf;

use colored::Colorize;
use dialoguer::{Confirm, Select};

use crate::cli::session::Session;
use crate::error::{OreganoError, Result};
use crate::flags::{parse, FlagSchema, POSITIONAL};
use crate::importer::{import_records, read_records, try_build_transaction, ColumnMap, Field};
use crate::model::Model;
use crate::settings::shellexpand_path;

const SAMPLE_ROWS: usize = 3;

fn sample_values(records: &[Vec<String>], col: usize, skip: usize) -> String {
    records
        .iter()
        .skip(skip)
        .take(SAMPLE_ROWS)
        .map(|r| r.get(col).map(|v| v.split_whitespace().collect::<Vec<_>>().join(" ")).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ask which field each column holds. `None` means the user cancelled.
fn prompt_column_map(records: &[Vec<String>], has_headers: bool) -> Result<Option<ColumnMap>> {
    let mut map = ColumnMap::new();
    let width = records.first().map(Vec::len).unwrap_or(0);
    let skip = usize::from(has_headers);

    for col in 0..width {
        let name = if has_headers {
            records[0].get(col).cloned().unwrap_or_default()
        } else {
            format!("#{col}")
        };
        println!(
            "Which field does column {} belong to?\n    ({})",
            name.bold(),
            sample_values(records, col, skip).dimmed()
        );

        let free = map.unassigned();
        let mut items: Vec<String> = free.iter().map(|f| f.label().to_string()).collect();
        items.push("Ignore".into());
        items.push("Cancel".into());
        let choice = Select::new().items(&items).default(items.len() - 2).interact()?;

        if choice == items.len() - 1 {
            return Ok(None);
        }
        if let Some(field) = free.get(choice) {
            println!("Mapping {name} to {field}");
            map.assign(*field, col);
        }
    }
    Ok(Some(map))
}

/// Run the mapping prompts until the first row converts and the user accepts.
fn column_map_wizard(records: &[Vec<String>], has_headers: bool) -> Result<Option<ColumnMap>> {
    let first = usize::from(has_headers);
    loop {
        let Some(map) = prompt_column_map(records, has_headers)? else {
            return Ok(None);
        };
        let preview = records.get(first).map(|r| try_build_transaction(r, &map));
        let usable = match preview {
            Some(Ok(tr)) => {
                println!("The first row reads as:\n  {} | {} | {}", tr.account_id, tr.payee, tr.amount);
                true
            }
            Some(Err(e)) => {
                println!("{} {e}", "Could not read the first row:".red());
                false
            }
            None => false,
        };
        let question = if usable {
            "Reassign columns? (No starts the import)"
        } else {
            "Retry column assignment?"
        };
        let again = Confirm::new().with_prompt(question).default(!usable).interact()?;
        if !again {
            return Ok(usable.then_some(map));
        }
    }
}

fn choose_account(model: &Model, name: &str) -> Result<String> {
    if !std::io::stdin().is_terminal() {
        return Err(OreganoError::NotFound(name.to_string()));
    }
    let accounts = model.get_accounts()?;
    if accounts.is_empty() {
        return Err(OreganoError::Other("Create an account before importing".into()));
    }
    let labels: Vec<&str> = accounts.iter().map(|a| a.alias_or_id()).collect();
    println!("Account '{name}' does not match a known account. Pick the one it refers to:");
    let idx = Select::new().items(&labels).default(0).interact()?;
    Ok(accounts[idx].id.clone())
}

/// `import <file> [-m|--map SPEC] [-H|--headers]`
///
/// Without `--map` the column mapping is asked for interactively.
pub fn run(session: &mut Session, tokens: &[String]) -> Result<()> {
    let schema = FlagSchema::new(&[
        (POSITIONAL, 1),
        ("-m", 1),
        ("--map", 1),
        ("-H", 0),
        ("--headers", 0),
    ]);
    let flags = parse(tokens, &schema)?;
    let path = PathBuf::from(shellexpand_path(&flags.positional()[0]));

    let records = read_records(&path)?;
    if records.is_empty() {
        return Err(OreganoError::Other(format!("{} has no rows", path.display())));
    }
    let spec = flags.value_of(&["-m", "--map"]);
    let has_headers = if flags.first_of(&["-H", "--headers"]).is_some() {
        true
    } else if spec.is_some() {
        false
    } else {
        let first = records[0].iter().take(3).cloned().collect::<Vec<_>>().join(", ");
        Confirm::new()
            .with_prompt(format!("Is the first row a header? ({first})"))
            .default(false)
            .interact()?
    };

    let map = match spec {
        Some(spec) => spec.parse::<ColumnMap>()?,
        None => match column_map_wizard(&records, has_headers)? {
            Some(map) => map,
            None => {
                println!("Import cancelled.");
                return Ok(());
            }
        },
    };
    let missing = map.missing_required();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(Field::label).collect();
        return Err(OreganoError::Other(format!("Missing required columns: {}", names.join(", "))));
    }

    println!("Processing...");
    let model = &session.model;
    let result = import_records(model, &path, &records, &map, has_headers, |name| {
        choose_account(model, name)
    })?;
    if result.duplicate_file {
        println!("{}", "This file has already been imported.".yellow());
        return Ok(());
    }

    for (row, reason) in &result.failed {
        println!("{} row {row}: {reason}", "Skipped".yellow());
    }
    println!(
        "Imported {} transaction(s) from {}",
        result.imported.to_string().green(),
        path.display()
    );
    Ok(())
}
