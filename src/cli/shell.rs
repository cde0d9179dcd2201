use std::io::{self, BufRead, IsTerminal};

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::cli::session::Session;
use crate::cli::{accounts, import, report, transactions};
use crate::error::{OreganoError, Result};

type Handler = fn(&mut Session, &[String]) -> Result<()>;

struct Command {
    names: &'static [&'static str],
    usage: &'static str,
    about: &'static str,
    handler: Handler,
}

const COMMANDS: &[Command] = &[
    Command {
        names: &["ls", "list"],
        usage: "ls [-t] [-a] [-i]",
        about: "List accounts (with type, anchor, id)",
        handler: accounts::list,
    },
    Command {
        names: &["account"],
        usage: "account <alias> [-t TYPE] [-a AMOUNT DATE]",
        about: "Create a manual account",
        handler: accounts::create,
    },
    Command {
        names: &["alias"],
        usage: "alias <account> <alias>",
        about: "Give an account a new alias",
        handler: accounts::alias,
    },
    Command {
        names: &["remove", "rm"],
        usage: "remove <account|transaction>",
        about: "Remove an account (and its transactions) or a transaction",
        handler: accounts::remove,
    },
    Command {
        names: &["anchor"],
        usage: "anchor <account> <amount> <date>",
        about: "Record a known balance at a point in time",
        handler: accounts::anchor,
    },
    Command {
        names: &["balance", "bal"],
        usage: "balance <account>",
        about: "Show the current balance of an account",
        handler: accounts::balance,
    },
    Command {
        names: &["new"],
        usage: "new <account> <payee> <amount> [-d DATE] [-c CATEGORY] [--desc TEXT] [--inst TEXT]",
        about: "Add a transaction",
        handler: transactions::create,
    },
    Command {
        names: &["transactions", "trsn"],
        usage: "trsn <account> [-n COUNT] [-s START] [-e END]",
        about: "List recent transactions of an account",
        handler: transactions::list,
    },
    Command {
        names: &["print", "p"],
        usage: "print <item> [-a]",
        about: "Show one account or transaction",
        handler: transactions::print,
    },
    Command {
        names: &["edit"],
        usage: "edit <transaction> [--account A] [-p PAYEE] [-a AMOUNT] [-d DATE] [-c CATEGORY] [--desc TEXT] [--inst TEXT]",
        about: "Change fields of a transaction",
        handler: transactions::edit,
    },
    Command {
        names: &["sums"],
        usage: "sums [-s START] [-e END] [-g category|payee|account|month] [-a ACCOUNT]",
        about: "Total amounts per group",
        handler: report::sums,
    },
    Command {
        names: &["import"],
        usage: "import <file.csv> [-m SPEC] [-H]",
        about: "Import transactions from a CSV file",
        handler: import::run,
    },
];

#[derive(Debug, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Exit,
}

fn print_help() {
    println!("oregano - terminal budgeting");
    println!("Items shown in a listing get a number that later commands accept in place of an id.");
    println!();
    println!("  {:<12} Print this menu", "help (h)");
    println!("  {:<12} Quit oregano", "quit (q)");
    for cmd in COMMANDS {
        println!("  {:<12} {}", cmd.names.join(" | "), cmd.about);
        println!("  {:<12}   {}", "", cmd.usage.dimmed());
    }
}

fn dispatch(session: &mut Session, tokens: &[String]) -> Result<LoopControl> {
    let name = tokens[0].to_lowercase();
    match name.as_str() {
        "h" | "help" => {
            print_help();
            return Ok(LoopControl::Continue);
        }
        "q" | "quit" | "exit" => return Ok(LoopControl::Exit),
        _ => {}
    }
    let command = COMMANDS
        .iter()
        .find(|c| c.names.contains(&name.as_str()))
        .ok_or_else(|| {
            OreganoError::Other(format!("Unrecognized command '{name}'. Type 'help' for valid commands"))
        })?;
    (command.handler)(session, tokens)?;
    Ok(LoopControl::Continue)
}

fn handle_line(session: &mut Session, line: &str) -> LoopControl {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red());
            return LoopControl::Continue;
        }
    };
    if tokens.is_empty() {
        return LoopControl::Continue;
    }
    tracing::debug!(?tokens, "command");
    match dispatch(session, &tokens) {
        Ok(control) => control,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red());
            let name = tokens[0].to_lowercase();
            if let Some(cmd) = COMMANDS.iter().find(|c| c.names.contains(&name.as_str())) {
                if matches!(
                    e,
                    OreganoError::UnrecognizedFlag(_)
                        | OreganoError::MissingArguments { .. }
                        | OreganoError::MissingRequiredPositional
                ) {
                    eprintln!("Usage: {}", cmd.usage);
                }
            }
            LoopControl::Continue
        }
    }
}

fn run_interactive(session: &mut Session) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("Welcome to oregano, the cli budget program");
    println!("For help, use 'help' (h). To quit, use 'quit' (q)");

    loop {
        match editor.readline(&format!("{} ", "oregano >>".green())) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if handle_line(session, trimmed) == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn run_script(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if handle_line(session, trimmed) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Read commands until `quit` or end of input. A terminal gets a line
/// editor with history; piped input is read one command per line.
pub fn run(session: &mut Session) -> Result<()> {
    if io::stdin().is_terminal() {
        run_interactive(session)
    } else {
        run_script(session)
    }
}
