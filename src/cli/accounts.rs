use colored::Colorize;

use crate::cli::session::{Session, Target};
use crate::cli::view::{account_detail, accounts_table, AccountColumns};
use crate::error::Result;
use crate::flags::{parse, FlagSchema, POSITIONAL};
use crate::importer::{parse_amount, parse_date};
use crate::models::{Account, AccountType};
use crate::worklist::EntryKind;

/// `ls [-t|--type] [-a|--anchor] [-i|--id]`
pub fn list(session: &mut Session, tokens: &[String]) -> Result<()> {
    let schema = FlagSchema::new(&[
        ("-t", 0),
        ("--type", 0),
        ("-a", 0),
        ("--anchor", 0),
        ("-i", 0),
        ("--id", 0),
    ]);
    let flags = parse(tokens, &schema)?;
    let cols = AccountColumns {
        show_type: flags.first_of(&["-t", "--type"]).is_some(),
        show_anchor: flags.first_of(&["-a", "--anchor"]).is_some(),
        show_id: flags.first_of(&["-i", "--id"]).is_some(),
    };

    let accounts = session.model.get_accounts()?;
    if accounts.is_empty() {
        println!("No accounts yet. Create one with `account <alias>`.");
        return Ok(());
    }
    let mut rows = Vec::with_capacity(accounts.len());
    for acc in &accounts {
        let balance = session.model.get_current_balance(&acc.id)?;
        let wid = session.register(EntryKind::Account, &acc.id);
        rows.push((wid, acc, balance));
    }
    println!("{}", accounts_table(&rows, cols));
    Ok(())
}

/// `account <alias> [-t|--type TYPE] [-a|--anchor AMOUNT DATE]`
pub fn create(session: &mut Session, tokens: &[String]) -> Result<()> {
    let schema = FlagSchema::new(&[
        (POSITIONAL, 1),
        ("-t", 1),
        ("--type", 1),
        ("-a", 2),
        ("--anchor", 2),
    ]);
    let flags = parse(tokens, &schema)?;

    let mut builder = Account::builder().alias(flags.positional()[0].as_str());
    if let Some(ty) = flags.value_of(&["-t", "--type"]) {
        builder = builder.account_type(ty.parse::<AccountType>()?);
    }
    if let Some(anchor) = flags.first_of(&["-a", "--anchor"]) {
        builder = builder.anchor(parse_amount(&anchor[0])?, parse_date(&anchor[1])?);
    }
    let account = builder.build();
    session.model.add_account(&account)?;

    let wid = session.register(EntryKind::Account, &account.id);
    println!(
        "Created {} account {} [{wid}]",
        account.account_type,
        account.alias_or_id().bold()
    );
    Ok(())
}

/// `alias <account> <new-alias>`
pub fn alias(session: &mut Session, tokens: &[String]) -> Result<()> {
    let flags = parse(tokens, &FlagSchema::new(&[(POSITIONAL, 2)]))?;
    let args = flags.positional();
    let id = session.account_id(&args[0])?;
    session.model.set_alias(&id, &args[1])?;
    println!("Alias set: {}", args[1].bold());
    Ok(())
}

/// `remove <account|transaction>`; removing an account drops its transactions.
pub fn remove(session: &mut Session, tokens: &[String]) -> Result<()> {
    let flags = parse(tokens, &FlagSchema::new(&[(POSITIONAL, 1)]))?;
    match session.target(&flags.positional()[0])? {
        Target::Account(id) => {
            let removed = session.model.remove_account(&id)?;
            println!("Removed account {}", removed.alias_or_id().bold());
        }
        Target::Transaction(id) => {
            session.model.remove_transaction(&id)?;
            println!("Removed transaction {id}");
        }
    }
    Ok(())
}

/// `anchor <account> <amount> <date>`
pub fn anchor(session: &mut Session, tokens: &[String]) -> Result<()> {
    let flags = parse(tokens, &FlagSchema::new(&[(POSITIONAL, 3)]))?;
    let args = flags.positional();
    let id = session.account_id(&args[0])?;
    let amount = parse_amount(&args[1])?;
    let date = parse_date(&args[2])?;
    session.model.set_anchor(&id, amount, &date)?;
    println!("Anchor set: {} on {}", args[1], date.format("%Y/%m/%d"));
    Ok(())
}

/// `balance <account>`
pub fn balance(session: &mut Session, tokens: &[String]) -> Result<()> {
    let flags = parse(tokens, &FlagSchema::new(&[(POSITIONAL, 1)]))?;
    let id = session.account_id(&flags.positional()[0])?;
    let acc = session.model.get_account(&id)?;
    let balance = session.model.get_current_balance(&id)?;
    println!("{}: {}", acc.alias_or_id(), crate::fmt::money(balance));
    Ok(())
}

pub fn print_account(session: &mut Session, id: &str) -> Result<()> {
    let acc = session.model.get_account(id)?;
    let balance = session.model.get_current_balance(id)?;
    println!("{}", account_detail(&acc, balance));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::session::test_session;
    use crate::error::OreganoError;
    use crate::models::Transaction;

    fn line(s: &str) -> Vec<String> {
        shell_words::split(s).unwrap()
    }

    #[test]
    fn test_create_with_type_and_anchor() {
        let (_dir, mut s) = test_session();
        create(&mut s, &line("account chase -t credit_card --anchor 250.00 2024-01-01")).unwrap();
        let acc = s.model.get_account("chase").unwrap();
        assert_eq!(acc.account_type, AccountType::CreditCard);
        assert_eq!(acc.anchor_balance, 250.0);
        assert_eq!(s.worklist.len(), 1);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let (_dir, mut s) = test_session();
        assert!(matches!(create(&mut s, &line("account")), Err(OreganoError::MissingRequiredPositional)));
        assert!(matches!(
            create(&mut s, &line("account 12")),
            Err(OreganoError::InvalidAlias(_))
        ));
        assert!(create(&mut s, &line("account x --type brokerage")).is_err());
        assert!(s.model.get_accounts().unwrap().is_empty());
    }

    #[test]
    fn test_alias_by_handle() {
        let (_dir, mut s) = test_session();
        create(&mut s, &line("account chase")).unwrap();
        alias(&mut s, &line("alias 0 sapphire")).unwrap();
        assert!(s.model.is_valid_account_alias("sapphire").unwrap());
        assert!(!s.model.is_valid_account_alias("chase").unwrap());
    }

    #[test]
    fn test_remove_account_or_transaction() {
        let (_dir, mut s) = test_session();
        create(&mut s, &line("account chase")).unwrap();
        let id = s.model.get_account_id("chase").unwrap();
        let tr = Transaction::new(&id, "x", 1.0);
        s.model.add_transaction(&tr).unwrap();

        remove(&mut s, &line(&format!("rm {}", tr.id))).unwrap();
        assert!(s.model.get_transaction_by_id(&tr.id).is_err());
        remove(&mut s, &line("rm chase")).unwrap();
        assert!(s.model.get_accounts().unwrap().is_empty());
        assert!(matches!(remove(&mut s, &line("rm chase")), Err(OreganoError::NotFound(_))));
    }

    #[test]
    fn test_anchor_and_balance() {
        let (_dir, mut s) = test_session();
        create(&mut s, &line("account chase")).unwrap();
        anchor(&mut s, &line("anchor chase 100 2024-01-01")).unwrap();
        let id = s.model.get_account_id("chase").unwrap();
        let acc = s.model.get_account(&id).unwrap();
        assert_eq!(acc.anchor_balance, 100.0);
        assert!(matches!(
            anchor(&mut s, &line("anchor chase abc 2024-01-01")),
            Err(OreganoError::Parse { .. })
        ));
        balance(&mut s, &line("bal chase")).unwrap();
    }

    #[test]
    fn test_anchor_rejects_nan() {
        let (_dir, mut s) = test_session();
        create(&mut s, &line("account chase --anchor 100 2024-01-01")).unwrap();
        assert!(matches!(
            anchor(&mut s, &line("anchor chase NaN 2024-01-01")),
            Err(OreganoError::Parse { what: "amount", .. })
        ));
        assert_eq!(s.model.get_account("chase").unwrap().anchor_balance, 100.0);
    }

    #[test]
    fn test_list_registers_handles() {
        let (_dir, mut s) = test_session();
        create(&mut s, &line("account a")).unwrap();
        create(&mut s, &line("account b")).unwrap();
        list(&mut s, &line("ls -t --id")).unwrap();
        assert_eq!(s.worklist.len(), 4);
        assert!(matches!(list(&mut s, &line("ls --bogus")), Err(OreganoError::UnrecognizedFlag(_))));
    }
}
