use crate::cli::accounts::print_account;
use crate::cli::session::{Session, Target};
use crate::cli::view::{transaction_detail, transactions_table};
use crate::error::{OreganoError, Result};
use crate::flags::{parse, FlagSchema, ParsedFlags, POSITIONAL};
use crate::fmt::account_amount;
use crate::importer::{parse_amount, parse_date};
use crate::model::TransactionQuery;
use crate::models::{Transaction, TransactionUpdate};
use crate::worklist::EntryKind;

/// `new <account> <payee> <amount> [-d DATE] [-c CATEGORY] [--desc TEXT] [--inst TEXT]`
pub fn create(session: &mut Session, tokens: &[String]) -> Result<()> {
    let schema = FlagSchema::new(&[
        (POSITIONAL, 3),
        ("-d", 1),
        ("--date", 1),
        ("-c", 1),
        ("--category", 1),
        ("--desc", 1),
        ("--inst", 1),
    ]);
    let flags = parse(tokens, &schema)?;
    let args = flags.positional();

    let account = session.model.get_account(&session.account_id(&args[0])?)?;
    let mut tr = Transaction::new(account.id.as_str(), args[1].as_str(), parse_amount(&args[2])?);
    if let Some(date) = flags.value_of(&["-d", "--date"]) {
        tr = tr.with_date(parse_date(date)?);
    }
    if let Some(category) = flags.value_of(&["-c", "--category"]) {
        tr = tr.with_category(category);
    }
    if let Some(desc) = flags.value_of(&["--desc"]) {
        tr = tr.with_description(desc);
    }
    if let Some(inst) = flags.value_of(&["--inst"]) {
        tr = tr.with_inst_description(inst);
    }

    let id = session.model.add_transaction(&tr)?;
    let wid = session.register(EntryKind::Transaction, &id);
    println!(
        "Added transaction [{wid}]: {} {}",
        tr.payee,
        account_amount(account.account_type, tr.amount)
    );
    Ok(())
}

/// `trsn <account> [-n COUNT] [-s START] [-e END]`
pub fn list(session: &mut Session, tokens: &[String]) -> Result<()> {
    let schema = FlagSchema::new(&[
        (POSITIONAL, 1),
        ("-n", 1),
        ("--count", 1),
        ("-s", 1),
        ("--start", 1),
        ("-e", 1),
        ("--end", 1),
    ]);
    let flags = parse(tokens, &schema)?;

    let mut query = TransactionQuery {
        count: session.settings.default_count,
        ..Default::default()
    };
    if let Some(n) = flags.value_of(&["-n", "--count"]) {
        query.count = n.parse().map_err(|_| OreganoError::parse("count", n))?;
    }
    if let Some(start) = flags.value_of(&["-s", "--start"]) {
        query.start = Some(parse_date(start)?);
    }
    if let Some(end) = flags.value_of(&["-e", "--end"]) {
        query.end = Some(parse_date(end)?);
    }

    let account = session.model.get_account(&session.account_id(&flags.positional()[0])?)?;
    let found = session.model.get_transactions_by_account(&account.id, &query)?;
    if found.is_empty() {
        println!("No transactions for {}", account.alias_or_id());
        return Ok(());
    }
    let rows: Vec<(usize, &Transaction)> = found
        .iter()
        .map(|tr| (session.register(EntryKind::Transaction, &tr.id), tr))
        .collect();
    println!("{}", transactions_table(&rows, account.account_type));
    Ok(())
}

/// `print <item> [-a|--all]`
pub fn print(session: &mut Session, tokens: &[String]) -> Result<()> {
    let schema = FlagSchema::new(&[(POSITIONAL, 1), ("-a", 0), ("--all", 0)]);
    let flags = parse(tokens, &schema)?;
    match session.target(&flags.positional()[0])? {
        Target::Account(id) => print_account(session, &id),
        Target::Transaction(id) => {
            let tr = session.model.get_transaction_by_id(&id)?;
            let account = session.model.get_account(&tr.account_id)?;
            let full = flags.first_of(&["-a", "--all"]).is_some();
            println!("{}", transaction_detail(&tr, &account, full));
            Ok(())
        }
    }
}

fn collect_updates(session: &Session, flags: &ParsedFlags) -> Result<Vec<TransactionUpdate>> {
    let mut updates = Vec::new();
    if let Some(acc) = flags.value_of(&["--account"]) {
        updates.push(TransactionUpdate::Account(session.account_id(acc)?));
    }
    if let Some(payee) = flags.value_of(&["-p", "--payee"]) {
        updates.push(TransactionUpdate::Payee(payee.to_string()));
    }
    if let Some(amount) = flags.value_of(&["-a", "--amount"]) {
        updates.push(TransactionUpdate::Amount(parse_amount(amount)?));
    }
    if let Some(date) = flags.value_of(&["-d", "--date"]) {
        updates.push(TransactionUpdate::Date(parse_date(date)?));
    }
    if let Some(category) = flags.value_of(&["-c", "--category"]) {
        updates.push(TransactionUpdate::Category(category.to_string()));
    }
    if let Some(desc) = flags.value_of(&["--desc"]) {
        updates.push(TransactionUpdate::Description(desc.to_string()));
    }
    if let Some(inst) = flags.value_of(&["--inst"]) {
        updates.push(TransactionUpdate::InstDescription(inst.to_string()));
    }
    Ok(updates)
}

/// `edit <transaction> [--account A] [-p PAYEE] [-a AMOUNT] [-d DATE] [-c CAT] [--desc D] [--inst I]`
pub fn edit(session: &mut Session, tokens: &[String]) -> Result<()> {
    let schema = FlagSchema::new(&[
        (POSITIONAL, 1),
        ("--account", 1),
        ("-p", 1),
        ("--payee", 1),
        ("-a", 1),
        ("--amount", 1),
        ("-d", 1),
        ("--date", 1),
        ("-c", 1),
        ("--category", 1),
        ("--desc", 1),
        ("--inst", 1),
    ]);
    let flags = parse(tokens, &schema)?;
    let id = session.transaction_id(&flags.positional()[0])?;
    let updates = collect_updates(session, &flags)?;
    if updates.is_empty() {
        return Err(OreganoError::Other(
            "Nothing to change. Pass at least one of --account, --payee, --amount, --date, --category, --desc, --inst".into(),
        ));
    }
    let tr = session.model.update_transaction(&id, &updates)?;
    let account = session.model.get_account(&tr.account_id)?;
    println!("{}", transaction_detail(&tr, &account, false));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::session::test_session;
    use crate::models::Account;

    fn line(s: &str) -> Vec<String> {
        shell_words::split(s).unwrap()
    }

    fn with_account(session: &Session) -> String {
        let acc = Account::builder().alias("chase").build();
        session.model.add_account(&acc).unwrap();
        acc.id
    }

    #[test]
    fn test_new_transaction_with_flags() {
        let (_dir, mut s) = test_session();
        let acc = with_account(&s);
        create(
            &mut s,
            &line(r#"new chase "Corner Store" 12.50 -d 2024-02-03 -c groceries --desc "milk and eggs""#),
        )
        .unwrap();
        let id = s.worklist.dereference("0").unwrap().id.clone();
        let tr = s.model.get_transaction_by_id(&id).unwrap();
        assert_eq!(tr.account_id, acc);
        assert_eq!(tr.payee, "Corner Store");
        assert_eq!(tr.amount, 12.5);
        assert_eq!(tr.category, "groceries");
        assert_eq!(tr.description, "milk and eggs");
        assert_eq!(tr.date, parse_date("2024-02-03").unwrap());
    }

    #[test]
    fn test_new_transaction_unknown_account() {
        let (_dir, mut s) = test_session();
        assert!(matches!(
            create(&mut s, &line("new ghost Store 1.00")),
            Err(OreganoError::NotFound(_))
        ));
        assert!(matches!(
            create(&mut s, &line("new ghost Store")),
            Err(OreganoError::MissingArguments { .. })
        ));
    }

    #[test]
    fn test_new_transaction_rejects_infinite_amount() {
        let (_dir, mut s) = test_session();
        with_account(&s);
        assert!(matches!(
            create(&mut s, &line("new chase Pay inf")),
            Err(OreganoError::Parse { what: "amount", .. })
        ));
        assert_eq!(s.model.transactions().count().unwrap(), 0);
    }

    #[test]
    fn test_list_respects_count_and_registers() {
        let (_dir, mut s) = test_session();
        with_account(&s);
        for day in 1..=5 {
            create(&mut s, &line(&format!("new chase p{day} 1 -d 2024-01-0{day}"))).unwrap();
        }
        let before = s.worklist.len();
        list(&mut s, &line("trsn chase -n 2")).unwrap();
        assert_eq!(s.worklist.len(), before + 2);
        let newest = s.worklist.get(before).unwrap().id.clone();
        assert_eq!(s.model.get_transaction_by_id(&newest).unwrap().payee, "p5");
        assert!(list(&mut s, &line("trsn chase -n many")).is_err());
    }

    #[test]
    fn test_edit_by_handle() {
        let (_dir, mut s) = test_session();
        with_account(&s);
        create(&mut s, &line("new chase Store 5 -c misc")).unwrap();
        edit(&mut s, &line("edit 0 --amount 99 -p Shop")).unwrap();
        let id = s.worklist.get(0).unwrap().id.clone();
        let tr = s.model.get_transaction_by_id(&id).unwrap();
        assert_eq!(tr.amount, 99.0);
        assert_eq!(tr.payee, "Shop");
        assert_eq!(tr.category, "misc");
        assert!(edit(&mut s, &line("edit 0")).is_err());
    }

    #[test]
    fn test_edit_moves_between_accounts() {
        let (_dir, mut s) = test_session();
        with_account(&s);
        let other = Account::builder().alias("visa").build();
        s.model.add_account(&other).unwrap();
        create(&mut s, &line("new chase Store 5")).unwrap();
        edit(&mut s, &line("edit 0 --account visa")).unwrap();
        let id = s.worklist.get(0).unwrap().id.clone();
        assert_eq!(s.model.get_transaction_by_id(&id).unwrap().account_id, other.id);
    }

    #[test]
    fn test_print_either_kind() {
        let (_dir, mut s) = test_session();
        with_account(&s);
        create(&mut s, &line("new chase Store 5")).unwrap();
        print(&mut s, &line("p 0 --all")).unwrap();
        print(&mut s, &line("p chase")).unwrap();
        assert!(matches!(print(&mut s, &line("p 9")), Err(OreganoError::InvalidHandle(_))));
    }
}
