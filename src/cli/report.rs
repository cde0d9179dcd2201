use chrono::NaiveDate;

use crate::cli::session::Session;
use crate::cli::view::sums_table;
use crate::error::Result;
use crate::flags::{parse, FlagSchema};
use crate::importer::parse_date;
use crate::model::{GroupBy, SumsQuery};
use crate::models::epoch;

/// Upper bound used when `sums` is given no end date.
fn far_future() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .unwrap_or(chrono::NaiveDateTime::MAX)
}

pub(crate) fn sums_query(session: &Session, tokens: &[String]) -> Result<SumsQuery> {
    let schema = FlagSchema::new(&[
        ("-s", 1),
        ("--start", 1),
        ("-e", 1),
        ("--end", 1),
        ("-g", 1),
        ("--group-by", 1),
        ("-a", 1),
        ("--account", 1),
    ]);
    let flags = parse(tokens, &schema)?;
    let start = match flags.value_of(&["-s", "--start"]) {
        Some(s) => parse_date(s)?,
        None => epoch(),
    };
    let end = match flags.value_of(&["-e", "--end"]) {
        Some(e) => parse_date(e)?,
        None => far_future(),
    };
    let group_by = match flags.value_of(&["-g", "--group-by"]) {
        Some(g) => g.parse()?,
        None => GroupBy::Category,
    };
    let account_id = flags
        .value_of(&["-a", "--account"])
        .map(|a| session.account_id(a))
        .transpose()?;
    Ok(SumsQuery {
        start,
        end,
        group_by,
        account_id,
    })
}

/// `sums [-s START] [-e END] [-g category|payee|account|month] [-a ACCOUNT]`
pub fn sums(session: &mut Session, tokens: &[String]) -> Result<()> {
    let query = sums_query(session, tokens)?;
    let totals = session.model.get_transaction_sums(&query)?;
    if totals.is_empty() {
        println!("No transactions in range.");
        return Ok(());
    }

    let aliases = session.model.get_aliases()?;
    let rows: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(label, total)| match query.group_by {
            GroupBy::Account => (aliases.get(&label).cloned().unwrap_or(label), total),
            _ => (label, total),
        })
        .collect();
    println!("{}", sums_table(&query.group_by.to_string(), &rows));
    Ok(())
}
