use comfy_table::{Cell, CellAlignment, Table};

use crate::fmt::{account_amount, money, short_date};
use crate::models::{Account, AccountType, Transaction};

#[derive(Debug, Clone, Copy, Default)]
pub struct AccountColumns {
    pub show_type: bool,
    pub show_anchor: bool,
    pub show_id: bool,
}

fn amount_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// `rows` pairs each account with its working-list number and balance.
pub fn accounts_table(rows: &[(usize, &Account, f64)], cols: AccountColumns) -> Table {
    let mut headers = vec!["", "ALIAS"];
    if cols.show_type {
        headers.push("TYPE");
    }
    headers.push("BALANCE");
    if cols.show_anchor {
        headers.push("ANCHOR");
    }
    if cols.show_id {
        headers.push("ID");
    }

    let mut table = Table::new();
    table.set_header(headers);
    for (wid, acc, balance) in rows {
        let mut row = vec![
            Cell::new(wid),
            Cell::new(acc.alias.as_deref().unwrap_or("-")),
        ];
        if cols.show_type {
            row.push(Cell::new(acc.account_type));
        }
        row.push(amount_cell(money(*balance)));
        if cols.show_anchor {
            row.push(Cell::new(format!(
                "({}, {})",
                money(acc.anchor_balance),
                short_date(&acc.anchor_time)
            )));
        }
        if cols.show_id {
            row.push(Cell::new(&acc.id));
        }
        table.add_row(row);
    }
    table
}

/// `rows` pairs each transaction with its working-list number.
pub fn transactions_table(rows: &[(usize, &Transaction)], account_type: AccountType) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["", "DATE", "PAYEE", "CATEGORY", "AMOUNT"]);
    for (wid, tr) in rows {
        table.add_row(vec![
            Cell::new(wid),
            Cell::new(short_date(&tr.date)),
            Cell::new(&tr.payee),
            Cell::new(&tr.category),
            amount_cell(account_amount(account_type, tr.amount)),
        ]);
    }
    table
}

pub fn account_detail(acc: &Account, balance: f64) -> String {
    let mut lines = vec![
        format!("Id: {}", acc.id),
        format!("Alias: {}", acc.alias.as_deref().unwrap_or("")),
        format!("Type: {}", acc.account_type),
        format!("Anchor: ({}, {})", money(acc.anchor_balance), short_date(&acc.anchor_time)),
        format!("Balance: {}", money(balance)),
    ];
    if let Some(cred) = &acc.credential {
        lines.push(format!("Linked item: {}", cred.item_id));
    }
    lines.join("\n")
}

pub fn transaction_detail(tr: &Transaction, account: &Account, full: bool) -> String {
    let mut lines = Vec::new();
    if full {
        lines.push(format!("Id: {}", tr.id));
    }
    lines.push(format!("Account: {}", account.alias_or_id()));
    lines.push(format!("Payee: {}", tr.payee));
    lines.push(format!("Amount: {}", account_amount(account.account_type, tr.amount)));
    lines.push(format!("Date: {}", tr.date.format("%Y/%m/%d %H:%M:%S")));
    if full || !tr.category.is_empty() {
        lines.push(format!("Category: {}", tr.category));
    }
    if full || !tr.inst_description.is_empty() {
        lines.push(format!("Inst Description: {}", tr.inst_description));
    }
    if full || !tr.description.is_empty() {
        lines.push(format!("Description: {}", tr.description));
    }
    lines.join("\n")
}

/// Largest sums first; ties by label.
pub fn sums_table(label: &str, sums: &[(String, f64)]) -> Table {
    let mut sorted: Vec<&(String, f64)> = sums.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut table = Table::new();
    table.set_header(vec![label.to_uppercase(), "TOTAL".to_string()]);
    for (name, total) in sorted {
        let name = if name.is_empty() { "(none)" } else { name.as_str() };
        table.add_row(vec![Cell::new(name), amount_cell(money(*total))]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sums_sorted_descending() {
        let sums = vec![
            ("fuel".to_string(), 30.0),
            ("groceries".to_string(), 65.5),
            (String::new(), 5.0),
        ];
        let rendered = sums_table("category", &sums).to_string();
        let groceries = rendered.find("groceries").unwrap();
        let fuel = rendered.find("fuel").unwrap();
        let none = rendered.find("(none)").unwrap();
        assert!(groceries < fuel && fuel < none);
        assert!(rendered.contains("CATEGORY"));
    }

    #[test]
    fn test_transactions_table_inverts_for_checking() {
        colored::control::set_override(false);
        let tr = Transaction::new("acc", "Kroger", 50.0);
        let rendered = transactions_table(&[(3, &tr)], AccountType::Checking).to_string();
        assert!(rendered.contains("-$50.00"));
        assert!(rendered.contains("Kroger"));
        let rendered = transactions_table(&[(3, &tr)], AccountType::CreditCard).to_string();
        assert!(!rendered.contains("-$50.00"));
    }

    #[test]
    fn test_account_columns_optional() {
        let acc = Account::builder().alias("chase").build();
        let plain = accounts_table(&[(0, &acc, 12.0)], AccountColumns::default()).to_string();
        assert!(!plain.contains(&acc.id));
        let full = accounts_table(
            &[(0, &acc, 12.0)],
            AccountColumns {
                show_type: true,
                show_anchor: true,
                show_id: true,
            },
        )
        .to_string();
        assert!(full.contains(&acc.id));
        assert!(full.contains("unknown"));
        assert!(full.contains("1900/01/01"));
    }

    #[test]
    fn test_transaction_detail_hides_empty_fields() {
        colored::control::set_override(false);
        let acc = Account::builder()
            .alias("visa")
            .account_type(AccountType::CreditCard)
            .build();
        let tr = Transaction::new(&acc.id, "Shell", 30.0);
        let short = transaction_detail(&tr, &acc, false);
        assert!(short.contains("Account: visa"));
        assert!(!short.contains("Category"));
        let full = transaction_detail(&tr, &acc, true);
        assert!(full.contains(&tr.id));
        assert!(full.contains("Category: "));
    }
}
