use chrono::NaiveDateTime;
use colored::Colorize;

use crate::models::AccountType;

/// Dollar amount with thousands separators: `$1,234.56`, `-$5.00`.
pub fn money(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let digits: Vec<char> = whole.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if val < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Amount as the account holder sees it, green when money came in.
pub fn account_amount(account_type: AccountType, amount: f64) -> String {
    let shown = account_type.displayed_amount(amount);
    let text = money(shown);
    let incoming = match account_type {
        AccountType::CreditCard => shown < 0.0,
        _ => shown > 0.0,
    };
    if incoming {
        text.green().to_string()
    } else {
        text
    }
}

pub fn short_date(date: &NaiveDateTime) -> String {
    date.format("%Y/%m/%d").to_string()
}
