use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::db::{date_column, format_date};
use crate::error::{OreganoError, Result};
use crate::models::Transaction;

const TRANSACTION_COLUMNS: &str =
    "id, account_id, payee, amount, date, category, inst_description, description";

pub const DEFAULT_COUNT: usize = 10;

/// Filter for a per-account listing. Both bounds are exclusive.
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    pub count: usize,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            start: None,
            end: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Category,
    Payee,
    Account,
    Month,
}

impl GroupBy {
    fn expr(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Payee => "payee",
            Self::Account => "account_id",
            Self::Month => "substr(date, 1, 7)",
        }
    }
}

impl FromStr for GroupBy {
    type Err = OreganoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "category" | "cat" => Ok(Self::Category),
            "payee" => Ok(Self::Payee),
            "account" | "acc" => Ok(Self::Account),
            "month" => Ok(Self::Month),
            _ => Err(OreganoError::parse("grouping", s)),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Category => "category",
            Self::Payee => "payee",
            Self::Account => "account",
            Self::Month => "month",
        };
        f.write_str(label)
    }
}

/// Grouped sum over transactions dated strictly between `start` and `end`.
#[derive(Debug, Clone)]
pub struct SumsQuery {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub group_by: GroupBy,
    pub account_id: Option<String>,
}

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        payee: row.get(2)?,
        amount: row.get(3)?,
        date: date_column(row, 4)?,
        category: row.get(5)?,
        inst_description: row.get(6)?,
        description: row.get(7)?,
    })
}

pub struct TransactionStore<'c> {
    conn: &'c Connection,
}

impl<'c> TransactionStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, tr: &Transaction) -> Result<()> {
        self.conn.execute(
            "INSERT INTO transactions (id, account_id, payee, amount, date, category, inst_description, description) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                tr.id,
                tr.account_id,
                tr.payee,
                tr.amount,
                format_date(&tr.date),
                tr.category,
                tr.inst_description,
                tr.description,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], row_to_transaction).optional()?)
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached("SELECT 1 FROM transactions WHERE id = ?1")?;
        Ok(stmt.exists([id])?)
    }

    /// Most recent first, capped at `query.count`.
    pub fn by_account(&self, account_id: &str, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE account_id = ?");
        let mut params: Vec<Value> = vec![Value::Text(account_id.to_string())];

        if let Some(start) = &query.start {
            sql.push_str(" AND date > ?");
            params.push(Value::Text(format_date(start)));
        }
        if let Some(end) = &query.end {
            sql.push_str(" AND date < ?");
            params.push(Value::Text(format_date(end)));
        }
        sql.push_str(" ORDER BY date DESC, created_at DESC LIMIT ?");
        params.push(Value::Integer(i64::try_from(query.count).unwrap_or(i64::MAX)));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn sums(&self, query: &SumsQuery) -> Result<HashMap<String, f64>> {
        let mut sql = format!(
            "SELECT {} AS label, SUM(amount) FROM transactions WHERE date > ? AND date < ?",
            query.group_by.expr()
        );
        let mut params: Vec<Value> = vec![
            Value::Text(format_date(&query.start)),
            Value::Text(format_date(&query.end)),
        ];
        if let Some(account_id) = &query.account_id {
            sql.push_str(" AND account_id = ?");
            params.push(Value::Text(account_id.clone()));
        }
        sql.push_str(" GROUP BY label");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(rows)
    }

    /// Sum of amounts on an account dated strictly after `after`.
    pub fn sum_after(&self, account_id: &str, after: &NaiveDateTime) -> Result<f64> {
        let total: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE account_id = ?1 AND date > ?2",
            rusqlite::params![account_id, format_date(after)],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Rewrite every mutable column of an existing row.
    pub fn update(&self, tr: &Transaction) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE transactions SET account_id = ?1, payee = ?2, amount = ?3, date = ?4, \
             category = ?5, inst_description = ?6, description = ?7 WHERE id = ?8",
            rusqlite::params![
                tr.account_id,
                tr.payee,
                tr.amount,
                format_date(&tr.date),
                tr.category,
                tr.inst_description,
                tr.description,
                tr.id,
            ],
        )?)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?)
    }

    pub fn delete_by_account(&self, account_id: &str) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM transactions WHERE account_id = ?1", [account_id])?)
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?)
    }
}
