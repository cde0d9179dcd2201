use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::db::{date_column, format_date};
use crate::error::{OreganoError, Result};
use crate::models::{Account, AccountType, Credential};

const ALIAS_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

const ACCOUNT_COLUMNS: &str =
    "id, alias, account_type, item_id, access_token, anchor_balance, anchor_time";

/// Aliases start with a letter or underscore, so they can never be mistaken
/// for a generated id (hyphenated uuid) or a working-list number.
pub fn is_valid_alias(alias: &str) -> bool {
    static ALIAS_RE: OnceLock<Option<Regex>> = OnceLock::new();
    ALIAS_RE
        .get_or_init(|| Regex::new(ALIAS_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(alias))
}

fn row_to_account(row: &Row) -> rusqlite::Result<Account> {
    let account_type: String = row.get(2)?;
    let item_id: Option<String> = row.get(3)?;
    let access_token: Option<String> = row.get(4)?;
    let credential = match (item_id, access_token) {
        (Some(item_id), Some(access_token)) => Some(Credential {
            item_id,
            access_token,
        }),
        _ => None,
    };
    Ok(Account {
        id: row.get(0)?,
        alias: row.get(1)?,
        account_type: account_type.parse().unwrap_or(AccountType::Unknown),
        credential,
        anchor_balance: row.get(5)?,
        anchor_time: date_column(row, 6)?,
    })
}

pub struct AccountStore<'c> {
    conn: &'c Connection,
}

impl<'c> AccountStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// An empty alias is stored as no alias.
    pub fn insert(&self, account: &Account) -> Result<()> {
        let alias = account.alias.as_deref().filter(|a| !a.is_empty());
        if let Some(alias) = alias {
            self.check_alias_free(alias, &account.id)?;
        }
        let (item_id, access_token) = match &account.credential {
            Some(c) => (Some(c.item_id.as_str()), Some(c.access_token.as_str())),
            None => (None, None),
        };
        self.conn.execute(
            "INSERT INTO accounts (id, alias, account_type, item_id, access_token, anchor_balance, anchor_time) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                account.id,
                alias,
                account.account_type.key(),
                item_id,
                access_token,
                account.anchor_balance,
                format_date(&account.anchor_time),
            ],
        )?;
        tracing::debug!(id = %account.id, alias = ?account.alias, "inserted account");
        Ok(())
    }

    /// Fails unless `alias` is well-formed and unused by any account other
    /// than `owner_id`.
    fn check_alias_free(&self, alias: &str, owner_id: &str) -> Result<()> {
        if !is_valid_alias(alias) {
            return Err(OreganoError::InvalidAlias(alias.to_string()));
        }
        match self.id_for_alias(alias)? {
            Some(existing) if existing != owner_id => {
                Err(OreganoError::DuplicateAlias(alias.to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], row_to_account).optional()?)
    }

    pub fn get_by_alias(&self, alias: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE alias = ?1");
        Ok(self.conn.query_row(&sql, [alias], row_to_account).optional()?)
    }

    /// Resolve a user token to an account: exact id first, then alias.
    pub fn get(&self, token: &str) -> Result<Account> {
        if let Some(account) = self.get_by_id(token)? {
            return Ok(account);
        }
        self.get_by_alias(token)?
            .ok_or_else(|| OreganoError::NotFound(token.to_string()))
    }

    pub fn resolve(&self, token: &str) -> Result<String> {
        if self.exists_id(token)? {
            return Ok(token.to_string());
        }
        self.id_for_alias(token)?
            .ok_or_else(|| OreganoError::NotFound(token.to_string()))
    }

    pub fn all(&self) -> Result<Vec<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY alias IS NULL, alias, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_account)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Map of account id to alias, for accounts that have one.
    pub fn aliases(&self) -> Result<HashMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, alias FROM accounts WHERE alias IS NOT NULL")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(rows)
    }

    pub fn exists_id(&self, id: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached("SELECT 1 FROM accounts WHERE id = ?1")?;
        Ok(stmt.exists([id])?)
    }

    pub fn exists_alias(&self, alias: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached("SELECT 1 FROM accounts WHERE alias = ?1")?;
        Ok(stmt.exists([alias])?)
    }

    pub fn id_for_alias(&self, alias: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT id FROM accounts WHERE alias = ?1", [alias], |row| row.get(0))
            .optional()?)
    }

    pub fn set_alias(&self, id: &str, alias: &str) -> Result<()> {
        if !self.exists_id(id)? {
            return Err(OreganoError::NotFound(id.to_string()));
        }
        self.check_alias_free(alias, id)?;
        self.conn
            .execute("UPDATE accounts SET alias = ?1 WHERE id = ?2", rusqlite::params![alias, id])?;
        tracing::debug!(%id, %alias, "set alias");
        Ok(())
    }

    pub fn set_anchor(&self, id: &str, balance: f64, time: &NaiveDateTime) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE accounts SET anchor_balance = ?1, anchor_time = ?2 WHERE id = ?3",
            rusqlite::params![balance, format_date(time), id],
        )?;
        if changed == 0 {
            return Err(OreganoError::NotFound(id.to_string()));
        }
        tracing::debug!(%id, balance, %time, "set anchor");
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM accounts WHERE id = ?1", [id])?)
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT count(*) FROM accounts", [], |r| r.get(0))?)
    }
}
