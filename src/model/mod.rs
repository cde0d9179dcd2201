//! Accounts and transactions behind a single facade.
//!
//! The stores borrow the facade's connection and do single-statement work;
//! anything touching more than one row set runs inside a SQLite transaction
//! here so it applies completely or not at all.

pub mod accounts;
pub mod transactions;

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::{OreganoError, Result};
use crate::models::{Account, Credential, Transaction, TransactionUpdate};

pub use accounts::AccountStore;
pub use transactions::{GroupBy, SumsQuery, TransactionQuery, TransactionStore};

pub struct Model {
    conn: Connection,
}

impl Model {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = get_connection(path)?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn accounts(&self) -> AccountStore<'_> {
        AccountStore::new(&self.conn)
    }

    pub fn transactions(&self) -> TransactionStore<'_> {
        TransactionStore::new(&self.conn)
    }

    // --- accounts ---

    pub fn get_account(&self, token: &str) -> Result<Account> {
        self.accounts().get(token)
    }

    pub fn get_accounts(&self) -> Result<Vec<Account>> {
        self.accounts().all()
    }

    pub fn get_aliases(&self) -> Result<HashMap<String, String>> {
        self.accounts().aliases()
    }

    pub fn resolve(&self, token: &str) -> Result<String> {
        self.accounts().resolve(token)
    }

    pub fn add_account(&self, account: &Account) -> Result<()> {
        self.accounts().insert(account)?;
        tracing::info!(id = %account.id, "account added");
        Ok(())
    }

    /// Delete the account and every transaction it owns.
    pub fn remove_account(&self, token: &str) -> Result<Account> {
        let account = self.get_account(token)?;
        let tx = self.conn.unchecked_transaction()?;
        let removed = self.transactions().delete_by_account(&account.id)?;
        self.accounts().delete(&account.id)?;
        tx.commit()?;
        tracing::info!(id = %account.id, transactions = removed, "account removed");
        Ok(account)
    }

    pub fn set_alias(&self, id: &str, alias: &str) -> Result<()> {
        self.accounts().set_alias(id, alias)
    }

    pub fn set_anchor(&self, token: &str, balance: f64, time: &NaiveDateTime) -> Result<()> {
        let id = self.resolve(token)?;
        self.accounts().set_anchor(&id, balance, time)
    }

    /// Anchor balance plus every transaction dated after the anchor time,
    /// using the stored sign.
    pub fn get_current_balance(&self, token: &str) -> Result<f64> {
        let account = self.get_account(token)?;
        let after = self
            .transactions()
            .sum_after(&account.id, &account.anchor_time)?;
        Ok(account.anchor_balance + after)
    }

    pub fn is_valid_account_id(&self, token: &str) -> Result<bool> {
        self.accounts().exists_id(token)
    }

    pub fn is_valid_account_alias(&self, token: &str) -> Result<bool> {
        self.accounts().exists_alias(token)
    }

    /// Id of the account with this alias, or an empty string.
    pub fn get_account_id(&self, alias: &str) -> Result<String> {
        Ok(self.accounts().id_for_alias(alias)?.unwrap_or_default())
    }

    pub fn get_access_token(&self, token: &str) -> Result<Option<Credential>> {
        Ok(self.get_account(token)?.credential)
    }

    // --- transactions ---

    pub fn add_transaction(&self, tr: &Transaction) -> Result<String> {
        if !self.accounts().exists_id(&tr.account_id)? {
            return Err(OreganoError::NotFound(tr.account_id.clone()));
        }
        self.transactions().insert(tr)?;
        tracing::debug!(id = %tr.id, account = %tr.account_id, "transaction added");
        Ok(tr.id.clone())
    }

    pub fn remove_transaction(&self, id: &str) -> Result<()> {
        if self.transactions().delete(id)? == 0 {
            return Err(OreganoError::NotFound(id.to_string()));
        }
        tracing::debug!(%id, "transaction removed");
        Ok(())
    }

    pub fn get_transaction_by_id(&self, id: &str) -> Result<Transaction> {
        self.transactions()
            .get(id)?
            .ok_or_else(|| OreganoError::NotFound(id.to_string()))
    }

    pub fn get_transactions_by_account(
        &self,
        token: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        let id = self.resolve(token)?;
        self.transactions().by_account(&id, query)
    }

    pub fn get_transaction_sums(&self, query: &SumsQuery) -> Result<HashMap<String, f64>> {
        self.transactions().sums(query)
    }

    /// Apply `updates` in order and persist the result.
    pub fn update_transaction(&self, id: &str, updates: &[TransactionUpdate]) -> Result<Transaction> {
        let mut tr = self.get_transaction_by_id(id)?;
        for update in updates {
            update.apply(&mut tr);
        }
        if !self.accounts().exists_id(&tr.account_id)? {
            return Err(OreganoError::NotFound(tr.account_id));
        }
        self.transactions().update(&tr)?;
        tracing::debug!(%id, fields = updates.len(), "transaction updated");
        Ok(tr)
    }
}
