use std::path::Path;

use crate::error::{OreganoError, Result};
use crate::model::Model;
use crate::settings::{Settings, DB_FILENAME};
use crate::worklist::{EntryKind, WorkingList};

/// What a command argument turned out to name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Account(String),
    Transaction(String),
}

/// State shared by every shell command for the life of the process.
pub struct Session {
    pub model: Model,
    pub worklist: WorkingList,
    pub settings: Settings,
}

impl Session {
    pub fn open(settings: Settings, data_dir: &Path) -> Result<Self> {
        let model = Model::open(&data_dir.join(DB_FILENAME))?;
        tracing::debug!(dir = %data_dir.display(), "session opened");
        Ok(Self {
            model,
            worklist: WorkingList::new(),
            settings,
        })
    }

    fn is_handle(token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
    }

    /// A working-list number, an account id or an alias, to an account id.
    pub fn account_id(&self, token: &str) -> Result<String> {
        if Self::is_handle(token) {
            let entry = self.worklist.dereference(token)?;
            return match entry.kind {
                EntryKind::Account => Ok(entry.id.clone()),
                EntryKind::Transaction => Err(OreganoError::InvalidHandle(format!(
                    "{token} (a transaction, expected an account)"
                ))),
            };
        }
        self.model.resolve(token)
    }

    /// A working-list number or a transaction id, to a transaction id.
    pub fn transaction_id(&self, token: &str) -> Result<String> {
        match self.target(token)? {
            Target::Transaction(id) => Ok(id),
            Target::Account(_) => Err(OreganoError::InvalidHandle(format!(
                "{token} (an account, expected a transaction)"
            ))),
        }
    }

    /// Interpret `token` as whatever it names: a working-list entry, an
    /// account (id or alias) or a transaction id, in that order.
    pub fn target(&self, token: &str) -> Result<Target> {
        if Self::is_handle(token) {
            let entry = self.worklist.dereference(token)?;
            return Ok(match entry.kind {
                EntryKind::Account => Target::Account(entry.id.clone()),
                EntryKind::Transaction => Target::Transaction(entry.id.clone()),
            });
        }
        match self.model.resolve(token) {
            Ok(id) => return Ok(Target::Account(id)),
            Err(OreganoError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        if self.model.transactions().exists(token)? {
            return Ok(Target::Transaction(token.to_string()));
        }
        Err(OreganoError::NotFound(token.to_string()))
    }

    pub fn register(&mut self, kind: EntryKind, id: &str) -> usize {
        self.worklist.register(kind, id)
    }
}

#[cfg(test)]
pub(crate) fn test_session() -> (tempfile::TempDir, Session) {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::open(Settings::default(), dir.path()).unwrap();
    (dir, session)
}
