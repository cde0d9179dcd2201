use std::fmt;

use crate::error::{OreganoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Account,
    Transaction,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => f.write_str("account"),
            Self::Transaction => f.write_str("transaction"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingEntry {
    pub kind: EntryKind,
    pub id: String,
}

/// Short numeric handles for items shown during this session. Entries are
/// only ever appended, so a handle stays valid until the process exits.
#[derive(Debug, Default)]
pub struct WorkingList {
    entries: Vec<WorkingEntry>,
}

impl WorkingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: EntryKind, id: impl Into<String>) -> usize {
        self.entries.push(WorkingEntry {
            kind,
            id: id.into(),
        });
        self.entries.len() - 1
    }

    pub fn get(&self, handle: usize) -> Option<&WorkingEntry> {
        self.entries.get(handle)
    }

    pub fn dereference(&self, handle: &str) -> Result<&WorkingEntry> {
        handle
            .parse::<usize>()
            .ok()
            .and_then(|h| self.get(h))
            .ok_or_else(|| OreganoError::InvalidHandle(handle.to_string()))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_dereference() {
        let mut list = WorkingList::new();
        list.register(EntryKind::Account, "acc-1");
        let h = list.register(EntryKind::Transaction, "tx-42");
        assert_eq!(h, 1);
        let entry = list.dereference(&h.to_string()).unwrap();
        assert_eq!(entry.kind, EntryKind::Transaction);
        assert_eq!(entry.id, "tx-42");
        assert!(matches!(
            list.dereference(&(h + 1).to_string()),
            Err(OreganoError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_non_numeric_handle() {
        let mut list = WorkingList::new();
        list.register(EntryKind::Account, "acc-1");
        assert!(matches!(list.dereference("chase"), Err(OreganoError::InvalidHandle(_))));
        assert!(matches!(list.dereference("-1"), Err(OreganoError::InvalidHandle(_))));
    }

    #[test]
    fn test_handles_are_stable() {
        let mut list = WorkingList::new();
        let first = list.register(EntryKind::Account, "a");
        for i in 0..20 {
            list.register(EntryKind::Transaction, format!("t{i}"));
        }
        assert_eq!(list.get(first).unwrap().id, "a");
        assert_eq!(list.len(), 21);
    }
}
