use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{OreganoError, Result};
use crate::model::Model;
use crate::models::Transaction;

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

/// Accepts `$`, thousands separators, stray quotes and `(12.00)` negatives.
/// Only finite values pass.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    let parsed = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => inner.trim().parse::<f64>().map(|v| -v),
        None => s.parse::<f64>(),
    };
    parsed
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| OreganoError::parse("amount", raw))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m/%d/%y"];

/// Parse the date shapes bank exports tend to use. A bare date means
/// midnight.
pub fn parse_date(raw: &str) -> Result<NaiveDateTime> {
    let s = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }
    Err(OreganoError::parse("date", raw))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TransactionId,
    Account,
    Payee,
    Amount,
    Date,
    Category,
    InstDescription,
    Description,
    Direction,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Self::TransactionId,
        Self::Account,
        Self::Payee,
        Self::Amount,
        Self::Date,
        Self::Category,
        Self::InstDescription,
        Self::Description,
        Self::Direction,
    ];

    pub const REQUIRED: [Field; 3] = [Self::Account, Self::Payee, Self::Amount];

    pub fn label(&self) -> &'static str {
        match self {
            Self::TransactionId => "Transaction ID",
            Self::Account => "Account",
            Self::Payee => "Payee",
            Self::Amount => "Amount",
            Self::Date => "Date",
            Self::Category => "Category",
            Self::InstDescription => "Institution Description",
            Self::Description => "Description",
            Self::Direction => "Direction (Debit/Credit)",
        }
    }
}

impl FromStr for Field {
    type Err = OreganoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "id" | "transaction_id" => Ok(Self::TransactionId),
            "account" => Ok(Self::Account),
            "payee" => Ok(Self::Payee),
            "amount" => Ok(Self::Amount),
            "date" => Ok(Self::Date),
            "category" => Ok(Self::Category),
            "inst" | "inst_description" => Ok(Self::InstDescription),
            "desc" | "description" => Ok(Self::Description),
            "direction" | "dir" => Ok(Self::Direction),
            _ => Err(OreganoError::parse("import field", s)),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which CSV column feeds which transaction field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: HashMap<Field, usize>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, field: Field, column: usize) {
        self.columns.insert(field, column);
    }

    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Fields still free to assign, in display order.
    pub fn unassigned(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.columns.contains_key(f))
            .collect()
    }

    pub fn missing_required(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|f| !self.columns.contains_key(f))
            .collect()
    }
}

/// Parse a mapping such as `account=0,payee=2,amount=3` (0-based columns).
impl FromStr for ColumnMap {
    type Err = OreganoError;

    fn from_str(s: &str) -> Result<Self> {
        let mut map = ColumnMap::new();
        for pair in s.split(',').filter(|p| !p.trim().is_empty()) {
            let (field, column) = pair
                .split_once('=')
                .ok_or_else(|| OreganoError::parse("column mapping", pair))?;
            let column = column
                .trim()
                .parse::<usize>()
                .map_err(|_| OreganoError::parse("column number", column))?;
            map.assign(field.parse()?, column);
        }
        Ok(map)
    }
}

fn cell<'r>(record: &'r [String], map: &ColumnMap, field: Field) -> Result<Option<&'r str>> {
    match map.column(field) {
        None => Ok(None),
        Some(col) => record
            .get(col)
            .map(|v| Some(v.as_str()))
            .ok_or_else(|| OreganoError::Other(format!("row has no column {col} for '{field}'"))),
    }
}

fn required<'r>(record: &'r [String], map: &ColumnMap, field: Field) -> Result<&'r str> {
    cell(record, map, field)?
        .ok_or_else(|| OreganoError::Other(format!("missing required field '{field}'")))
}

/// Build a transaction from one CSV row. The returned `account_id` is the
/// raw account text from the file and still needs reconciling.
pub fn try_build_transaction(record: &[String], map: &ColumnMap) -> Result<Transaction> {
    let account = required(record, map, Field::Account)?;
    let payee = required(record, map, Field::Payee)?;
    let amount = parse_amount(required(record, map, Field::Amount)?)?;

    let sign = match cell(record, map, Field::Direction)? {
        None => 1.0,
        Some(dir) => match dir.trim().to_lowercase().as_str() {
            "debit" => 1.0,
            "credit" => -1.0,
            _ => return Err(OreganoError::parse("debit/credit direction", dir)),
        },
    };

    let mut tr = Transaction::new(account.trim(), payee.trim(), amount * sign);
    if let Some(date) = cell(record, map, Field::Date)? {
        tr = tr.with_date(parse_date(date)?);
    }
    if let Some(category) = cell(record, map, Field::Category)? {
        tr = tr.with_category(category.trim());
    }
    if let Some(inst) = cell(record, map, Field::InstDescription)? {
        tr = tr.with_inst_description(collapse_whitespace(inst));
    }
    if let Some(desc) = cell(record, map, Field::Description)? {
        tr = tr.with_description(desc.trim());
    }
    Ok(tr)
}

// ---------------------------------------------------------------------------
// Account reconciliation
// ---------------------------------------------------------------------------

/// Maps account names found in a file onto stored account ids. Names that
/// are neither an alias nor an id go to `choose` once; the answer is
/// remembered for the rest of the file.
pub struct AccountReconciler {
    by_alias: HashMap<String, String>,
    ids: HashSet<String>,
    memo: HashMap<String, String>,
}

impl AccountReconciler {
    /// `aliases` is id to alias, as returned by `Model::get_aliases`.
    pub fn new(aliases: &HashMap<String, String>, ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            by_alias: aliases
                .iter()
                .map(|(id, alias)| (alias.clone(), id.clone()))
                .collect(),
            ids: ids.into_iter().collect(),
            memo: HashMap::new(),
        }
    }

    pub fn from_model(model: &Model) -> Result<Self> {
        let ids = model.get_accounts()?.into_iter().map(|a| a.id);
        Ok(Self::new(&model.get_aliases()?, ids))
    }

    pub fn reconcile<F>(&mut self, name: &str, choose: &mut F) -> Result<String>
    where
        F: FnMut(&str) -> Result<String>,
    {
        if self.ids.contains(name) {
            return Ok(name.to_string());
        }
        if let Some(id) = self.by_alias.get(name) {
            return Ok(id.clone());
        }
        if let Some(id) = self.memo.get(name) {
            return Ok(id.clone());
        }
        let id = choose(name)?;
        tracing::debug!(%name, %id, "matched import account");
        self.memo.insert(name.to_string(), id.clone());
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Files and import bookkeeping
// ---------------------------------------------------------------------------

/// Every row of the file, header included, as plain strings.
pub fn read_records(file_path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(file_path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

pub fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

pub fn already_imported(conn: &Connection, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
    Ok(stmt.exists([checksum])?)
}

pub fn record_import(
    conn: &Connection,
    filename: &str,
    account_id: Option<&str>,
    record_count: usize,
    checksum: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO imports (filename, account_id, record_count, checksum) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![filename, account_id, record_count as i64, checksum],
    )?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub imported: usize,
    /// 1-based row number in the file and the reason it was skipped.
    pub failed: Vec<(usize, String)>,
    pub duplicate_file: bool,
}

/// Convert `records` with `map`, reconcile account names and store the
/// result in one transaction. Rows that fail to convert are reported and
/// skipped; the file's checksum is recorded so it cannot be imported twice.
pub fn import_records<F>(
    model: &Model,
    file_path: &Path,
    records: &[Vec<String>],
    map: &ColumnMap,
    has_headers: bool,
    mut choose_account: F,
) -> Result<ImportResult>
where
    F: FnMut(&str) -> Result<String>,
{
    let checksum = compute_checksum(file_path)?;
    if already_imported(model.connection(), &checksum)? {
        return Ok(ImportResult {
            duplicate_file: true,
            ..Default::default()
        });
    }

    let mut reconciler = AccountReconciler::from_model(model)?;
    let skip = usize::from(has_headers);
    let mut result = ImportResult::default();
    let mut batch = Vec::new();

    for (idx, record) in records.iter().enumerate().skip(skip) {
        match try_build_transaction(record, map) {
            Ok(mut tr) => {
                tr.account_id = reconciler.reconcile(&tr.account_id, &mut choose_account)?;
                batch.push(tr);
            }
            Err(e) => {
                tracing::warn!(row = idx + 1, "skipping row: {e}");
                result.failed.push((idx + 1, e.to_string()));
            }
        }
    }

    let accounts: HashSet<&str> = batch.iter().map(|t| t.account_id.as_str()).collect();
    let single_account = match accounts.len() {
        1 => accounts.into_iter().next(),
        _ => None,
    };
    let filename = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let tx = model.connection().unchecked_transaction()?;
    for tr in &batch {
        model.add_transaction(tr)?;
    }
    result.imported = batch.len();
    record_import(model.connection(), filename, single_account, batch.len(), &checksum)?;
    tx.commit()?;

    tracing::info!(file = %filename, imported = result.imported, failed = result.failed.len(), "import finished");
    Ok(result)
}
