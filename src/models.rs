use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};

use crate::error::{OreganoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    Investment,
    PersonalLoan,
    #[default]
    Unknown,
}

impl AccountType {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::CreditCard => "credit_card",
            Self::Investment => "investment",
            Self::PersonalLoan => "personal_loan",
            Self::Unknown => "unknown",
        }
    }

    /// Stored amounts follow the credit card convention (spending is
    /// positive). Every other account type shows them negated.
    pub fn display_sign(&self) -> f64 {
        match self {
            Self::CreditCard => 1.0,
            _ => -1.0,
        }
    }

    pub fn displayed_amount(&self, amount: f64) -> f64 {
        amount * self.display_sign()
    }
}

impl FromStr for AccountType {
    type Err = OreganoError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "creditcard" | "credit" => Ok(Self::CreditCard),
            "investment" => Ok(Self::Investment),
            "personalloan" | "loan" => Ok(Self::PersonalLoan),
            "unknown" => Ok(Self::Unknown),
            _ => Err(OreganoError::parse("account type", s)),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Item id and access token handed out by the aggregation service when an
/// institution is linked.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub item_id: String,
    pub access_token: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({}, *****)", self.item_id)
    }
}

/// Floor used as the anchor time of accounts created without an anchor, so
/// that every transaction counts towards the balance.
pub fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub alias: Option<String>,
    pub account_type: AccountType,
    pub credential: Option<Credential>,
    pub anchor_balance: f64,
    pub anchor_time: NaiveDateTime,
}

impl Account {
    pub fn builder() -> AccountBuilder {
        AccountBuilder::default()
    }

    pub fn alias_or_id(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Default)]
pub struct AccountBuilder {
    alias: Option<String>,
    account_type: AccountType,
    credential: Option<Credential>,
    anchor: Option<(f64, NaiveDateTime)>,
}

impl AccountBuilder {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.alias = if alias.is_empty() { None } else { Some(alias) };
        self
    }

    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }

    pub fn credential(mut self, item_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        self.credential = Some(Credential {
            item_id: item_id.into(),
            access_token: access_token.into(),
        });
        self
    }

    pub fn anchor(mut self, balance: f64, time: NaiveDateTime) -> Self {
        self.anchor = Some((balance, time));
        self
    }

    pub fn build(self) -> Account {
        let (anchor_balance, anchor_time) = self.anchor.unwrap_or((0.0, epoch()));
        Account {
            id: new_id(),
            alias: self.alias,
            account_type: self.account_type,
            credential: self.credential,
            anchor_balance,
            anchor_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub payee: String,
    /// Positive means money left the account.
    pub amount: f64,
    pub date: NaiveDateTime,
    pub category: String,
    pub inst_description: String,
    pub description: String,
}

impl Transaction {
    pub fn new(account_id: impl Into<String>, payee: impl Into<String>, amount: f64) -> Self {
        Self {
            id: new_id(),
            account_id: account_id.into(),
            payee: payee.into(),
            amount,
            date: now(),
            category: String::new(),
            inst_description: String::new(),
            description: String::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = date;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_inst_description(mut self, inst_description: impl Into<String>) -> Self {
        self.inst_description = inst_description.into();
        self
    }
}

/// One field assignment applied by `Model::update_transaction`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionUpdate {
    Account(String),
    Payee(String),
    Amount(f64),
    Date(NaiveDateTime),
    Category(String),
    Description(String),
    InstDescription(String),
}

impl TransactionUpdate {
    pub fn apply(&self, transaction: &mut Transaction) {
        match self {
            Self::Account(id) => transaction.account_id = id.clone(),
            Self::Payee(payee) => transaction.payee = payee.clone(),
            Self::Amount(amount) => transaction.amount = *amount,
            Self::Date(date) => transaction.date = *date,
            Self::Category(category) => transaction.category = category.clone(),
            Self::Description(desc) => transaction.description = desc.clone(),
            Self::InstDescription(desc) => transaction.inst_description = desc.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_parsing() {
        assert_eq!("checking".parse::<AccountType>().unwrap(), AccountType::Checking);
        assert_eq!("Credit Card".parse::<AccountType>().unwrap(), AccountType::CreditCard);
        assert_eq!("credit_card".parse::<AccountType>().unwrap(), AccountType::CreditCard);
        assert_eq!("personal-loan".parse::<AccountType>().unwrap(), AccountType::PersonalLoan);
        assert!("brokerage".parse::<AccountType>().is_err());
        let all = [
            AccountType::Checking,
            AccountType::Savings,
            AccountType::CreditCard,
            AccountType::Investment,
            AccountType::PersonalLoan,
            AccountType::Unknown,
        ];
        for ty in all {
            assert_eq!(ty.key().parse::<AccountType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_display_sign_inversion() {
        assert_eq!(AccountType::Checking.displayed_amount(50.0), -50.0);
        assert_eq!(AccountType::CreditCard.displayed_amount(50.0), 50.0);
        assert_eq!(AccountType::Savings.displayed_amount(-12.5), 12.5);
    }

    #[test]
    fn test_builder_defaults() {
        let acc = Account::builder().build();
        assert!(acc.alias.is_none());
        assert_eq!(acc.account_type, AccountType::Unknown);
        assert_eq!(acc.anchor_balance, 0.0);
        assert_eq!(acc.anchor_time, epoch());
        assert!(uuid::Uuid::parse_str(&acc.id).is_ok());
    }

    #[test]
    fn test_builder_empty_alias_is_none() {
        let acc = Account::builder().alias("").build();
        assert!(acc.alias.is_none());
        assert_eq!(acc.alias_or_id(), acc.id);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Transaction::new("acc", "Spotify", 18.25);
        let b = Transaction::new("acc", "Spotify", 18.25);
        assert_ne!(a.id, b.id);
        let same_fields = Transaction {
            id: a.id.clone(),
            date: a.date,
            ..b
        };
        assert_eq!(a, same_fields);
    }

    #[test]
    fn test_new_transaction_date_truncated() {
        let tr = Transaction::new("acc", "Spotify", 18.25);
        assert_eq!(chrono::Timelike::nanosecond(&tr.date), 0);
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let acc = Account::builder().credential("item-1", "secret-token").build();
        let debug = format!("{:?}", acc);
        assert!(debug.contains("item-1"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_update_touches_single_field() {
        let before = Transaction::new("acc", "Spotify", 18.25).with_category("subscriptions");
        let mut after = before.clone();
        TransactionUpdate::Amount(99.0).apply(&mut after);
        assert_eq!(after.amount, 99.0);
        assert_eq!(after.payee, before.payee);
        assert_eq!(after.category, before.category);
        assert_eq!(after.date, before.date);
    }
}
