use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::amount::Amount;

/// Flag for a transaction the importer is confident about.
pub const FLAG_OKAY: char = '*';

/// Metadata keys that carry provenance only and are left out of rendered text.
const PROVENANCE_KEYS: &[&str] = &["filename", "lineno"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Integer(i64),
    Number(Decimal),
    Date(NaiveDate),
    Text(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Integer(n) => write!(f, "{n}"),
            MetaValue::Number(n) => write!(f, "{n}"),
            MetaValue::Date(d) => write!(f, "{d}"),
            MetaValue::Text(s) => write!(f, "\"{}\"", escape(s)),
        }
    }
}

pub type Meta = BTreeMap<String, MetaValue>;

/// One leg of a transaction. A posting without units is balanced by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub account: String,
    pub units: Option<Amount>,
}

impl Posting {
    pub fn new(account: impl Into<String>, units: Amount) -> Self {
        Posting {
            account: account.into(),
            units: Some(units),
        }
    }

    pub fn inferred(account: impl Into<String>) -> Self {
        Posting {
            account: account.into(),
            units: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub meta: Meta,
    pub date: NaiveDate,
    pub flag: char,
    pub payee: Option<String>,
    pub narration: String,
    pub tags: BTreeSet<String>,
    pub postings: Vec<Posting>,
}

impl Transaction {
    pub fn new(date: NaiveDate, narration: impl Into<String>) -> Self {
        Transaction {
            meta: Meta::new(),
            date,
            flag: FLAG_OKAY,
            payee: None,
            narration: narration.into(),
            tags: BTreeSet::new(),
            postings: Vec::new(),
        }
    }
}

/// An assertion that `account` holds exactly `amount` at the start of `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub meta: Meta,
    pub date: NaiveDate,
    pub account: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Transaction(Transaction),
    Balance(Balance),
}

impl Directive {
    pub fn date(&self) -> NaiveDate {
        match self {
            Directive::Transaction(t) => t.date,
            Directive::Balance(b) => b.date,
        }
    }

    pub fn meta(&self) -> &Meta {
        match self {
            Directive::Transaction(t) => &t.meta,
            Directive::Balance(b) => &b.meta,
        }
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Directive::Transaction(t) => Some(t),
            Directive::Balance(_) => None,
        }
    }

    pub fn as_balance(&self) -> Option<&Balance> {
        match self {
            Directive::Balance(b) => Some(b),
            Directive::Transaction(_) => None,
        }
    }
}

/// Runs of whitespace and punctuation, which end a tag in ledger syntax,
/// become a single `-`.
fn tag_name(tag: &str) -> String {
    tag.split(|c: char| c.is_whitespace() || "()[]{},;:'\"#".contains(c))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn write_meta(f: &mut fmt::Formatter<'_>, meta: &Meta) -> fmt::Result {
    for (key, value) in meta {
        if PROVENANCE_KEYS.contains(&key.as_str()) {
            continue;
        }
        writeln!(f, "  {key}: {value}")?;
    }
    Ok(())
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.flag)?;
        if let Some(payee) = &self.payee {
            write!(f, " \"{}\"", escape(payee))?;
        }
        write!(f, " \"{}\"", escape(&self.narration))?;
        for tag in self.tags.iter().map(String::as_str).map(tag_name).filter(|tag| !tag.is_empty()) {
            write!(f, " #{tag}")?;
        }
        writeln!(f)?;
        write_meta(f, &self.meta)?;
        for posting in &self.postings {
            match &posting.units {
                Some(units) => writeln!(f, "  {}  {}", posting.account, units)?,
                None => writeln!(f, "  {}", posting.account)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} balance {}  {}", self.date, self.account, self.amount)?;
        write_meta(f, &self.meta)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Transaction(t) => t.fmt(f),
            Directive::Balance(b) => b.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn usd(s: &str) -> Amount {
        Amount::new(Decimal::from_str(s).unwrap(), "USD")
    }

    fn coffee() -> Transaction {
        let mut txn = Transaction::new(date(2024, 1, 5), "Latte");
        txn.payee = Some("COFFEE SHOP".to_string());
        txn.meta
            .insert("filename".to_string(), MetaValue::Text("stmt.csv".to_string()));
        txn.meta.insert("lineno".to_string(), MetaValue::Integer(1));
        txn.meta
            .insert("card".to_string(), MetaValue::Text("Visa Gold".to_string()));
        txn.postings
            .push(Posting::new("Assets:Checking", -usd("4.50")));
        txn.postings.push(Posting::inferred("Expenses:Food"));
        txn
    }

    #[test]
    fn transaction_renders_beancount_text() {
        let expected = "2024-01-05 * \"COFFEE SHOP\" \"Latte\"\n  card: \"Visa Gold\"\n  Assets:Checking  -4.50 USD\n  Expenses:Food\n";
        assert_eq!(coffee().to_string(), expected);
    }

    #[test]
    fn transaction_without_payee_renders_narration_only() {
        let mut txn = Transaction::new(date(2024, 2, 1), "Say \"hi\"");
        txn.tags.insert("trip".to_string());
        assert_eq!(txn.to_string(), "2024-02-01 * \"Say \\\"hi\\\"\" #trip\n");
    }

    #[test]
    fn tags_with_spaces_render_as_one_tag() {
        let mut txn = Transaction::new(date(2024, 2, 1), "Hotel");
        txn.tags.insert("trip 2024".to_string());
        txn.tags.insert(" work, travel ".to_string());
        txn.tags.insert("  ".to_string());
        assert_eq!(txn.to_string(), "2024-02-01 * \"Hotel\" #work-travel #trip-2024\n");
        // The tag set itself is left as extracted.
        assert!(txn.tags.contains("trip 2024"));
    }

    #[test]
    fn balance_renders_on_one_line() {
        let b = Balance {
            meta: Meta::new(),
            date: date(2024, 1, 11),
            account: "Assets:Checking".to_string(),
            amount: usd("532.10"),
        };
        assert_eq!(b.to_string(), "2024-01-11 balance Assets:Checking  532.10 USD\n");
    }

    #[test]
    fn directive_accessors() {
        let d = Directive::Transaction(coffee());
        assert_eq!(d.date(), date(2024, 1, 5));
        assert!(d.as_transaction().is_some());
        assert!(d.as_balance().is_none());
        assert_eq!(d.meta().get("lineno"), Some(&MetaValue::Integer(1)));
    }

    #[test]
    fn directive_serializes_with_type_tag() {
        let d = Directive::Transaction(coffee());
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "transaction");
        assert_eq!(json["payee"], "COFFEE SHOP");
        assert_eq!(json["meta"]["lineno"], 1);
    }
}
