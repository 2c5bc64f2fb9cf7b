use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The semantic role a statement column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    /// Settlement date; the date the transaction is booked at.
    Date,
    /// Date the purchase actually happened. Kept as metadata.
    TxnDate,
    /// Time of day of the purchase. Kept as metadata.
    TxnTime,
    Payee,
    Narration1,
    Narration2,
    Remark,
    /// Single signed-or-unsigned amount column; direction comes from `DrCr`.
    Amount,
    AmountDebit,
    AmountCredit,
    /// Running balance after the row posted.
    Balance,
    Tag,
    /// Column whose text says whether the row is a debit or a credit.
    DrCr,
    Last4,
    Account,
    Status,
}

impl Column {
    pub const ALL: [Column; 16] = [
        Column::Date,
        Column::TxnDate,
        Column::TxnTime,
        Column::Payee,
        Column::Narration1,
        Column::Narration2,
        Column::Remark,
        Column::Amount,
        Column::AmountDebit,
        Column::AmountCredit,
        Column::Balance,
        Column::Tag,
        Column::DrCr,
        Column::Last4,
        Column::Account,
        Column::Status,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::TxnDate => "txn_date",
            Column::TxnTime => "txn_time",
            Column::Payee => "payee",
            Column::Narration1 => "narration1",
            Column::Narration2 => "narration2",
            Column::Remark => "remark",
            Column::Amount => "amount",
            Column::AmountDebit => "debit",
            Column::AmountCredit => "credit",
            Column::Balance => "balance",
            Column::Tag => "tag",
            Column::DrCr => "drcr",
            Column::Last4 => "last4",
            Column::Account => "account",
            Column::Status => "status",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        if key == "narration" {
            return Ok(Column::Narration1);
        }
        Column::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| format!("Unknown column role: '{s}'"))
    }
}

/// Where a role lives in the source: a header name or a zero-based index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

pub type ColumnConfig = BTreeMap<Column, ColumnRef>;

/// Roles resolved to cell indexes for one file. A missing key means the role
/// was never requested or could not be resolved.
pub type IndexConfig = BTreeMap<Column, usize>;

/// Fetch the cell for `column`, or `None` if the role is unresolved or the
/// row is too short.
pub fn field<'r>(iconfig: &IndexConfig, row: &'r StringRecord, column: Column) -> Option<&'r str> {
    iconfig.get(&column).and_then(|&index| row.get(index))
}

/// Like [`field`] but treats whitespace-only cells as absent.
pub fn non_empty_field<'r>(
    iconfig: &IndexConfig,
    row: &'r StringRecord,
    column: Column,
) -> Option<&'r str> {
    field(iconfig, row, column).filter(|cell| !cell.trim().is_empty())
}
