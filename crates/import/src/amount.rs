use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

use csv::StringRecord;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::column::{field, non_empty_field, Column, IndexConfig};
use crate::error::ImportError;

/// Which way money moved on a statement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
    /// The row carries no usable signal; often an internal transfer.
    Uncertain,
}

/// Debit/credit marker text as it appears in the statement, mapped to a direction.
pub type MarkerTable = BTreeMap<String, Direction>;

fn number_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"\d+\.?\d*").expect("invalid regex"))
}

/// Pull the first decimal number out of `text`, ignoring currency symbols,
/// thousands separators and any sign.
pub fn extract_decimal(text: &str) -> Result<Decimal, ImportError> {
    let cleaned = text.replace(',', "");
    let digits = number_re()
        .find(&cleaned)
        .map(|m| m.as_str().trim_end_matches('.'))
        .ok_or_else(|| ImportError::InvalidAmount(text.to_string()))?;
    Decimal::from_str(digits).map_err(|_| ImportError::InvalidAmount(text.to_string()))
}

/// Parse a signed number such as a running balance. Thousands separators and
/// surrounding whitespace are tolerated; anything else is an error.
pub fn parse_signed(text: &str) -> Result<Decimal, ImportError> {
    let cleaned: String = text.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    Decimal::from_str(&cleaned).map_err(|_| ImportError::InvalidAmount(text.to_string()))
}

/// Decide whether a row is a debit or a credit. Never fails: anything that
/// cannot be looked up is `Uncertain`.
pub fn resolve_direction(iconfig: &IndexConfig, row: &StringRecord, markers: &MarkerTable) -> Direction {
    if iconfig.contains_key(&Column::Amount) {
        return field(iconfig, row, Column::DrCr)
            .and_then(|marker| markers.get(marker.trim()))
            .copied()
            .unwrap_or(Direction::Uncertain);
    }
    if non_empty_field(iconfig, row, Column::AmountCredit).is_some() {
        Direction::Credit
    } else if non_empty_field(iconfig, row, Column::AmountDebit).is_some() {
        Direction::Debit
    } else {
        Direction::Uncertain
    }
}

/// Read the (debit, credit) amounts of a row. The debit side comes back
/// negated.
///
/// A row is only suppressed as empty when both sides are present and both
/// are zero; a lone zero on one side is kept.
pub fn resolve_amounts(
    iconfig: &IndexConfig,
    row: &StringRecord,
    direction: Direction,
    allow_zero: bool,
) -> Result<(Option<Decimal>, Option<Decimal>), ImportError> {
    let (debit, credit) = if iconfig.contains_key(&Column::Amount) {
        let amount = non_empty_field(iconfig, row, Column::Amount);
        match direction {
            Direction::Credit => (None, amount),
            Direction::Debit | Direction::Uncertain => (amount, None),
        }
    } else {
        (
            non_empty_field(iconfig, row, Column::AmountDebit),
            non_empty_field(iconfig, row, Column::AmountCredit),
        )
    };

    let debit = debit.map(extract_decimal).transpose()?;
    let credit = credit.map(extract_decimal).transpose()?;

    if !allow_zero && matches!((debit, credit), (Some(d), Some(c)) if d.is_zero() && c.is_zero()) {
        return Ok((None, None));
    }

    Ok((debit.map(|d| -d), credit))
}
