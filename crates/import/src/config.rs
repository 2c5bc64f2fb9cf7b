use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::amount::MarkerTable;
use crate::classify::{AccountMap, AccountRule};
use crate::column::{Column, ColumnConfig, ColumnRef};
use crate::dates::DateHints;
use crate::error::ImportError;
use crate::file::Dialect;

/// Keyword map as written in a config file. A missing `default` falls back
/// to the importer's default account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountMapConfig {
    pub default: Option<String>,
    pub rules: Vec<AccountRule>,
}

impl AccountMapConfig {
    pub(crate) fn compile(&self, fallback: &str) -> Result<AccountMap, ImportError> {
        let default = self.default.as_deref().unwrap_or(fallback);
        AccountMap::new(&self.rules, default)
    }
}

/// Everything that describes one statement source.
///
/// ```toml
/// default_account = "Assets:Bank:Checking"
/// currency = "USD"
///
/// [columns]
/// date = "Date"
/// payee = "Description"
/// debit = "Debit"
/// credit = "Credit"
///
/// [[debit_account.rules]]
/// pattern = "COFFEE"
/// account = "Expenses:Coffee"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// Role name (`date`, `payee`, `debit`, ...) to header name or index.
    pub columns: BTreeMap<String, ColumnRef>,
    pub default_account: String,
    pub currency: String,
    #[serde(default)]
    pub skip_lines: usize,
    /// Last four card digits to a friendly label.
    #[serde(default)]
    pub last4_map: BTreeMap<String, String>,
    /// Text found in the `drcr` column to the direction it means.
    #[serde(default)]
    pub drcr: MarkerTable,
    #[serde(default)]
    pub assets_account: AccountMapConfig,
    #[serde(default)]
    pub debit_account: AccountMapConfig,
    #[serde(default)]
    pub credit_account: AccountMapConfig,
    #[serde(default = "default_narration_sep")]
    pub narration_sep: String,
    /// Rows whose `status` equals this are dropped.
    #[serde(default)]
    pub close_flag: Option<String>,
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub dates: DateHints,
    #[serde(default = "default_transfer_sep")]
    pub transfer_sep: char,
    #[serde(default)]
    pub allow_zero_amounts: bool,
    #[serde(default = "default_flag")]
    pub flag: char,
    #[serde(default)]
    pub debug: bool,
}

fn default_narration_sep() -> String {
    "; ".to_string()
}

fn default_transfer_sep() -> char {
    '-'
}

fn default_flag() -> char {
    tabula_core::FLAG_OKAY
}

impl ImporterConfig {
    pub fn new(default_account: &str, currency: &str) -> Self {
        ImporterConfig {
            columns: BTreeMap::new(),
            default_account: default_account.to_string(),
            currency: currency.to_string(),
            skip_lines: 0,
            last4_map: BTreeMap::new(),
            drcr: MarkerTable::new(),
            assets_account: AccountMapConfig::default(),
            debit_account: AccountMapConfig::default(),
            credit_account: AccountMapConfig::default(),
            narration_sep: default_narration_sep(),
            close_flag: None,
            dialect: Dialect::default(),
            dates: DateHints::default(),
            transfer_sep: default_transfer_sep(),
            allow_zero_amounts: false,
            flag: default_flag(),
            debug: false,
        }
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, ImportError> {
        Ok(toml::from_str(toml_content)?)
    }

    /// Builder-style helper for declaring a column.
    pub fn column(mut self, column: Column, field: impl Into<ColumnRef>) -> Self {
        self.columns.insert(column.key().to_string(), field.into());
        self
    }

    /// The typed role map. Unknown role names are a configuration error.
    pub fn column_config(&self) -> Result<ColumnConfig, ImportError> {
        self.columns
            .iter()
            .map(|(name, field)| {
                name.parse::<Column>()
                    .map(|column| (column, field.clone()))
                    .map_err(|_| ImportError::UnknownColumn(name.clone()))
            })
            .collect()
    }
}
