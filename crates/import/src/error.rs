use thiserror::Error;

use crate::column::Column;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid importer config: {0}")]
    InvalidConfig(#[from] toml::de::Error),
    #[error("Unknown column role: {0}")]
    UnknownColumn(String),
    #[error("CSV config without header has non-index column for {0}")]
    NonIndexColumn(Column),
    #[error("Account map has no default account")]
    MissingDefaultAccount,
    #[error("Invalid account pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Dialect character must be ASCII: {0:?}")]
    InvalidDialect(char),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid time: {0}")]
    InvalidTime(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Row {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: Box<ImportError>,
    },
}

impl ImportError {
    pub(crate) fn at_row(self, line: usize) -> Self {
        ImportError::Row {
            line,
            source: Box::new(self),
        }
    }
}
