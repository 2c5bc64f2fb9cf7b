pub mod amount;
pub mod categorize;
pub mod classify;
pub mod column;
pub mod config;
pub mod dates;
pub mod error;
pub mod extract;
pub mod file;
pub mod normalize;
pub mod rules;
pub(crate) mod util;

pub use amount::{Direction, MarkerTable};
pub use categorize::{Categorizer, Identity};
pub use classify::{AccountMap, AccountRule};
pub use column::{Column, ColumnConfig, ColumnRef, IndexConfig};
pub use config::{AccountMapConfig, ImporterConfig};
pub use dates::DateHints;
pub use error::ImportError;
pub use extract::Importer;
pub use file::{Dialect, StatementFile};
pub use rules::{CategoryRule, MatchType, RuleCategorizer};
