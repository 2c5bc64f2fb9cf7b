pub mod amount;
pub mod directive;

pub use amount::Amount;
pub use directive::{Balance, Directive, Meta, MetaValue, Posting, Transaction, FLAG_OKAY};
