use tabula_core::Transaction;

/// Hook run on every extracted transaction before it joins the batch.
/// Typically attaches the other leg (an expense or income account) that the
/// statement itself cannot tell us.
pub trait Categorizer: Send + Sync {
    fn categorize(&self, txn: Transaction) -> Transaction;
}

impl<F> Categorizer for F
where
    F: Fn(Transaction) -> Transaction + Send + Sync,
{
    fn categorize(&self, txn: Transaction) -> Transaction {
        self(txn)
    }
}

/// Leaves transactions untouched.
pub struct Identity;

impl Categorizer for Identity {
    fn categorize(&self, txn: Transaction) -> Transaction {
        txn
    }
}
