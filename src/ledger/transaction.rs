use chrono::NaiveDate;

/// A transaction as downloaded from the bank. Amounts are in minor units (cents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub sequence_index: u64,
    pub date: NaiveDate,
    pub kind: String,
    pub description: String,
    pub debit_minor_units: i64,
    pub credit_minor_units: i64,
    pub balance_minor_units: i64,
}

/// Sorts by date, then by sequence index. Same-day transactions keep the
/// order the bank reported them in.
pub fn sort_for_append(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.sort_by_key(|transaction| (transaction.date, transaction.sequence_index));
    transactions
}
