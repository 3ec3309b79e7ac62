use std::future::Future;
use std::path::PathBuf;

use rust_decimal::prelude::ToPrimitive as _;
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use super::HistoryError;
use crate::catalog::{parse_date, Interval};
use crate::ledger::Transaction;

/// Something that yields the transactions of one account.
pub trait TransactionSource {
    /// Sends every transaction to `sender` and returns how many were sent.
    /// The stream ends when `sender` is dropped at the end of the call.
    fn produce(
        &self,
        sender: mpsc::Sender<Transaction>,
    ) -> impl Future<Output = Result<usize, HistoryError>> + Send;
}

/// Account history exported by the bank as CSV:
/// `Date,Type,Description,Debit,Credit,Balance`, one transaction per line.
/// Only transactions within `interval` are produced.
#[derive(Debug, Clone)]
pub struct CsvHistoryFile {
    path: PathBuf,
    interval: Interval,
}

impl CsvHistoryFile {
    pub fn new(path: impl Into<PathBuf>, interval: Interval) -> Self {
        Self {
            path: path.into(),
            interval,
        }
    }

    fn parse(&self, content: &[u8]) -> Result<Vec<Transaction>, HistoryError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content);
        let mut transactions = Vec::new();
        for (sequence_index, record) in reader.records().enumerate() {
            let record = record?;
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            let cell = |index: usize| record.get(index).unwrap_or("");

            let date = parse_date(cell(0)).ok_or_else(|| HistoryError::Parse {
                line,
                field: "date",
                value: cell(0).to_string(),
            })?;
            if date < self.interval.start() || date > self.interval.end() {
                continue;
            }
            transactions.push(Transaction {
                sequence_index: sequence_index as u64,
                date,
                kind: cell(1).to_string(),
                description: cell(2).to_string(),
                debit_minor_units: parse_minor_units(line, "debit", cell(3))?,
                credit_minor_units: parse_minor_units(line, "credit", cell(4))?,
                balance_minor_units: parse_minor_units(line, "balance", cell(5))?,
            });
        }
        Ok(transactions)
    }
}

impl TransactionSource for CsvHistoryFile {
    async fn produce(&self, sender: mpsc::Sender<Transaction>) -> Result<usize, HistoryError> {
        log::info!("Reading account history {}...", self.path.display());
        let content = tokio::fs::read(&self.path).await?;
        let transactions = self.parse(&content)?;
        let num_transactions = transactions.len();
        if num_transactions == 0 {
            log::info!("No transactions in {}", self.path.display());
        }
        for transaction in transactions {
            sender
                .send(transaction)
                .await
                .map_err(|_| HistoryError::ReceiverClosed)?;
        }
        log::info!("Reading account history {}...done", self.path.display());
        Ok(num_transactions)
    }
}

/// Parses amounts like `1,234.56`, `$12.00` or `(5.00)` into cents. Empty means zero.
fn parse_minor_units(line: u64, field: &'static str, text: &str) -> Result<i64, HistoryError> {
    let parse_error = || HistoryError::Parse {
        line,
        field,
        value: text.to_string(),
    };
    let cleaned = text.replace([',', '$'], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(0);
    }
    let (negative, digits) = match cleaned
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, cleaned),
    };
    let amount = Decimal::from_str_exact(digits).map_err(|_| parse_error())?;
    let minor_units = amount * Decimal::ONE_HUNDRED;
    if !minor_units.fract().is_zero() {
        return Err(parse_error());
    }
    let minor_units = minor_units.to_i64().ok_or_else(parse_error)?;
    Ok(if negative { -minor_units } else { minor_units })
}
