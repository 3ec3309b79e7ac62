mod error;
mod pipeline;
mod row;
mod sink;
mod transaction;

pub use error::AppendError;
pub use pipeline::{channel, wait_all, AppendHandle, AppendOutcome, Destination, LedgerAppender};
pub use row::{format_date, from_minor_units, Cell, LedgerRow, RangeDescriptor, RowLayout, HEADER};
pub use sink::{AppendSink, CsvLedgerSink};
pub use transaction::{sort_for_append, Transaction};

#[cfg(test)]
pub(crate) use transaction::testutils::transaction;
