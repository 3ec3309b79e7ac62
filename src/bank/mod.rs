mod error;
mod history;
mod router;

pub use error::{HistoryError, RouteError};
pub use history::{CsvHistoryFile, TransactionSource};
pub use router::{Router, RoutingSummary};
