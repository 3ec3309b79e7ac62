//! The catalog lists budget periods, each a ledger destination covering a
//! date range. The resolver decides which of them may receive transactions.

mod date;
mod error;
mod period;
mod resolver;
mod row;
mod source;

pub use date::{parse_date, parse_timestamp};
pub use error::CatalogError;
pub use period::{Catalog, PeriodRecord};
pub use resolver::{active_periods, is_active, resolve_date, Interval, IntervalError};
pub use row::parse_row;
pub use source::{CatalogSource, CsvCatalogSource};

impl Catalog {
    pub fn active_periods(&self, interval: Interval) -> Vec<PeriodRecord> {
        active_periods(self.records(), interval)
    }

    pub fn resolve_date(&self, date: chrono::NaiveDate) -> Option<&PeriodRecord> {
        resolve_date(self.records(), date)
    }
}
