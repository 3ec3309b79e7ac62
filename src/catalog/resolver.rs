use chrono::NaiveDate;
use thiserror::Error;

use super::PeriodRecord;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Interval starts on {start} but ends on {end}")]
pub struct IntervalError {
    start: NaiveDate,
    end: NaiveDate,
}

/// An inclusive range of whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: NaiveDate,
    end: NaiveDate,
}

impl Interval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, IntervalError> {
        if start > end {
            return Err(IntervalError { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// A record is active for `interval` if its days overlap the interval and it
/// wasn't updated after the day its period closed.
///
/// An interval starting on the day after `end` shares no day with the record
/// and is not active, even though the record only closes at the start of that day.
pub fn is_active(record: &PeriodRecord, interval: Interval) -> bool {
    let closes_on = record.closes_on();

    // Record ends before the interval starts
    if interval.start >= closes_on {
        return false;
    }

    // Record starts after the interval ends
    if interval.end < record.start() {
        return false;
    }

    match record.last_updated() {
        None => true,
        Some(last_updated) => last_updated.date() <= closes_on,
    }
}

/// Returns the active records, in catalog order.
pub fn active_periods(catalog: &[PeriodRecord], interval: Interval) -> Vec<PeriodRecord> {
    catalog
        .iter()
        .filter(|record| is_active(record, interval))
        .cloned()
        .collect()
}

/// The first active record covering `date`, if any.
pub fn resolve_date(catalog: &[PeriodRecord], date: NaiveDate) -> Option<&PeriodRecord> {
    catalog
        .iter()
        .find(|record| is_active(record, Interval::day(date)))
}
