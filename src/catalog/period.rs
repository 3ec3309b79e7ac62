use chrono::{NaiveDate, NaiveDateTime};

/// One catalog entry: a budget destination covering `start..=end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRecord {
    sequence_index: usize,
    file_label: String,
    start: NaiveDate,
    end: NaiveDate,
    last_updated: Option<NaiveDateTime>,
    destination_id: String,
    catalog_id: String,
}

impl PeriodRecord {
    /// Callers must guarantee `start <= end`, the row parser checks this before calling.
    pub(super) fn new(
        sequence_index: usize,
        file_label: String,
        start: NaiveDate,
        end: NaiveDate,
        last_updated: Option<NaiveDateTime>,
        destination_id: String,
        catalog_id: String,
    ) -> Self {
        debug_assert!(start <= end);
        Self {
            sequence_index,
            file_label,
            start,
            end,
            last_updated,
            destination_id,
            catalog_id,
        }
    }

    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    pub fn file_label(&self) -> &str {
        &self.file_label
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn last_updated(&self) -> Option<NaiveDateTime> {
        self.last_updated
    }

    pub fn destination_id(&self) -> &str {
        &self.destination_id
    }

    pub fn catalog_id(&self) -> &str {
        &self.catalog_id
    }

    /// First day on which the period no longer accepts transactions.
    pub fn closes_on(&self) -> NaiveDate {
        self.end.succ_opt().unwrap_or(NaiveDate::MAX)
    }
}

/// Immutable snapshot of all period records loaded from one catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    catalog_id: String,
    records: Vec<PeriodRecord>,
}

impl Catalog {
    pub fn new(catalog_id: String, records: Vec<PeriodRecord>) -> Self {
        Self {
            catalog_id,
            records,
        }
    }

    pub fn catalog_id(&self) -> &str {
        &self.catalog_id
    }

    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}


#[cfg(test)]
mod tests {
    use super::testutils::{date, record};

    #[test]
    fn closes_on_day_after_end() {
        let record = record(date(2018, 1, 1), date(2018, 1, 31), None);
        assert_eq!(date(2018, 2, 1), record.closes_on());
    }

    #[test]
    fn closes_on_year_boundary() {
        let record = record(date(2018, 12, 1), date(2018, 12, 31), None);
        assert_eq!(date(2019, 1, 1), record.closes_on());
    }
}
