use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Row {row}: failed to parse {field} {value:?}")]
    Parse {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("Row {row}: expected at least {expected} cells but found {found}")]
    RowTooShort {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}: period starts on {start} but ends on {end}")]
    InvertedRange {
        row: usize,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Couldn't retrieve catalog {catalog_id}: {source}")]
    Retrieval {
        catalog_id: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
