use super::{date, CatalogError, PeriodRecord};

/// Label, start, end, last updated, destination id.
pub const MIN_CELLS: usize = 5;

const LABEL: usize = 0;
const START: usize = 1;
const END: usize = 2;
const LAST_UPDATED: usize = 3;
const DESTINATION_ID: usize = 4;

/// Parses one catalog row. `sequence_index` is the 1-based position of the row among the data rows.
pub fn parse_row<S: AsRef<str>>(
    sequence_index: usize,
    cells: &[S],
    catalog_id: &str,
) -> Result<PeriodRecord, CatalogError> {
    if cells.len() < MIN_CELLS {
        return Err(CatalogError::RowTooShort {
            row: sequence_index,
            expected: MIN_CELLS,
            found: cells.len(),
        });
    }
    let cell = |index: usize| cells[index].as_ref();

    let start = parse_mandatory_date(sequence_index, "start date", cell(START))?;
    let end = parse_mandatory_date(sequence_index, "end date", cell(END))?;
    if start > end {
        return Err(CatalogError::InvertedRange {
            row: sequence_index,
            start,
            end,
        });
    }

    let last_updated = match cell(LAST_UPDATED).trim() {
        "" => None,
        text => Some(
            date::parse_timestamp(text).ok_or_else(|| CatalogError::Parse {
                row: sequence_index,
                field: "last updated",
                value: text.to_string(),
            })?,
        ),
    };

    Ok(PeriodRecord::new(
        sequence_index,
        cell(LABEL).trim().to_string(),
        start,
        end,
        last_updated,
        cell(DESTINATION_ID).trim().to_string(),
        catalog_id.to_string(),
    ))
}

fn parse_mandatory_date(
    row: usize,
    field: &'static str,
    text: &str,
) -> Result<chrono::NaiveDate, CatalogError> {
    date::parse_date(text).ok_or_else(|| {
        log::warn!("Failed to parse {field} {text:?} in catalog row {row}");
        CatalogError::Parse {
            row,
            field,
            value: text.to_string(),
        }
    })
}
