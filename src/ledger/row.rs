use std::fmt::{self, Display};

use chrono::{Datelike as _, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Transaction;

/// Column titles of the header row, one per cell of a full row.
pub const HEADER: [&str; 8] = [
    "Category",
    "Index",
    "Date",
    "Type",
    "Description",
    "Debit",
    "Credit",
    "Balance",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Integer(u64),
    Amount(Decimal),
}

impl Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => write!(f, "{text}"),
            Cell::Integer(value) => write!(f, "{value}"),
            Cell::Amount(amount) => write!(f, "{amount}"),
        }
    }
}

/// One ledger row, cells in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow(pub Vec<Cell>);

impl LedgerRow {
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

/// Whether rows start with the category label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLayout {
    #[default]
    WithCategory,
    WithoutCategory,
}

impl RowLayout {
    fn first_column(self) -> char {
        match self {
            RowLayout::WithCategory => 'A',
            RowLayout::WithoutCategory => 'B',
        }
    }

    fn skipped_cells(self) -> usize {
        match self {
            RowLayout::WithCategory => 0,
            RowLayout::WithoutCategory => 1,
        }
    }

    pub fn header_range(self, worksheet: &str) -> RangeDescriptor {
        RangeDescriptor::new(worksheet, format!("{}1:H1", self.first_column()))
    }

    pub fn data_range(self, worksheet: &str) -> RangeDescriptor {
        RangeDescriptor::new(worksheet, format!("{}2:H", self.first_column()))
    }

    /// The layout whose header or data range starts at the first cell of `range`.
    pub fn of_range(range: &RangeDescriptor) -> Option<Self> {
        [RowLayout::WithCategory, RowLayout::WithoutCategory]
            .into_iter()
            .find(|layout| range.cells().starts_with(layout.first_column()))
    }

    pub fn header(self) -> Vec<String> {
        HEADER[self.skipped_cells()..]
            .iter()
            .map(|title| title.to_string())
            .collect()
    }

    pub fn row(self, category_label: &str, transaction: &Transaction) -> LedgerRow {
        let mut cells = to_cells(category_label, transaction);
        cells.drain(..self.skipped_cells());
        LedgerRow(cells)
    }
}

/// A worksheet-qualified A1 range, e.g. `Joint Checking!A2:H`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeDescriptor {
    worksheet: String,
    cells: String,
}

impl RangeDescriptor {
    pub fn new(worksheet: &str, cells: String) -> Self {
        Self {
            worksheet: worksheet.to_string(),
            cells,
        }
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    pub fn cells(&self) -> &str {
        &self.cells
    }
}

impl Display for RangeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.worksheet, self.cells)
    }
}

fn to_cells(category_label: &str, transaction: &Transaction) -> Vec<Cell> {
    vec![
        Cell::Text(category_label.to_string()),
        Cell::Integer(transaction.sequence_index),
        Cell::Text(format_date(transaction.date)),
        Cell::Text(transaction.kind.clone()),
        Cell::Text(transaction.description.clone()),
        Cell::Amount(from_minor_units(transaction.debit_minor_units)),
        Cell::Amount(from_minor_units(transaction.credit_minor_units)),
        Cell::Amount(from_minor_units(transaction.balance_minor_units)),
    ]
}

/// `month/day/year` without leading zeros.
pub fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

pub fn from_minor_units(minor_units: i64) -> Decimal {
    Decimal::new(minor_units, 2)
}
