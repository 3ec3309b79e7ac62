use std::future::Future;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt as _;

use super::{AppendError, LedgerRow, RangeDescriptor, RowLayout};

/// Writes a whole batch of rows to a ledger destination in one call.
pub trait AppendSink {
    fn append(
        &self,
        destination_id: &str,
        range: &RangeDescriptor,
        rows: Vec<LedgerRow>,
    ) -> impl Future<Output = Result<(), AppendError>> + Send;
}

/// Keeps each worksheet as `<dir>/<destination_id>/<worksheet>.csv`.
/// A new file gets the header row of the layout the data range belongs to.
#[derive(Debug, Clone)]
pub struct CsvLedgerSink {
    dir: PathBuf,
}

impl CsvLedgerSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn worksheet_path(&self, destination_id: &str, worksheet: &str) -> PathBuf {
        self.dir
            .join(destination_id)
            .join(format!("{worksheet}.csv"))
    }

    async fn write_batch(
        &self,
        destination_id: &str,
        range: &RangeDescriptor,
        rows: Vec<LedgerRow>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let layout =
            RowLayout::of_range(range).ok_or_else(|| format!("Unsupported range {range}"))?;
        let header = layout.header();
        if let Some(row) = rows.iter().find(|row| row.cells().len() != header.len()) {
            return Err(format!(
                "Row has {} cells but the worksheet has {} columns",
                row.cells().len(),
                header.len()
            )
            .into());
        }

        let path = self.worksheet_path(destination_id, range.worksheet());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let is_new = file.metadata().await?.len() == 0;

        let mut writer = csv::Writer::from_writer(Vec::new());
        if is_new {
            log::debug!("Writing header to {}", layout.header_range(range.worksheet()));
            writer.write_record(&header)?;
        }
        for row in &rows {
            writer.write_record(row.to_strings())?;
        }
        let content = writer.into_inner().map_err(|err| err.into_error())?;

        file.write_all(&content).await?;
        file.flush().await?;
        Ok(())
    }
}

impl AppendSink for CsvLedgerSink {
    async fn append(
        &self,
        destination_id: &str,
        range: &RangeDescriptor,
        rows: Vec<LedgerRow>,
    ) -> Result<(), AppendError> {
        let num_rows = rows.len();
        log::info!("Appending {num_rows} rows to {destination_id} at {range}...");
        self.write_batch(destination_id, range, rows)
            .await
            .map_err(|source| {
                log::warn!("Couldn't append transactions to {destination_id}: {source}");
                AppendError::Sink {
                    destination_id: destination_id.to_string(),
                    range: range.clone(),
                    source,
                }
            })?;
        log::info!("Appending {num_rows} rows to {destination_id} at {range}...done");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testutils {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct AppendCall {
        pub destination_id: String,
        pub range: RangeDescriptor,
        pub rows: Vec<LedgerRow>,
    }

    /// Remembers every append call, optionally failing them.
    #[derive(Default)]
    pub struct RecordingSink {
        pub calls: Mutex<Vec<AppendCall>>,
        pub fail: bool,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            Self {
                calls: Mutex::new(vec![]),
                fail: true,
            }
        }

        pub fn calls(&self) -> Vec<AppendCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AppendSink for RecordingSink {
        async fn append(
            &self,
            destination_id: &str,
            range: &RangeDescriptor,
            rows: Vec<LedgerRow>,
        ) -> Result<(), AppendError> {
            self.calls.lock().unwrap().push(AppendCall {
                destination_id: destination_id.to_string(),
                range: range.clone(),
                rows,
            });
            if self.fail {
                return Err(AppendError::Sink {
                    destination_id: destination_id.to_string(),
                    range: range.clone(),
                    source: "sink unavailable".into(),
                });
            }
            Ok(())
        }
    }
}
