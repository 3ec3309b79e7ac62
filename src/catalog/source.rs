use std::future::Future;
use std::path::PathBuf;

use super::{row, Catalog, CatalogError};

/// Where period records come from.
pub trait CatalogSource {
    fn load(&self, catalog_id: &str) -> impl Future<Output = Result<Catalog, CatalogError>> + Send;
}

/// Reads `<dir>/<catalog_id>.csv`. Row 1 is a header, period rows start at row 2.
#[derive(Debug, Clone)]
pub struct CsvCatalogSource {
    dir: PathBuf,
}

impl CsvCatalogSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, catalog_id: &str) -> PathBuf {
        self.dir.join(format!("{catalog_id}.csv"))
    }
}

impl CatalogSource for CsvCatalogSource {
    async fn load(&self, catalog_id: &str) -> Result<Catalog, CatalogError> {
        log::info!("Loading catalog {catalog_id}...");
        let retrieval_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            CatalogError::Retrieval {
                catalog_id: catalog_id.to_string(),
                source,
            }
        };

        let content = tokio::fs::read(self.path(catalog_id))
            .await
            .map_err(|err| retrieval_error(err.into()))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_slice());

        let mut records = Vec::new();
        for (index, cells) in reader.records().enumerate() {
            let cells = cells.map_err(|err| retrieval_error(err.into()))?;
            let cells: Vec<&str> = cells.iter().collect();
            records.push(row::parse_row(index + 1, &cells, catalog_id)?);
        }

        if records.is_empty() {
            log::info!("No periods found in catalog {catalog_id}");
        }
        log::info!("Loading catalog {catalog_id}...done");

        Ok(Catalog::new(catalog_id.to_string(), records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_catalog(dir: &tempfile::TempDir, name: &str, content: &str) {
        tokio::fs::write(dir.path().join(format!("{name}.csv")), content)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn load_catalog() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            &dir,
            "index",
            "File,Start,End,Last Updated,Sheet\n\
             Budget 2017,1/1/2017,12/31/2017,1/2/2018,sheet-2017\n\
             Budget 2018,1/1/2018,12/31/2018,,sheet-2018\n",
        )
        .await;

        let catalog = CsvCatalogSource::new(dir.path()).load("index").await.unwrap();
        assert_eq!("index", catalog.catalog_id());
        assert_eq!(2, catalog.len());
        let records = catalog.records();
        assert_eq!(1, records[0].sequence_index());
        assert_eq!("sheet-2017", records[0].destination_id());
        assert!(records[0].last_updated().is_some());
        assert_eq!(2, records[1].sequence_index());
        assert_eq!("Budget 2018", records[1].file_label());
        assert_eq!(None, records[1].last_updated());
        assert!(records.iter().all(|record| record.catalog_id() == "index"));
    }

    #[tokio::test]
    async fn header_only_catalog_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(&dir, "index", "File,Start,End,Last Updated,Sheet\n").await;

        let catalog = CsvCatalogSource::new(dir.path()).load("index").await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn bad_row_aborts_loading() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            &dir,
            "index",
            "File,Start,End,Last Updated,Sheet\n\
             Budget 2017,1/1/2017,12/31/2017,,sheet-2017\n\
             Budget 2018,soon,12/31/2018,,sheet-2018\n\
             Budget 2019,1/1/2019,12/31/2019,,sheet-2019\n",
        )
        .await;

        let err = CsvCatalogSource::new(dir.path())
            .load("index")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Parse { row: 2, .. }));
    }

    #[tokio::test]
    async fn short_row_aborts_loading() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            &dir,
            "index",
            "File,Start,End,Last Updated,Sheet\nBudget 2017,1/1/2017,12/31/2017\n",
        )
        .await;

        let err = CsvCatalogSource::new(dir.path())
            .load("index")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::RowTooShort { row: 1, .. }));
    }

    #[tokio::test]
    async fn missing_catalog_is_retrieval_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvCatalogSource::new(dir.path())
            .load("missing")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Retrieval { .. }));
    }
}
