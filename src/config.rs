use anyhow::{anyhow, bail, ensure, Context as _, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::args::OptionArgs;
use crate::ledger::RowLayout;

const DEFAULT_CONFIG_DIR: &str = ".budget-update";
const DEFAULT_CONFIG_FILE: &str = "options.json";

/// Runtime options. Command line options override the options file, which overrides the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub ledger: LedgerConfig,
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub catalog_id: String,
    pub catalog_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_id: "index".to_string(),
            catalog_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub ledger_dir: PathBuf,
    pub category_label: String,
    pub layout: RowLayout,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_dir: PathBuf::from("ledger"),
            category_label: "Uncategorized".to_string(),
            layout: RowLayout::WithCategory,
        }
    }
}

/// A bank account. Its name is also the worksheet its transactions go to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub name: String,
    pub history_file: PathBuf,
}

impl Config {
    pub fn merge(mut self, options: &OptionArgs) -> Self {
        if let Some(catalog_id) = &options.catalog_id {
            self.catalog.catalog_id = catalog_id.clone();
        }
        if let Some(catalog_dir) = &options.catalog_dir {
            self.catalog.catalog_dir = catalog_dir.clone();
        }
        if let Some(ledger_dir) = &options.ledger_dir {
            self.ledger.ledger_dir = ledger_dir.clone();
        }
        if let Some(category) = &options.category {
            self.ledger.category_label = category.clone();
        }
        if options.no_category_column {
            self.ledger.layout = RowLayout::WithoutCategory;
        }
        if !options.accounts.is_empty() {
            self.accounts = options.accounts.clone();
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.catalog.catalog_id.trim().is_empty(),
            "The catalog id must not be empty"
        );
        let mut names = HashSet::new();
        for account in &self.accounts {
            ensure!(
                !account.name.trim().is_empty(),
                "Account names must not be empty"
            );
            ensure!(
                names.insert(account.name.as_str()),
                "Account {} is listed twice",
                account.name
            );
        }
        Ok(())
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE))
}

/// Returns the options file to use, either the one given on the command line or the default one.
pub fn config_path(options: &OptionArgs) -> Result<PathBuf> {
    match &options.config_file {
        Some(path) => Ok(path.clone()),
        None => default_path().ok_or_else(|| anyhow!("Couldn't find the home directory")),
    }
}

pub async fn load(options: &OptionArgs) -> Result<Config> {
    let config = match &options.config_file {
        Some(path) => read(path)
            .await?
            .ok_or_else(|| anyhow!("Options file {} not found", path.display()))?,
        None => match default_path() {
            Some(path) => read(&path).await?.unwrap_or_default(),
            None => Config::default(),
        },
    };
    let config = config.merge(options);
    config.validate()?;
    Ok(config)
}

/// Returns Ok(None) if the file doesn't exist
pub async fn read(path: &Path) -> Result<Option<Config>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }
    log::info!("Loading options from {}...", path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| anyhow!("Unable to read options file {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .with_context(|| anyhow!("Unable to process options file {}", path.display()))?;
    log::info!("Loading options from {}...done", path.display());
    Ok(Some(config))
}

/// Writes a new options file, refusing to overwrite an existing one.
pub async fn create(config: &Config, path: &Path) -> Result<()> {
    if tokio::fs::try_exists(path).await? {
        bail!("Options file {} already exists", path.display());
    }
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, format!("{content}\n")).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str, history_file: &str) -> AccountConfig {
        AccountConfig {
            name: name.to_string(),
            history_file: PathBuf::from(history_file),
        }
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!("index", config.catalog.catalog_id);
        assert_eq!("Uncategorized", config.ledger.category_label);
        assert_eq!(RowLayout::WithCategory, config.ledger.layout);
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn command_line_overrides_file() {
        let file = Config {
            catalog: CatalogConfig {
                catalog_id: "file-index".to_string(),
                catalog_dir: PathBuf::from("/catalogs"),
            },
            ledger: LedgerConfig::default(),
            accounts: vec![account("Savings", "savings.csv")],
        };
        let options = OptionArgs {
            catalog_id: Some("cli-index".to_string()),
            category: Some("Groceries".to_string()),
            no_category_column: true,
            accounts: vec![account("Joint Checking", "checking.csv")],
            ..Default::default()
        };

        let merged = file.merge(&options);
        assert_eq!("cli-index", merged.catalog.catalog_id);
        assert_eq!(PathBuf::from("/catalogs"), merged.catalog.catalog_dir);
        assert_eq!("Groceries", merged.ledger.category_label);
        assert_eq!(RowLayout::WithoutCategory, merged.ledger.layout);
        assert_eq!(vec![account("Joint Checking", "checking.csv")], merged.accounts);
    }

    #[test]
    fn no_command_line_accounts_keeps_file_accounts() {
        let file = Config {
            accounts: vec![account("Savings", "savings.csv")],
            ..Default::default()
        };
        let merged = file.clone().merge(&OptionArgs::default());
        assert_eq!(file, merged);
    }

    #[test]
    fn duplicate_accounts_are_invalid() {
        let config = Config {
            accounts: vec![account("Savings", "a.csv"), account("Savings", "b.csv")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_catalog_id_is_invalid() {
        let mut config = Config::default();
        config.catalog.catalog_id = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        tokio::fs::write(
            &path,
            r#"{"catalog": {"catalog_id": "budgets"}, "ledger": {"layout": "without_category"}}"#,
        )
        .await
        .unwrap();

        let config = read(&path).await.unwrap().unwrap();
        assert_eq!("budgets", config.catalog.catalog_id);
        assert_eq!(PathBuf::from("."), config.catalog.catalog_dir);
        assert_eq!(RowLayout::WithoutCategory, config.ledger.layout);
        assert_eq!("Uncategorized", config.ledger.category_label);
    }

    #[tokio::test]
    async fn read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(None, read(&dir.path().join("options.json")).await.unwrap());
    }

    #[tokio::test]
    async fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = OptionArgs {
            config_file: Some(dir.path().join("options.json")),
            ..Default::default()
        };
        assert!(load(&options).await.is_err());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        tokio::fs::write(&path, "{not json").await.unwrap();
        assert!(read(&path).await.is_err());
    }

    #[tokio::test]
    async fn create_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("options.json");
        let config = Config {
            accounts: vec![account("Joint Checking", "checking.csv")],
            ..Default::default()
        };

        create(&config, &path).await.unwrap();
        let options = OptionArgs {
            config_file: Some(path.clone()),
            ..Default::default()
        };
        assert_eq!(config, load(&options).await.unwrap());

        assert!(create(&config, &path).await.is_err());
    }
}
