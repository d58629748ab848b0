//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json`. It names the SQLite store
//! and the optional categories file; both default to files inside the home directory.

use crate::db::Db;
use crate::error::{ErrorType, IntoResult, Re};
use crate::model::Categories;
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPENSES_SQLITE: &str = "expenses.sqlite";
const CATEGORIES_JSON: &str = "categories.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME`. It resolves the location of the store and of the categories
/// file, and holds the opened, initialized store.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    db_path: PathBuf,
    categories_path: PathBuf,
}

impl Config {
    /// Creates the home directory and writes a `config.json` into it, then opens and initializes
    /// the store.
    ///
    /// # Arguments
    /// - `dir` - The home directory, e.g. `/tmp/expenses`. Created if it does not exist.
    /// - `db_path` - Where to keep the SQLite store. Relative paths are relative to `dir`.
    ///   Defaults to `expenses.sqlite` in `dir`.
    /// - `categories_path` - Where to look for the categories JSON file. Relative paths are
    ///   relative to `dir`. Defaults to `categories.json` in `dir`.
    ///
    /// An existing `config.json` is overwritten; an existing store is kept and its schema is
    /// brought up to date.
    pub async fn create(
        dir: impl Into<PathBuf>,
        db_path: Option<PathBuf>,
        categories_path: Option<PathBuf>,
    ) -> Result<Self> {
        let root = Self::prepare_home(dir.into())
            .await
            .pub_result(ErrorType::Config)?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            db_path,
            categories_path,
            ..ConfigFile::default()
        };
        config_file
            .save(&config_path)
            .await
            .pub_result(ErrorType::Config)?;

        Self::open(root, config_path, config_file).await
    }

    /// This will
    /// - create `expenses_home` if it does not exist
    /// - load `config.json` if it exists, otherwise use the default settings
    /// - open the store and initialize its schema
    ///
    /// Any failure here leaves the program without a usable store and should be treated as fatal.
    pub async fn load(expenses_home: impl Into<PathBuf>) -> Result<Self> {
        let root = Self::prepare_home(expenses_home.into())
            .await
            .pub_result(ErrorType::Config)?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path)
                .await
                .pub_result(ErrorType::Config)?
        } else {
            debug!(
                "No config file at {}, using default settings",
                config_path.display()
            );
            ConfigFile::default()
        };

        Self::open(root, config_path, config_file).await
    }

    async fn prepare_home(dir: PathBuf) -> Re<PathBuf> {
        utils::make_dir(&dir)
            .await
            .context("Unable to create the expenses home directory")?;
        utils::canonicalize(&dir).await
    }

    async fn open(root: PathBuf, config_path: PathBuf, config_file: ConfigFile) -> Result<Self> {
        let db_path = utils::resolve(&root, &config_file.db_path());
        let categories_path = utils::resolve(&root, &config_file.categories_path());
        debug!("Using database path: {}", db_path.display());

        let db = Db::open(&db_path).await?;
        db.initialize().await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            db_path,
            categories_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }

    pub fn config_version(&self) -> u8 {
        self.config_file.config_version
    }

    /// Reads the categories file, or returns the default categories if there is none.
    pub async fn categories(&self) -> Result<Categories> {
        Categories::load(&self.categories_path)
            .await
            .pub_result(ErrorType::Categories)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "db_path": "expenses.sqlite",
///   "categories_path": "/home/me/categories.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the SQLite store (optional, relative to the home directory or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    db_path: Option<PathBuf>,

    /// Path to the categories JSON file (optional, relative to the home directory or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categories_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            db_path: None,
            categories_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it was written by another
    /// application or a newer version of this one.
    async fn load(path: impl AsRef<Path>) -> Re<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Unsupported config_version {} in config file, the newest supported is {}",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Re<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(EXPENSES_SQLITE))
    }

    fn categories_path(&self) -> PathBuf {
        self.categories_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(CATEGORIES_JSON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses_home");

        let config = Config::create(&home, None, None).await.unwrap();

        assert!(config.config_path().is_file());
        assert!(config.db_path().is_file());
        assert_eq!(config.db_path(), config.root().join(EXPENSES_SQLITE));
        assert_eq!(config.categories_path(), config.root().join(CATEGORIES_JSON));
        assert_eq!(config.config_version(), CONFIG_VERSION);
    }

    #[tokio::test]
    async fn test_config_create_with_custom_paths() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let absolute_categories = dir.path().join("cats.json");

        let config = Config::create(
            &home,
            Some(PathBuf::from("data.sqlite")),
            Some(absolute_categories.clone()),
        )
        .await
        .unwrap();

        assert_eq!(config.db_path(), config.root().join("data.sqlite"));
        assert!(config.db_path().is_file());
        assert_eq!(config.categories_path(), absolute_categories);

        // A later load picks the same paths up from config.json
        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.db_path(), config.db_path());
        assert_eq!(loaded.categories_path(), config.categories_path());
    }

    #[tokio::test]
    async fn test_config_load_without_config_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("fresh");

        let config = Config::load(&home).await.unwrap();

        assert!(!config.config_path().exists());
        assert!(config.db_path().is_file());
        assert_eq!(config.db_path(), config.root().join(EXPENSES_SQLITE));
    }

    #[tokio::test]
    async fn test_config_load_keeps_existing_data() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let config = Config::create(&home, None, None).await.unwrap();
        config
            .db()
            .add_expense(&crate::model::NewExpense::new("2024-01-01", 5.0, "Food"))
            .await
            .unwrap();

        let again = Config::create(&home, None, None).await.unwrap();
        assert_eq!(again.db().count_expenses().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_config_categories_default_and_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), None, None).await.unwrap();
        assert_eq!(config.categories().await.unwrap().len(), 10);

        utils::write(config.categories_path(), r#"{"categories": ["Rent"]}"#)
            .await
            .unwrap();
        assert_eq!(
            config.categories().await.unwrap(),
            Categories::new(["Rent"])
        );

        utils::write(config.categories_path(), "nope").await.unwrap();
        let err = config.categories().await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Categories);
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original = ConfigFile {
            db_path: Some(PathBuf::from("x.sqlite")),
            categories_path: Some(PathBuf::from("/etc/categories.json")),
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();

        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(&config_path, r#"{"app_name": "expenses", "config_version": 1}"#)
            .await
            .unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.db_path(), PathBuf::from(EXPENSES_SQLITE));
        assert_eq!(config.categories_path(), PathBuf::from(CATEGORIES_JSON));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(&config_path, r#"{"app_name": "budget", "config_version": 1}"#)
            .await
            .unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_load_with_bad_config_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        utils::write(
            temp_dir.path().join(CONFIG_JSON),
            r#"{"app_name": "expenses", "config_version": 99}"#,
        )
        .await
        .unwrap();

        let err = Config::load(temp_dir.path()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("db_path"));
        assert!(!json.contains("categories_path"));
    }
}
