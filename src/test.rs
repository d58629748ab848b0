//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::NewExpense;
use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up an expenses home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("expenses");
        let config = Config::create(&root, None, None).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Inserts three January 2024 expenses: Food 12.50 on the 5th, Food 7.25 on the 10th and
    /// Travel 100.00 on the 20th. Returns the assigned ids in insertion order.
    pub async fn insert_scenario(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        for expense in [
            NewExpense::new("2024-01-05", 12.50, "Food"),
            NewExpense::new("2024-01-10", 7.25, "Food"),
            NewExpense::new("2024-01-20", 100.0, "Travel"),
        ] {
            ids.push(self.config.db().add_expense(&expense).await.unwrap());
        }
        ids
    }

    /// Overwrites the categories file with `contents`.
    pub fn write_categories(&self, contents: &str) {
        std::fs::write(self.config.categories_path(), contents).unwrap();
    }
}
