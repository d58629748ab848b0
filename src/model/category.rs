//! The reference list of category names.
//!
//! The list is read from a JSON file of the form `{"categories": ["Food", ...]}`. When the file
//! does not exist a built-in list is used instead. Expenses are not validated against this list.

use crate::error::Re;
use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// The categories served when no categories file exists.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Travel",
    "Education",
    "Business",
    "Other",
];

/// A list of category names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Categories {
    categories: Vec<String>,
}

impl Default for Categories {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Categories {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            categories: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads the categories file at `path`, falling back to [`DEFAULT_CATEGORIES`] when it does
    /// not exist.
    pub(crate) async fn load(path: &Path) -> Re<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(
                    "No categories file at {}, using the defaults",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Unable to read the categories file at {}", path.display())
                })
            }
        };
        serde_json::from_str(&content)
            .with_context(|| format!("Unable to parse the categories file at {}", path.display()))
    }

    pub fn names(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
