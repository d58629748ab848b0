use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the home directory and:
/// - Writes a `config.json` naming the database and categories file
/// - Creates and initializes the SQLite database, or brings an existing one up to date
///
/// # Arguments
/// - `expenses_home` - The home directory, e.g. `/tmp/expenses`
/// - `db_path` - Optional location of the database, relative to `expenses_home` or absolute
/// - `categories_path` - Optional location of the categories file, relative to `expenses_home`
///   or absolute
///
/// # Errors
/// - Returns an error if any file operation fails or the database cannot be initialized.
pub async fn init(
    expenses_home: &Path,
    db_path: Option<&Path>,
    categories_path: Option<&Path>,
) -> Result<Out<()>> {
    let config = Config::create(
        expenses_home,
        db_path.map(Path::to_path_buf),
        categories_path.map(Path::to_path_buf),
    )
    .await?;
    Ok(format!(
        "Initialized {} with database {}",
        config.root().display(),
        config.db_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let t = TempDir::new().unwrap();
        let home = t.path().join("home");
        let out = init(&home, Some(Path::new("my.sqlite")), None)
            .await
            .unwrap();
        assert!(out.message().starts_with("Initialized"));
        assert!(home.join("config.json").is_file());
        assert!(home.join("my.sqlite").is_file());

        // Running it again is harmless
        init(&home, Some(Path::new("my.sqlite")), None)
            .await
            .unwrap();
    }
}
