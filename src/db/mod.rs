//! This module is responsible for reading, writing and managing the SQLite expense store.
//!
//! Every operation checks a connection out of the pool for a single statement and returns it
//! before the operation completes. The store runs in WAL journal mode so that readers are not
//! blocked by a writer; concurrent writers are serialized by SQLite itself.

mod migrations;

use crate::error::{Error, ErrorType, IntoResult, Re};
use crate::model::{CategorySummary, Expense, NewExpense};
use crate::Result;
use anyhow::{anyhow, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The primary SQLite result code for an attempt to write to a read-only database.
const SQLITE_READONLY: i64 = 8;

/// A handle to the expense store. Cloning is cheap and clones share the same connection pool.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
    path: PathBuf,
    read_only: Arc<AtomicBool>,
}

impl Db {
    /// Opens (creating if necessary) the SQLite file at `path`.
    ///
    /// This does not touch the schema, call [`Db::initialize`] before using the store. A file
    /// whose permissions are read-only is opened read-only and the store is flagged as such.
    pub(crate) async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file_is_read_only = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata.permissions().readonly(),
            Err(_) => false,
        };

        let options = SqliteConnectOptions::new().filename(&path);
        let options = if file_is_read_only {
            options.read_only(true)
        } else {
            options
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| {
                storage_error(
                    &path,
                    e,
                    format!("Unable to open the expense store at {}", path.display()),
                )
            })?;

        debug!(
            "Opened the expense store at {} (read-only: {file_is_read_only})",
            path.display()
        );
        Ok(Self {
            pool,
            path,
            read_only: Arc::new(AtomicBool::new(file_is_read_only)),
        })
    }

    /// Brings the schema up to date and checks whether the store can be written to.
    ///
    /// This is idempotent: running it against an initialized store changes nothing. A store that
    /// turns out to be read-only is not an error here, but every later write will fail with
    /// `ErrorType::ReadOnly`.
    pub(crate) async fn initialize(&self) -> Result<()> {
        self.bootstrap_schema_version().await?;
        let current = self
            .schema_version()
            .await
            .pub_result(ErrorType::StorageFault)?;
        migrations::run(&self.pool, current, migrations::LATEST_VERSION)
            .await
            .map_err(|e| self.classify_anyhow(e))?;

        if !self.is_read_only() && !self.probe_write().await? {
            warn!("{}", self.read_only_message());
            self.read_only.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    pub(crate) fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    /// Inserts `expense` and returns its newly assigned `id`.
    pub(crate) async fn add_expense(&self, expense: &NewExpense) -> Result<i64> {
        if self.is_read_only() {
            return Err(Error::new(
                ErrorType::ReadOnly,
                anyhow!(self.read_only_message()),
            ));
        }
        let result = sqlx::query(
            "INSERT INTO expenses (date, amount, category, subcategory, note) \
            VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&expense.date)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.subcategory)
        .bind(&expense.note)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error(&self.path, e, "Unable to insert the expense"))?;
        Ok(result.last_insert_rowid())
    }

    /// Returns the expenses whose `date` lies between `start_date` and `end_date` inclusive,
    /// ordered by date. Dates are compared as strings.
    pub(crate) async fn list_expenses(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Expense>> {
        sqlx::query_as::<_, Expense>(
            "SELECT id, date, amount, category, \
            COALESCE(subcategory, '') AS subcategory, COALESCE(note, '') AS note \
            FROM expenses WHERE date BETWEEN ? AND ? ORDER BY date ASC, id ASC",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(&self.path, e, "Unable to list expenses"))
    }

    /// Sums and counts the expenses in the date range per category, largest total first. When
    /// `category` is given only that exact category is aggregated.
    pub(crate) async fn summarize(
        &self,
        start_date: &str,
        end_date: &str,
        category: Option<&str>,
    ) -> Result<Vec<CategorySummary>> {
        let mut sql = String::from(
            "SELECT category, SUM(amount) AS total_amount, COUNT(*) AS count \
            FROM expenses WHERE date BETWEEN ? AND ?",
        );
        if category.is_some() {
            sql.push_str(" AND category = ?");
        }
        sql.push_str(" GROUP BY category ORDER BY total_amount DESC, category ASC");

        let mut query = sqlx::query_as::<_, CategorySummary>(&sql)
            .bind(start_date)
            .bind(end_date);
        if let Some(category) = category {
            query = query.bind(category);
        }
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error(&self.path, e, "Unable to summarize expenses"))
    }

    /// Returns the number of rows in the expenses table.
    #[cfg(test)]
    pub(crate) async fn count_expenses(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM expenses")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error(&self.path, e, "Unable to count expenses"))?;
        Ok(row.0)
    }

    #[cfg(test)]
    pub(crate) async fn close(&self) {
        self.pool.close().await;
    }

    /// Creates the `schema_version` table, at version 0, if it does not exist yet.
    async fn bootstrap_schema_version(&self) -> Result<()> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(&self.path, e, "Unable to read the schema"))?;
        if row.0 > 0 {
            return Ok(());
        }

        debug!("Creating the schema_version table");
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error(&self.path, e, "Unable to begin a transaction"))?;
        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error(&self.path, e, "Unable to create schema_version"))?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error(&self.path, e, "Unable to set the schema version"))?;
        tx.commit()
            .await
            .map_err(|e| storage_error(&self.path, e, "Unable to commit schema_version"))
    }

    async fn schema_version(&self) -> Re<i32> {
        let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
            .fetch_one(&self.pool)
            .await
            .context("Unable to read the schema version")?;
        Ok(row.0.unwrap_or(0))
    }

    /// Attempts an insert inside a transaction that is always rolled back. Returns `false` when
    /// the store refused the write because it is read-only.
    async fn probe_write(&self) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error(&self.path, e, "Unable to begin a transaction"))?;
        let outcome = sqlx::query(
            "INSERT INTO expenses (date, amount, category) VALUES ('2000-01-01', 0, 'probe')",
        )
        .execute(&mut *tx)
        .await;
        tx.rollback()
            .await
            .map_err(|e| storage_error(&self.path, e, "Unable to roll back the write probe"))?;

        match outcome {
            Ok(_) => Ok(true),
            Err(e) if classify(&e) == ErrorType::ReadOnly => Ok(false),
            Err(e) => Err(storage_error(&self.path, e, "The write probe failed")),
        }
    }

    fn read_only_message(&self) -> String {
        read_only_message(&self.path)
    }

    /// Classifies an error from the migration runner by the SQLite error underneath it, if any.
    fn classify_anyhow(&self, e: anyhow::Error) -> Error {
        let error_type = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<sqlx::Error>())
            .map(classify)
            .unwrap_or(ErrorType::StorageFault);
        Error::new(error_type, e)
    }
}

/// Maps a SQLite failure onto the public error taxonomy using its result code.
fn classify(e: &sqlx::Error) -> ErrorType {
    match e {
        sqlx::Error::Database(db_error) => {
            // sqlx reports the extended result code, the low byte is the primary code
            let primary = db_error
                .code()
                .and_then(|code| code.parse::<i64>().ok())
                .map(|code| code & 0xff);
            if primary == Some(SQLITE_READONLY) {
                ErrorType::ReadOnly
            } else {
                ErrorType::StorageFault
            }
        }
        sqlx::Error::Io(io) if io.kind() == ErrorKind::PermissionDenied => ErrorType::ReadOnly,
        _ => ErrorType::StorageFault,
    }
}

fn storage_error(path: &Path, e: sqlx::Error, context: impl Into<String>) -> Error {
    let error_type = classify(&e);
    let context = match error_type {
        ErrorType::ReadOnly => read_only_message(path),
        _ => context.into(),
    };
    Error::new(error_type, anyhow::Error::new(e).context(context))
}

fn read_only_message(path: &Path) -> String {
    format!(
        "The expense store at {} is read-only. Check file permissions.",
        path.display()
    )
}
