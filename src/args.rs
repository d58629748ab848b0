//! These structs provide the CLI interface for the expenses CLI. The argument structs for the
//! expense operations double as MCP tool parameters, so their doc comments appear both in
//! `--help` and in the JSON schemas shown to AI agents.

use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

/// expenses: a local expense tracker.
///
/// Expenses are recorded in a SQLite database in the expenses home directory. They can be added,
/// listed and summarized by category from the command line, or by an AI agent through the mcp
/// subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory, write its config.json and initialize the database.
    ///
    /// Running this is optional: every other command falls back to default settings when there
    /// is no config.json. Use it to keep the database or the categories file somewhere else.
    Init(InitArgs),
    /// Record a new expense.
    Add(AddArgs),
    /// List the expenses within an inclusive date range.
    List(ListArgs),
    /// Total the expenses within an inclusive date range by category.
    Summarize(SummarizeArgs),
    /// Print the list of expense categories.
    Categories,
    /// Run the MCP server over stdio for use by AI agents.
    Mcp,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the database and configuration are held. Defaults to a directory named
    /// expenses in the system temp directory, which is writable in restricted environments.
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Where to keep the SQLite database, relative to the home directory or absolute.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Where to find the categories JSON file, relative to the home directory or absolute.
    #[arg(long)]
    categories_path: Option<PathBuf>,
}

impl InitArgs {
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn categories_path(&self) -> Option<&Path> {
        self.categories_path.as_deref()
    }
}

/// Args for the `expenses add` command and the `add_expense` tool.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddArgs {
    /// The date of the expense as YYYY-MM-DD. On the command line this defaults to today.
    #[arg(long, default_value_t = crate::utils::today())]
    pub date: String,

    /// The amount spent.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: f64,

    /// The category of the expense, e.g. "Food & Dining". See the categories resource for
    /// suggestions; any non-empty label is accepted.
    #[arg(long)]
    pub category: String,

    /// An optional refinement of the category, e.g. "Groceries".
    #[arg(long)]
    #[serde(default)]
    pub subcategory: Option<String>,

    /// An optional free-form note.
    #[arg(long)]
    #[serde(default)]
    pub note: Option<String>,
}

/// Args for the `expenses list` command and the `list_expenses` tool.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListArgs {
    /// The first date of the range as YYYY-MM-DD, inclusive.
    #[arg(long)]
    pub start_date: String,

    /// The last date of the range as YYYY-MM-DD, inclusive.
    #[arg(long)]
    pub end_date: String,
}

/// Args for the `expenses summarize` command and the `summarize` tool.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummarizeArgs {
    /// The first date of the range as YYYY-MM-DD, inclusive.
    #[arg(long)]
    pub start_date: String,

    /// The last date of the range as YYYY-MM-DD, inclusive.
    #[arg(long)]
    pub end_date: String,

    /// Only total this category. Matched exactly and case-sensitively. Omit (or leave empty) to
    /// total every category.
    #[arg(long)]
    #[serde(default)]
    pub category: Option<String>,
}

impl SummarizeArgs {
    /// The category filter, with an empty string treated as no filter.
    pub fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(std::env::temp_dir().join("expenses"))
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
