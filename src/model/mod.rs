//! Types that represent the core data model, such as `Expense` and `Categories`.
mod category;
mod expense;

pub use category::{Categories, DEFAULT_CATEGORIES};
pub use expense::{CategorySummary, Expense, NewExpense};
