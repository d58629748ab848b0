//! Add command handler.

use crate::args::AddArgs;
use crate::commands::{Out, Status};
use crate::error::{Error, ErrorType};
use crate::model::NewExpense;
use crate::{Config, Result};
use anyhow::anyhow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The structured result of a successful `add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AddedExpense {
    pub status: Status,
    /// The id assigned to the new expense.
    pub id: i64,
}

/// Records a new expense in the local SQLite database.
///
/// # Arguments
///
/// - `config` - The application configuration containing the database connection.
/// - `args` - The expense to record. `date`, `amount` and `category` are required; an omitted
///   `subcategory` or `note` is stored as an empty string.
///
/// # Returns
///
/// On success, returns an `Out` containing a message and the newly assigned id.
///
/// # Errors
///
/// - `ErrorType::InvalidInput` if `category` is empty.
/// - `ErrorType::ReadOnly` if the database cannot be written to.
/// - `ErrorType::StorageFault` if any other database operation fails.
pub async fn add_expense(config: Config, args: AddArgs) -> Result<Out<AddedExpense>> {
    if args.category.trim().is_empty() {
        return Err(Error::new(
            ErrorType::InvalidInput,
            anyhow!("Cannot add expense: category must not be empty"),
        ));
    }

    let expense = NewExpense {
        date: args.date,
        amount: args.amount,
        category: args.category,
        subcategory: args.subcategory.unwrap_or_default(),
        note: args.note.unwrap_or_default(),
    };

    let id = config.db().add_expense(&expense).await?;

    let message = format!("Expense added successfully with ID: {id}");
    Ok(Out::new(
        message,
        AddedExpense {
            status: Status::Success,
            id,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    fn args(date: &str, amount: f64, category: &str) -> AddArgs {
        AddArgs {
            date: date.to_string(),
            amount,
            category: category.to_string(),
            subcategory: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_add_expense_success() {
        let env = TestEnv::new().await;

        let mut a = args("2024-01-05", 12.50, "Food");
        a.subcategory = Some("Groceries".into());
        a.note = Some("weekly shop".into());
        let out = add_expense(env.config(), a).await.unwrap();

        assert!(out.message().contains("Expense added successfully"));
        let added = out.structure().unwrap();
        assert_eq!(added.status, Status::Success);

        let listed = env
            .config()
            .db()
            .list_expenses("2024-01-05", "2024-01-05")
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, added.id);
        assert_eq!(listed[0].subcategory, "Groceries");
        assert_eq!(listed[0].note, "weekly shop");
    }

    #[tokio::test]
    async fn test_add_expense_ids_increase() {
        let env = TestEnv::new().await;
        let first = add_expense(env.config(), args("2024-01-05", 1.0, "Food"))
            .await
            .unwrap();
        let second = add_expense(env.config(), args("2024-01-01", 2.0, "Food"))
            .await
            .unwrap();
        assert!(first.structure().unwrap().id < second.structure().unwrap().id);
    }

    #[tokio::test]
    async fn test_add_expense_rejects_empty_category() {
        let env = TestEnv::new().await;
        let err = add_expense(env.config(), args("2024-01-05", 1.0, "  "))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidInput);
        assert_eq!(env.config().db().count_expenses().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_added_expense_json_shape() {
        let added = AddedExpense {
            status: Status::Success,
            id: 7,
        };
        let json = serde_json::to_value(&added).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "id": 7}));
    }
}
