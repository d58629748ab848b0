//! List command handler.

use crate::args::ListArgs;
use crate::commands::{plural, Out, Status};
use crate::model::Expense;
use crate::{Config, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The structured result of a successful `list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListedExpenses {
    pub status: Status,
    /// The matching expenses, oldest first.
    pub expenses: Vec<Expense>,
}

/// Lists the expenses whose date lies within `start_date..=end_date`, oldest first.
///
/// Dates are compared as strings, which orders ISO-8601 dates correctly. A range whose start is
/// after its end is not an error; it simply matches nothing.
pub async fn list_expenses(config: Config, args: ListArgs) -> Result<Out<ListedExpenses>> {
    let expenses = config
        .db()
        .list_expenses(&args.start_date, &args.end_date)
        .await?;
    let count = expenses.len();
    let message = format!(
        "Found {count} expense{} between {} and {}",
        plural(count),
        args.start_date,
        args.end_date
    );
    Ok(Out::new(
        message,
        ListedExpenses {
            status: Status::Success,
            expenses,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    fn range(start: &str, end: &str) -> ListArgs {
        ListArgs {
            start_date: start.to_string(),
            end_date: end.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_expenses_scenario() {
        let env = TestEnv::new().await;
        env.insert_scenario().await;

        let out = list_expenses(env.config(), range("2024-01-01", "2024-01-31"))
            .await
            .unwrap();
        assert_eq!(
            out.message(),
            "Found 3 expenses between 2024-01-01 and 2024-01-31"
        );
        let dates: Vec<&str> = out
            .structure()
            .unwrap()
            .expenses
            .iter()
            .map(|e| e.date.as_str())
            .collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-10", "2024-01-20"]);
    }

    #[tokio::test]
    async fn test_list_expenses_reversed_range() {
        let env = TestEnv::new().await;
        env.insert_scenario().await;

        let out = list_expenses(env.config(), range("2024-01-31", "2024-01-01"))
            .await
            .unwrap();
        assert!(out.structure().unwrap().expenses.is_empty());
    }

    #[tokio::test]
    async fn test_list_expenses_single_day() {
        let env = TestEnv::new().await;
        env.insert_scenario().await;

        let out = list_expenses(env.config(), range("2024-01-10", "2024-01-10"))
            .await
            .unwrap();
        assert_eq!(out.message(), "Found 1 expense between 2024-01-10 and 2024-01-10");
        assert_eq!(out.structure().unwrap().expenses[0].amount, 7.25);
    }

    #[tokio::test]
    async fn test_listed_expenses_json_shape() {
        let env = TestEnv::new().await;
        env.insert_scenario().await;

        let out = list_expenses(env.config(), range("2024-01-20", "2024-01-20"))
            .await
            .unwrap();
        let json = serde_json::to_value(out.structure().unwrap()).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["expenses"].as_array().unwrap().len(), 1);
        assert_eq!(json["expenses"][0]["category"], "Travel");
    }
}
