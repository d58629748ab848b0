//! Summarize command handler.

use crate::args::SummarizeArgs;
use crate::commands::{plural, Out, Status};
use crate::model::CategorySummary;
use crate::{Config, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The structured result of a successful `summarize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub status: Status,
    /// One entry per category, largest total first.
    pub summary: Vec<CategorySummary>,
}

/// Totals and counts the expenses within `start_date..=end_date` by category, largest total
/// first. When a category is given, only expenses in exactly that category are totaled.
///
/// Categories without any matching expense are left out rather than reported as zero.
pub async fn summarize(
    config: Config,
    args: SummarizeArgs,
) -> Result<Out<Summary>> {
    let category = args.category_filter();
    let summary = config
        .db()
        .summarize(&args.start_date, &args.end_date, category)
        .await?;

    let count = summary.len();
    let message = match category {
        Some(category) => format!(
            "Summarized {count} categor{} matching '{category}' between {} and {}",
            if count == 1 { "y" } else { "ies" },
            args.start_date,
            args.end_date
        ),
        None => {
            let expenses: i64 = summary.iter().map(|s| s.count).sum();
            format!(
                "Summarized {expenses} expense{} in {count} categor{} between {} and {}",
                plural(expenses as usize),
                if count == 1 { "y" } else { "ies" },
                args.start_date,
                args.end_date
            )
        }
    };
    Ok(Out::new(
        message,
        Summary {
            status: Status::Success,
            summary,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    fn args(category: Option<&str>) -> SummarizeArgs {
        SummarizeArgs {
            start_date: "2024-01-01".into(),
            end_date: "2024-01-31".into(),
            category: category.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_summarize_scenario() {
        let env = TestEnv::new().await;
        env.insert_scenario().await;

        let out = summarize(env.config(), args(None)).await.unwrap();
        assert_eq!(
            out.message(),
            "Summarized 3 expenses in 2 categories between 2024-01-01 and 2024-01-31"
        );
        let summary = &out.structure().unwrap().summary;
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].category, "Travel");
        assert_eq!(summary[0].total_amount, 100.0);
        assert_eq!(summary[0].count, 1);
        assert_eq!(summary[1].category, "Food");
        assert_eq!(summary[1].total_amount, 19.75);
        assert_eq!(summary[1].count, 2);
    }

    #[tokio::test]
    async fn test_summarize_filter_does_not_change_totals() {
        let env = TestEnv::new().await;
        env.insert_scenario().await;

        let all = summarize(env.config(), args(None)).await.unwrap();
        let food = summarize(env.config(), args(Some("Food"))).await.unwrap();

        let food_all = all
            .structure()
            .unwrap()
            .summary
            .iter()
            .find(|s| s.category == "Food")
            .cloned()
            .unwrap();
        assert_eq!(food.structure().unwrap().summary, vec![food_all]);
        assert!(food.message().contains("matching 'Food'"));
    }

    #[tokio::test]
    async fn test_summarize_empty_category_means_all() {
        let env = TestEnv::new().await;
        env.insert_scenario().await;

        let out = summarize(env.config(), args(Some(""))).await.unwrap();
        assert_eq!(out.structure().unwrap().summary.len(), 2);
    }

    #[tokio::test]
    async fn test_summarize_nothing_in_range() {
        let env = TestEnv::new().await;
        env.insert_scenario().await;

        let mut a = args(None);
        a.start_date = "2025-01-01".into();
        a.end_date = "2025-12-31".into();
        let out = summarize(env.config(), a).await.unwrap();
        assert!(out.structure().unwrap().summary.is_empty());
    }
}
