use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single expense as stored in the `expenses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
#[serde(rename_all = "snake_case")]
pub struct Expense {
    /// Assigned by the store on insert. Strictly increasing and never reused.
    pub id: i64,
    /// The date of the expense, conventionally `YYYY-MM-DD`. Stored verbatim.
    pub date: String,
    /// The amount spent. No currency is implied and the sign is not checked.
    pub amount: f64,
    /// A free-form category label, e.g. `Food & Dining`.
    pub category: String,
    /// An optional refinement of `category`. Empty when absent.
    pub subcategory: String,
    /// An optional free-form note. Empty when absent.
    pub note: String,
}

/// An expense that has not yet been assigned an `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub subcategory: String,
    pub note: String,
}

impl NewExpense {
    pub fn new(date: impl Into<String>, amount: f64, category: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            amount,
            category: category.into(),
            subcategory: String::new(),
            note: String::new(),
        }
    }

    pub fn subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = subcategory.into();
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Per-category totals over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
#[serde(rename_all = "snake_case")]
pub struct CategorySummary {
    pub category: String,
    /// The sum of `amount` over the matching expenses.
    pub total_amount: f64,
    /// The number of matching expenses.
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_expense_defaults_optional_fields_to_empty() {
        let e = NewExpense::new("2024-01-05", 12.5, "Food");
        assert_eq!(e.subcategory, "");
        assert_eq!(e.note, "");

        let e = e.subcategory("Groceries").note("weekly shop");
        assert_eq!(e.subcategory, "Groceries");
        assert_eq!(e.note, "weekly shop");
    }

    #[test]
    fn test_summary_serializes_snake_case() {
        let s = CategorySummary {
            category: "Food".into(),
            total_amount: 19.75,
            count: 2,
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["total_amount"], 19.75);
        assert_eq!(json["count"], 2);
    }
}
