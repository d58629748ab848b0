//! The MCP tools: one per expense operation.

use crate::args::{AddArgs, ListArgs, SummarizeArgs};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::ExpenseServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl ExpenseServer {
    /// Add a new expense entry to the database.
    ///
    /// # Parameters
    ///
    /// - `date`: The date of the expense as `YYYY-MM-DD`. **Required.**
    /// - `amount`: The amount spent. **Required.**
    /// - `category`: A non-empty category label, e.g. `Food & Dining`. See the
    ///   `expense:///categories` resource for suggestions. **Required.**
    /// - `subcategory`: An optional refinement of the category.
    /// - `note`: An optional free-form note.
    ///
    /// # Returns
    ///
    /// On success, a message and `{"status": "success", "id": <new id>}`.
    ///
    /// # Errors
    ///
    /// If the database is not writable the error type is `read_only`; check the permissions of
    /// the database file.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "date": "2024-01-05",
    ///   "amount": 12.5,
    ///   "category": "Food & Dining",
    ///   "subcategory": "Groceries"
    /// }
    /// ```
    #[tool]
    async fn add_expense(
        &self,
        Parameters(args): Parameters<AddArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: add_expense called for {} on {}", args.category, args.date);
        let config = (*self.config).clone();
        let out = commands::add_expense(config, args).await;
        tool_result(out)
    }

    /// List expenses between start_date and end_date, both inclusive, ordered by date.
    ///
    /// Dates are compared as text, so use the `YYYY-MM-DD` form. If `start_date` is after
    /// `end_date` the result is empty.
    ///
    /// # Returns
    ///
    /// A message and a JSON array of expenses, each with `id`, `date`, `amount`, `category`,
    /// `subcategory` and `note`.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "start_date": "2024-01-01",
    ///   "end_date": "2024-01-31"
    /// }
    /// ```
    #[tool]
    async fn list_expenses(
        &self,
        Parameters(args): Parameters<ListArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            "MCP: list_expenses called for {} to {}",
            args.start_date, args.end_date
        );
        let config = (*self.config).clone();
        let out = commands::list_expenses(config, args).await;
        tool_result(out)
    }

    /// Summarize expenses by category within an inclusive date range.
    ///
    /// Returns one entry per category that has expenses in the range, with the total amount and
    /// the number of expenses, ordered by total amount, largest first. Pass `category` to
    /// summarize a single category; it must match exactly, including case.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "start_date": "2024-01-01",
    ///   "end_date": "2024-01-31",
    ///   "category": "Travel"
    /// }
    /// ```
    #[tool]
    async fn summarize(
        &self,
        Parameters(args): Parameters<SummarizeArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            "MCP: summarize called for {} to {}",
            args.start_date, args.end_date
        );
        let config = (*self.config).clone();
        let out = commands::summarize(config, args).await;
        tool_result(out)
    }
}
