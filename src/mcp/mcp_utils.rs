use crate::commands::{Out, Status};
use crate::error::ErrorType;
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{error, warn};

/// The structured body of a failed tool call.
#[derive(Debug, Clone, Serialize)]
pub(super) struct ErrorReply {
    status: Status,
    error_type: ErrorType,
    message: String,
}

impl From<&crate::Error> for ErrorReply {
    fn from(e: &crate::Error) -> Self {
        Self {
            status: Status::Error,
            error_type: e.error_type(),
            message: e.message(),
        }
    }
}

pub(super) fn to_content<T>(out: Out<T>) -> Vec<Content>
where
    T: Debug + Clone + Serialize,
{
    let mut content = vec![Content::text(out.message())];
    if let Some(object) = out.structure() {
        match Content::json(object) {
            Ok(json) => content.push(json),
            Err(e) => error!("Unable to serialize JSON output: {e}"),
        };
    }
    content
}

pub(super) fn error_content(e: &crate::Error) -> Vec<Content> {
    let mut content = vec![Content::text(e.to_string())];
    match Content::json(ErrorReply::from(e)) {
        Ok(json) => content.push(json),
        Err(e) => error!("Unable to serialize JSON error output: {e}"),
    };
    content
}

pub(super) fn tool_result<T>(result: crate::Result<Out<T>>) -> Result<CallToolResult, ErrorData>
where
    T: Debug + Clone + Serialize,
{
    Ok(match result {
        Ok(out) => CallToolResult::success(to_content(out)),
        Err(e) => {
            warn!("Tool call failed ({}): {e}", e.error_type());
            CallToolResult::error(error_content(&e))
        }
    })
}
