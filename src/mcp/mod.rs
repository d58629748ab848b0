//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides an MCP server that exposes the expense operations as tools and the
//! category list as a resource for AI agent integration. The server communicates via JSON-RPC
//! over stdio.

mod mcp_utils;
mod tools;

use crate::Config;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{
    AnnotateAble, Implementation, ListResourcesResult, PaginatedRequestParam, ProtocolVersion,
    RawResource, ReadResourceRequestParam, ReadResourceResult, ResourceContents,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::ErrorData as McpError;
use rmcp::{tool_handler, RoleServer, ServerHandler, ServiceExt};
use std::sync::Arc;
use tracing::info;

/// The URI of the categories resource.
pub(crate) const CATEGORIES_URI: &str = "expense:///categories";

/// The expenses MCP server.
///
/// This server exposes the expense store as MCP tools and resources.
#[derive(Debug, Clone)]
pub struct ExpenseServer {
    config: Arc<Config>,
    tool_router: ToolRouter<ExpenseServer>,
}

impl ExpenseServer {
    /// Creates a new ExpenseServer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    /// Serializes the category list, falling back to an error document so that a broken
    /// categories file is visible to the agent instead of failing the request.
    async fn categories_json(&self) -> String {
        let categories = match self.config.categories().await {
            Ok(categories) => categories,
            Err(e) => {
                return serde_json::json!({ "error": format!("Could not load categories: {e}") })
                    .to_string()
            }
        };
        match serde_json::to_string_pretty(&categories) {
            Ok(json) => json,
            Err(e) => serde_json::json!({ "error": format!("Could not serialize categories: {e}") })
                .to_string(),
        }
    }
}

#[tool_handler]
impl ServerHandler for ExpenseServer {
    /// Returns server information sent to the MCP client during initialization.
    ///
    /// The `instructions` field is shown to the AI to help it understand when and how to use this
    /// server's tools.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "expenses".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(include_str!("docs/INTRO.md").into()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut categories = RawResource::new(CATEGORIES_URI, "categories");
        categories.description = Some("Suggested expense category names".into());
        categories.mime_type = Some("application/json".into());
        Ok(ListResourcesResult::with_all_items(vec![
            categories.no_annotation()
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        if request.uri != CATEGORIES_URI {
            return Err(McpError::resource_not_found(
                format!("Unknown resource '{}'", request.uri),
                None,
            ));
        }
        info!("MCP: categories resource read");
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(
                self.categories_json().await,
                CATEGORIES_URI,
            )],
        })
    }
}

/// Transport type for the MCP server.
#[derive(Debug, Default)]
pub(crate) enum Io {
    #[default]
    Stdio,
    /// Mock transport for testing - holds one end of a duplex channel.
    #[cfg(test)]
    Mock(tokio::io::DuplexStream),
}

/// Runs the MCP server with stdio transport or mock transport. This function starts the MCP server
/// and blocks until the client disconnects or an error occurs.
///
/// # Arguments
/// - `config`: The `Config` object, with an initialized store
/// - `io`: Whether we are using stdio as the transport or using mock io for testing
///
pub(crate) async fn run_server(config: Config, io: Io) -> crate::Result<()> {
    use crate::error::{ErrorType, IntoResult};
    let server = ExpenseServer::new(config);
    info!("Starting MCP server...");

    let service = match io {
        Io::Stdio => server
            .serve(stdio())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
        #[cfg(test)]
        Io::Mock(stream) => server
            .serve(stream)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
    };

    info!("MCP server running, waiting for requests...");

    // Wait for the server to complete (client disconnects or error)
    service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))
        .pub_result(ErrorType::Service)?;

    info!("MCP server shut down");
    Ok(())
}
