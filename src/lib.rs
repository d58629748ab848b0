//! A small personal expense tracker backed by a local SQLite file.
//!
//! Expenses can be recorded, listed by date range and totalled by category, either from the
//! `expenses` command line or from an AI agent through the MCP server (`expenses mcp`).

pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
mod mcp;
pub mod model;
#[cfg(test)]
mod test;
mod utils;

pub use config::Config;
pub use error::{Error, ErrorType, Result};
