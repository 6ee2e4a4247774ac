//! Snowflake MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools and resources for
//! AI assistants to interact with Snowflake: warehouse metadata listings,
//! validated SQL execution, and the Cortex AI services (Complete, Search,
//! Analyst).

pub mod auth;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod mcp;
pub mod models;
pub mod registry;
pub mod tools;
pub mod transport;
pub mod validate;

pub use client::SnowflakeClient;
pub use config::Config;
pub use error::{SnowflakeError, SnowflakeResult};
pub use mcp::SnowflakeService;
pub use registry::ServiceRegistry;
