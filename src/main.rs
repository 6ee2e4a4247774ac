//! Snowflake MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to query Snowflake metadata, run validated SQL, and call Cortex AI
//! services.

use clap::Parser;
use snowflake_mcp_server::auth::AuthConfig;
use snowflake_mcp_server::client::SnowflakeClient;
use snowflake_mcp_server::config::{Config, TransportMode};
use snowflake_mcp_server::driver::RestDriver;
use snowflake_mcp_server::registry::ServiceRegistry;
use snowflake_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging (opt-in so stdio transport stays clean)
    if config.enable_logs {
        init_tracing(&config);
    }

    info!(
        transport = %config.transport,
        "Starting Snowflake MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Build the warehouse client. Invalid connection configuration is fatal:
    // the credentials come from the environment and nothing can repair them
    // at runtime.
    let driver = Arc::new(RestDriver::with_timeouts(
        config.connect_timeout_duration(),
        config.request_timeout_duration(),
    )?);

    let client = match SnowflakeClient::new(driver, config.connection_params()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "Failed to initialize Snowflake client");
            eprintln!("Error: {e}");
            eprintln!();
            eprintln!("Set the required environment variables:");
            eprintln!("  SNOWFLAKE_USER, SNOWFLAKE_PASSWORD, SNOWFLAKE_ACCOUNT,");
            eprintln!("  SNOWFLAKE_DATABASE, SNOWFLAKE_WAREHOUSE");
            eprintln!();
            eprintln!("Optional: SNOWFLAKE_SCHEMA, SNOWFLAKE_ROLE, SNOWFLAKE_REGION,");
            eprintln!("          SNOWFLAKE_SERVICE_CONFIG (Cortex service registry path)");
            std::process::exit(1);
        }
    };

    // Load the Cortex service registry; a missing or malformed file yields an
    // empty registry and the server still starts.
    let registry = Arc::new(ServiceRegistry::load(&config.service_config));
    info!(
        search_services = registry.search_services().len(),
        analyst_services = registry.analyst_services().len(),
        "Cortex service registry loaded"
    );

    // Probe the connection at startup; failure is logged, not fatal.
    if client.test_connection().await {
        info!("Snowflake connection successful");
    } else {
        warn!("Snowflake connection test failed");
    }

    // Run the appropriate transport
    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            let transport = StdioTransport::new(client, registry);
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            let auth = AuthConfig::from_tokens(config.auth_tokens.clone())?;
            let transport = HttpTransport::new(
                client,
                registry,
                auth,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
