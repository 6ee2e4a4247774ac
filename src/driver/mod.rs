//! Warehouse driver abstraction.
//!
//! The connection machinery itself is an external concern: the client only
//! needs "open a connection, run a statement, close". These traits form that
//! seam, with [`rest::RestDriver`] as the production implementation and mock
//! drivers in the test suite.

pub mod rest;

pub use rest::RestDriver;

use crate::models::{ConnectionParams, ParamValue, StatementOutput};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors surfaced by a warehouse driver.
///
/// The client maps these onto its own taxonomy: `Authentication` becomes an
/// authentication error, other connect failures become connection errors, and
/// statement failures become query errors.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Connect(String),

    #[error("{0}")]
    Statement(String),
}

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Opens warehouse connections.
#[async_trait]
pub trait WarehouseDriver: Send + Sync {
    /// Open a new connection for a single operation.
    async fn connect(
        &self,
        params: &ConnectionParams,
    ) -> DriverResult<Box<dyn WarehouseConnection>>;
}

/// A live warehouse connection.
///
/// One connection serves one client operation; callers close it on every exit
/// path (close is best-effort and must not fail).
#[async_trait]
pub trait WarehouseConnection: Send {
    /// Execute a single statement and fetch all rows.
    async fn execute(
        &mut self,
        sql: &str,
        params: &BTreeMap<String, ParamValue>,
    ) -> DriverResult<StatementOutput>;

    /// Release the connection.
    async fn close(self: Box<Self>);
}
