//! The generic relational-access seam the engine writes through.
//!
//! Drivers implement [`SqlClient`] over a concrete database client and
//! [`Connector`] for the two connection phases: a server-level bootstrap
//! connection made before the target database is known to exist, and the
//! working connection to the target database itself.

use async_trait::async_trait;

use crate::config::ConnectionDescriptor;
use crate::event::Value;

/// A failure reported by the underlying database client.
///
/// The engine never inspects driver error types directly; drivers surface the
/// engine-reported classification codes here and the dialect catalog turns
/// them into a closed classification.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
    /// Five-character SQLSTATE, when the engine reported one.
    pub sqlstate: Option<String>,
    /// Engine-native error number, when the engine reported one.
    pub code: Option<u32>,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sqlstate: None,
            code: None,
        }
    }

    pub fn with_sqlstate(mut self, sqlstate: impl Into<String>) -> Self {
        self.sqlstate = Some(sqlstate.into());
        self
    }

    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }
}

/// One column discovered by table introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// The engine-reported data type spelling, e.g. `character varying`.
    pub data_type: String,
}

/// A live connection capable of executing statements and introspecting the
/// destination table.
#[async_trait]
pub trait SqlClient: Send {
    /// Executes a statement with positional parameters and returns the
    /// affected row count.
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, ClientError>;

    /// Whether a table with the given name exists in the connected database.
    async fn table_exists(&mut self, table: &str) -> Result<bool, ClientError>;

    /// Name and data type of each column of an existing table, in ordinal
    /// position order.
    async fn table_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>, ClientError>;

    /// Releases the connection. Implementations must tolerate repeated calls.
    async fn close(&mut self) -> Result<(), ClientError>;
}

/// Opens [`SqlClient`] connections for one engine.
#[async_trait]
pub trait Connector {
    type Client: SqlClient + 'static;

    /// Connects at the server level, before the target database is known to
    /// exist. Used only to issue `CREATE DATABASE`.
    async fn connect_server(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Self::Client, ClientError>;

    /// Connects to the target database.
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Self::Client, ClientError>;
}
