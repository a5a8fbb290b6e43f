//! The connection descriptor consumed from the collaborator layer.
//!
//! A descriptor is immutable once built and owned exclusively by the engine
//! instance it configures. The builder validates identifiers up front so a
//! malformed database or table name fails before anything connects.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{ident, Error, Result};

/// The closed set of supported relational engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbEngine {
    PostgreSql,
    MySql,
}

impl DbEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbEngine::PostgreSql => "postgresql",
            DbEngine::MySql => "mysql",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DbEngine::PostgreSql => 5432,
            DbEngine::MySql => 3306,
        }
    }
}

impl fmt::Display for DbEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbEngine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "postgresql" | "postgres" => Ok(DbEngine::PostgreSql),
            "mysql" => Ok(DbEngine::MySql),
            other => Err(Error::Config(format!(
                "unsupported database engine `{other}`"
            ))),
        }
    }
}

/// TLS settings for the outbound connection.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Path to a PEM root certificate to trust in addition to the system
    /// store.
    pub ca_cert: Option<PathBuf>,
}

/// Everything needed to reach the destination table.
#[derive(Clone)]
pub struct ConnectionDescriptor {
    pub engine: DbEngine,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub table: String,
    pub tls: Option<TlsOptions>,
    /// Overrides the dialect's default identifier-quoting policy.
    pub quote_identifiers: Option<bool>,
}

impl ConnectionDescriptor {
    pub fn builder(engine: DbEngine) -> Builder {
        Builder::new(engine)
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("tls", &self.tls)
            .field("quote_identifiers", &self.quote_identifiers)
            .finish()
    }
}

/// Builder for [`ConnectionDescriptor`].
#[derive(Debug, Clone)]
pub struct Builder {
    engine: DbEngine,
    host: Option<String>,
    port: Option<u16>,
    username: String,
    password: String,
    database: Option<String>,
    table: Option<String>,
    tls: Option<TlsOptions>,
    quote_identifiers: Option<bool>,
}

impl Builder {
    fn new(engine: DbEngine) -> Self {
        Self {
            engine,
            host: None,
            port: None,
            username: String::new(),
            password: String::new(),
            database: None,
            table: None,
            tls: None,
            quote_identifiers: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Defaults to the engine's well-known port when not set.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn tls(mut self, tls: TlsOptions) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn quote_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = Some(quote);
        self
    }

    pub fn build(self) -> Result<ConnectionDescriptor> {
        let host = self
            .host
            .ok_or_else(|| Error::Config("missing host".to_string()))?;
        let database = self
            .database
            .ok_or_else(|| Error::Config("missing database name".to_string()))?;
        let table = self
            .table
            .ok_or_else(|| Error::Config("missing table name".to_string()))?;

        ident::validate(&database, "database name")?;
        ident::validate(&table, "table name")?;

        Ok(ConnectionDescriptor {
            port: self.port.unwrap_or_else(|| self.engine.default_port()),
            engine: self.engine,
            host,
            username: self.username,
            password: self.password,
            database,
            table,
            tls: self.tls,
            quote_identifiers: self.quote_identifiers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_engine_defaults() {
        let descriptor = ConnectionDescriptor::builder(DbEngine::PostgreSql)
            .host("localhost")
            .database("pipeline")
            .table("events")
            .build()
            .unwrap();
        assert_eq!(descriptor.port, 5432);
        assert!(descriptor.tls.is_none());
        assert_eq!(descriptor.quote_identifiers, None);
    }

    #[test]
    fn builder_rejects_unsafe_names() {
        let err = ConnectionDescriptor::builder(DbEngine::MySql)
            .host("localhost")
            .database("pipeline")
            .table("events; drop table x")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("table name"));
    }

    #[test]
    fn engine_identifiers_parse() {
        assert_eq!("postgresql".parse::<DbEngine>().unwrap(), DbEngine::PostgreSql);
        assert_eq!("postgres".parse::<DbEngine>().unwrap(), DbEngine::PostgreSql);
        assert_eq!("mysql".parse::<DbEngine>().unwrap(), DbEngine::MySql);
        assert!("oracle".parse::<DbEngine>().is_err());
    }

    #[test]
    fn debug_redacts_the_password() {
        let descriptor = ConnectionDescriptor::builder(DbEngine::PostgreSql)
            .host("localhost")
            .username("ingest")
            .password("hunter2")
            .database("pipeline")
            .table("events")
            .build()
            .unwrap();
        let rendered = format!("{descriptor:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
