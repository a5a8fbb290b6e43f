use rowsink_core::client::{Connector, SqlClient};
use rowsink_core::config::ConnectionDescriptor;
use rowsink_core::event::Event;
use rowsink_core::flatten::{self, FlatColumn};
use rowsink_core::schema::{EventSchema, ValueType};
use rowsink_core::{Error, Result};
use rowsink_sql::{Dialect, ErrorClass, Serializer, Statement};
use tracing::{debug, info, warn};

use crate::statement::PreparedInsert;
use crate::table::TableState;

/// Maps pipeline events onto rows of a single relational table.
///
/// One engine instance owns one connection and one cached INSERT template.
/// It is built for sequential, single-writer use: concurrent `save` calls on
/// the same instance are not supported and must be serialized by the caller,
/// typically by giving each active sink task its own instance.
pub struct MappingEngine {
    descriptor: ConnectionDescriptor,
    /// Flattened schema columns, used for DDL and table validation.
    columns: Vec<FlatColumn>,
    dialect: Dialect,
    serializer: Serializer,
    client: Box<dyn SqlClient>,
    table: TableState,
    statement: Option<PreparedInsert>,
    /// Latched after the one recreate-and-retry recovery this instance gets.
    recovered: bool,
    closed: bool,
}

impl std::fmt::Debug for MappingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingEngine")
            .field("descriptor", &self.descriptor)
            .field("columns", &self.columns)
            .field("dialect", &self.dialect)
            .field("table", &self.table)
            .field("statement", &self.statement)
            .field("recovered", &self.recovered)
            .field("closed", &self.closed)
            .finish()
    }
}

impl MappingEngine {
    /// Connects to the destination, ensures the database and table exist, and
    /// validates an existing table against the schema.
    ///
    /// Any failure aborts initialization; no partially-usable engine is ever
    /// returned.
    pub async fn connect<C>(
        connector: &C,
        descriptor: ConnectionDescriptor,
        schema: EventSchema,
    ) -> Result<Self>
    where
        C: Connector,
    {
        let columns = flatten::flatten_schema(&schema.properties)?;
        if columns.is_empty() {
            return Err(Error::Config("event schema has no properties".to_string()));
        }

        let dialect = Dialect::for_engine(descriptor.engine);
        let quote = descriptor
            .quote_identifiers
            .unwrap_or_else(|| dialect.quotes_identifiers());
        let serializer = Serializer::new(dialect).with_quoted_identifiers(quote);

        // Bootstrap connection: the target database may not exist yet.
        let mut server = connector
            .connect_server(&descriptor)
            .await
            .map_err(Error::connect)?;
        let created = ensure_database(&mut server, &serializer, dialect, &descriptor.database).await;
        if let Err(err) = server.close().await {
            warn!(error = %err, "failed to close bootstrap connection");
        }
        created?;

        let client = connector.connect(&descriptor).await.map_err(Error::connect)?;

        let mut engine = Self {
            columns,
            dialect,
            serializer,
            client: Box::new(client),
            table: TableState::new(descriptor.table.clone()),
            statement: None,
            recovered: false,
            closed: false,
            descriptor,
        };
        engine.ensure_table().await?;
        Ok(engine)
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Persists one event.
    ///
    /// A record may carry fields the cached template has never seen; that
    /// rebuilds the template from the record's shape and continues, favoring
    /// availability over strict schema enforcement at write time. If the
    /// write fails because the table no longer exists, the table is recreated
    /// and the write retried, once per engine instance; a later recurrence is
    /// fatal so a persistently broken destination cannot loop.
    pub async fn save(&mut self, event: &Event) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }

        if !self.table.exists() {
            self.create_table().await?;
            self.table.set_exists();
        }

        let rebuild = match &self.statement {
            None => true,
            Some(statement) => !statement.covers(event)?,
        };
        if rebuild {
            let statement =
                PreparedInsert::build(&self.serializer, &self.descriptor.table, event)?;
            debug!(
                table = %self.descriptor.table,
                parameters = statement.parameter_count(),
                "rebuilt insert template"
            );
            self.statement = Some(statement);
        }

        let (sql, params) = match &self.statement {
            Some(statement) => (statement.sql.clone(), statement.bind(event)?),
            None => return Err(Error::Record("event has no fields".to_string())),
        };

        let result = self.client.execute(&sql, &params).await;
        let err = match result {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        if self.dialect.classify(&err) != ErrorClass::MissingRelation {
            return Err(Error::Execution(err));
        }
        if self.recovered {
            return Err(Error::TableLost {
                table: self.descriptor.table.clone(),
                source: err,
            });
        }

        warn!(
            table = %self.descriptor.table,
            "table was unexpectedly not found and gets recreated"
        );
        self.recovered = true;
        self.table.set_missing();
        self.create_table().await?;
        self.table.set_exists();

        let retried = self.client.execute(&sql, &params).await;
        match retried {
            Ok(_) => Ok(()),
            Err(retry_err) if self.dialect.classify(&retry_err) == ErrorClass::MissingRelation => {
                Err(Error::TableLost {
                    table: self.descriptor.table.clone(),
                    source: retry_err,
                })
            }
            Err(retry_err) => Err(Error::Execution(retry_err)),
        }
    }

    /// Releases the cached statement and the connection.
    ///
    /// Idempotent: closing an already-closed engine is a no-op. Failures are
    /// logged per resource and never surfaced, so shutdown always makes a
    /// best effort at releasing everything.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.statement = None;
        debug!("released cached insert template");

        if let Err(err) = self.client.close().await {
            warn!(error = %err, "failed to close database connection");
        } else {
            info!("closed database connection");
        }
    }

    /// Introspects the destination for the configured table, creating or
    /// validating it so the existence flag ends up at `Exists`.
    async fn ensure_table(&mut self) -> Result<()> {
        let exists = self
            .client
            .table_exists(self.table.name())
            .await
            .map_err(Error::connect)?;

        if exists {
            self.validate_table().await?;
        } else {
            self.create_table().await?;
        }
        self.table.set_exists();
        Ok(())
    }

    async fn create_table(&mut self) -> Result<()> {
        let mut params: Vec<(String, ValueType)> = Vec::new();
        let sql = {
            let stmt = Statement::create_table(self.table.name(), &self.columns);
            self.serializer.serialize(&stmt, &mut params)
        };
        assert!(
            params.is_empty(),
            "creating a table shouldn't involve any parameters"
        );

        self.client.execute(&sql, &[]).await?;
        info!(table = %self.descriptor.table, "created table");
        Ok(())
    }

    /// Requires every schema column to map onto a discovered column of a
    /// compatible type. Any disagreement is fatal; the engine never migrates
    /// an existing table.
    async fn validate_table(&mut self) -> Result<()> {
        let discovered = self
            .client
            .table_columns(self.table.name())
            .await
            .map_err(Error::connect)?;
        self.table.record_columns(discovered);

        for column in &self.columns {
            match self.table.column_type(&column.name) {
                None => {
                    return Err(Error::schema_mismatch(
                        self.table.name(),
                        format!("column `{}` is missing", column.name),
                    ));
                }
                Some(found) if !self.dialect.type_compatible(column.ty, found) => {
                    return Err(Error::schema_mismatch(
                        self.table.name(),
                        format!(
                            "column `{}` has type `{found}`, expected {}",
                            column.name,
                            self.dialect.column_type(column.ty)
                        ),
                    ));
                }
                Some(_) => {}
            }
        }

        debug!(table = %self.descriptor.table, "validated existing table");
        Ok(())
    }
}

/// Issues `CREATE DATABASE`, treating an already-exists classification as
/// success and anything else as fatal for this engine instance.
async fn ensure_database(
    client: &mut impl SqlClient,
    serializer: &Serializer,
    dialect: Dialect,
    database: &str,
) -> Result<()> {
    let mut params: Vec<(String, ValueType)> = Vec::new();
    let sql = serializer.serialize(&Statement::create_database(database), &mut params);
    assert!(
        params.is_empty(),
        "creating a database shouldn't involve any parameters"
    );

    match client.execute(&sql, &[]).await {
        Ok(_) => {
            info!(database = %database, "created database");
            Ok(())
        }
        Err(err) if dialect.classify(&err) == ErrorClass::AlreadyExists => {
            debug!(database = %database, "database already exists");
            Ok(())
        }
        Err(err) => Err(Error::connect(err)),
    }
}
