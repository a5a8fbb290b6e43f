//! Event-to-relational mapping engine: persists nested pipeline events into a
//! single relational table, creating or validating the schema on first use
//! and recovering once from externally-induced schema loss.

mod engine;
pub use engine::MappingEngine;

mod statement;
mod table;

pub use rowsink_core::{
    client, config, event, flatten, ident, schema, ConnectionDescriptor, DbEngine, Error, Event,
    EventSchema, Property, Result, Value, ValueType,
};
pub use rowsink_sql::{dialect, Dialect, Serializer};

/// Connects using the driver selected by the descriptor's engine identifier.
///
/// The matching cargo feature (`postgresql` or `mysql`) must be enabled;
/// otherwise the engine identifier is reported as a configuration error.
pub async fn connect(
    descriptor: ConnectionDescriptor,
    schema: EventSchema,
) -> Result<MappingEngine> {
    match descriptor.engine {
        #[cfg(feature = "postgresql")]
        config::DbEngine::PostgreSql => {
            MappingEngine::connect(
                &rowsink_driver_postgresql::PostgresConnector,
                descriptor,
                schema,
            )
            .await
        }
        #[cfg(feature = "mysql")]
        config::DbEngine::MySql => {
            MappingEngine::connect(&rowsink_driver_mysql::MySqlConnector, descriptor, schema)
                .await
        }
        #[allow(unreachable_patterns)]
        engine => {
            let _ = schema;
            Err(Error::Config(format!(
                "support for `{engine}` is not compiled in"
            )))
        }
    }
}
