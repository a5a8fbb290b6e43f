use crate::client::ClientError;
use crate::ident::InvalidIdentifier;

/// An error that can occur while mapping events into a relational table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A name destined for SQL interpolation failed the identifier guard.
    /// The operator supplied a malformed or malicious name; never retried.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    #[error("configuration: {0}")]
    Config(String),

    #[error("malformed event record: {0}")]
    Record(String),

    #[error("could not establish a connection with the server: {source}")]
    Connect {
        #[source]
        source: ClientError,
    },

    /// The existing table's shape disagrees with the current schema. The
    /// engine refuses to write rather than miswrite; there is no automatic
    /// migration.
    #[error("table `{table}` does not match the event schema: {detail}")]
    SchemaMismatch { table: String, detail: String },

    /// The destination table disappeared again after the engine already
    /// recreated it once.
    #[error("table `{table}` was lost again after being recreated: {source}")]
    TableLost {
        table: String,
        #[source]
        source: ClientError,
    },

    /// Any other database error during a write. Not retried.
    #[error(transparent)]
    Execution(#[from] ClientError),

    #[error("engine is closed")]
    Closed,
}

impl Error {
    pub fn connect(source: ClientError) -> Self {
        Error::Connect { source }
    }

    pub fn schema_mismatch(table: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            table: table.into(),
            detail: detail.into(),
        }
    }
}
