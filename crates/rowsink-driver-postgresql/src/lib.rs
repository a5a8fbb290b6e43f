mod statement_cache;
use statement_cache::StatementCache;

mod value;
pub(crate) use value::PgValue;

use rowsink_core::async_trait;
use rowsink_core::client::{ClientError, ColumnInfo, Connector, SqlClient};
use rowsink_core::config::{ConnectionDescriptor, TlsOptions};
use rowsink_core::event::Value;
use rowsink_sql::Dialect;
use tokio_postgres::tls::MakeTlsConnect;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, Socket};
use tracing::warn;
use url::Url;

/// Opens PostgreSQL connections for the mapping engine.
pub struct PostgresConnector;

#[async_trait]
impl Connector for PostgresConnector {
    type Client = PostgresClient;

    async fn connect_server(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<PostgresClient, ClientError> {
        // CREATE DATABASE has to be issued from an existing database; the
        // maintenance database is always there.
        let mut config = config_from_url(&connection_url(descriptor)?)?;
        config.dbname("postgres");
        PostgresClient::connect(&config, descriptor.tls.as_ref()).await
    }

    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<PostgresClient, ClientError> {
        let config = config_from_url(&connection_url(descriptor)?)?;
        PostgresClient::connect(&config, descriptor.tls.as_ref()).await
    }
}

fn connection_url(descriptor: &ConnectionDescriptor) -> Result<Url, ClientError> {
    Dialect::postgresql()
        .connection_url(descriptor)
        .map_err(|err| ClientError::new(err.to_string()))
}

fn config_from_url(url: &Url) -> Result<Config, ClientError> {
    let host = url
        .host_str()
        .ok_or_else(|| ClientError::new(format!("missing host in connection URL; url={url}")))?;

    let mut config = Config::new();
    config.host(host);
    config.dbname(url.path().trim_start_matches('/'));

    if let Some(port) = url.port() {
        config.port(port);
    }
    if !url.username().is_empty() {
        config.user(url.username());
    }
    if let Some(password) = url.password() {
        config.password(password);
    }

    Ok(config)
}

/// A [`SqlClient`] over `tokio-postgres` with per-connection prepared
/// statement reuse.
pub struct PostgresClient {
    client: Option<Client>,
    statements: StatementCache,
}

impl PostgresClient {
    async fn connect(
        config: &Config,
        tls: Option<&TlsOptions>,
    ) -> Result<Self, ClientError> {
        match tls {
            Some(options) => {
                let connector = tls_connector(options)?;
                Self::connect_with_config(config, postgres_native_tls::MakeTlsConnector::new(connector))
                    .await
            }
            None => Self::connect_with_config(config, NoTls).await,
        }
    }

    async fn connect_with_config<T>(config: &Config, tls: T) -> Result<Self, ClientError>
    where
        T: MakeTlsConnect<Socket> + 'static,
        T::Stream: Send + 'static,
    {
        let (client, connection) = config.connect(tls).await.map_err(client_error)?;

        tokio::spawn(async move {
            if let Err(err) = connection.await {
                warn!(error = %err, "postgresql connection error");
            }
        });

        Ok(Self {
            client: Some(client),
            statements: StatementCache::new(),
        })
    }

    fn client(&self) -> Result<&Client, ClientError> {
        self.client
            .as_ref()
            .ok_or_else(|| ClientError::new("connection is closed"))
    }
}

#[async_trait]
impl SqlClient for PostgresClient {
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, ClientError> {
        let client = match self.client.as_ref() {
            Some(client) => client,
            None => return Err(ClientError::new("connection is closed")),
        };

        let statement = self
            .statements
            .prepare(client, sql)
            .await
            .map_err(client_error)?;

        let values: Vec<PgValue<'_>> = params.iter().map(PgValue).collect();
        let args: Vec<&(dyn ToSql + Sync)> = values
            .iter()
            .map(|value| value as &(dyn ToSql + Sync))
            .collect();

        client
            .execute(&statement, &args)
            .await
            .map_err(client_error)
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool, ClientError> {
        let rows = self
            .client()?
            .query(
                "SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1",
                &[&table],
            )
            .await
            .map_err(client_error)?;
        Ok(!rows.is_empty())
    }

    async fn table_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>, ClientError> {
        let rows = self
            .client()?
            .query(
                "SELECT column_name, data_type FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = $1 \
                 ORDER BY ordinal_position",
                &[&table],
            )
            .await
            .map_err(client_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ColumnInfo {
                name: row.get(0),
                data_type: row.get(1),
            })
            .collect())
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        // Dropping the client ends the connection task.
        self.statements.clear();
        self.client = None;
        Ok(())
    }
}

fn tls_connector(options: &TlsOptions) -> Result<native_tls::TlsConnector, ClientError> {
    let mut builder = native_tls::TlsConnector::builder();

    if let Some(path) = &options.ca_cert {
        let pem = std::fs::read(path).map_err(|err| {
            ClientError::new(format!(
                "cannot read root certificate `{}`: {err}",
                path.display()
            ))
        })?;
        let certificate = native_tls::Certificate::from_pem(&pem)
            .map_err(|err| ClientError::new(format!("invalid root certificate: {err}")))?;
        builder.add_root_certificate(certificate);
    }

    builder
        .build()
        .map_err(|err| ClientError::new(format!("cannot initialize TLS: {err}")))
}

fn client_error(err: tokio_postgres::Error) -> ClientError {
    match err.as_db_error() {
        Some(db_error) => ClientError::new(db_error.message().to_string())
            .with_sqlstate(db_error.code().code()),
        None => ClientError::new(err.to_string()),
    }
}
