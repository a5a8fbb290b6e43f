mod value;
use value::to_mysql;

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder, SslOpts};
use rowsink_core::async_trait;
use rowsink_core::client::{ClientError, ColumnInfo, Connector, SqlClient};
use rowsink_core::config::ConnectionDescriptor;
use rowsink_core::event::Value;
use rowsink_sql::Dialect;

/// Opens MySQL connections for the mapping engine.
pub struct MySqlConnector;

#[async_trait]
impl Connector for MySqlConnector {
    type Client = MySqlClient;

    async fn connect_server(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<MySqlClient, ClientError> {
        // The target database may not exist yet; connect without one.
        MySqlClient::connect(opts(descriptor, false)?).await
    }

    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<MySqlClient, ClientError> {
        MySqlClient::connect(opts(descriptor, true)?).await
    }
}

fn opts(descriptor: &ConnectionDescriptor, with_database: bool) -> Result<Opts, ClientError> {
    let url = Dialect::mysql()
        .connection_url(descriptor)
        .map_err(|err| ClientError::new(err.to_string()))?;
    let opts = Opts::from_url(url.as_str())
        .map_err(|err| ClientError::new(format!("invalid connection URL: {err}")))?;

    let mut builder = OptsBuilder::from_opts(opts);
    if !with_database {
        builder = builder.db_name(None::<String>);
    }
    if let Some(tls) = &descriptor.tls {
        let mut ssl = SslOpts::default();
        if let Some(ca) = &tls.ca_cert {
            ssl = ssl.with_root_certs(vec![ca.clone().into()]);
        }
        builder = builder.ssl_opts(ssl);
    }

    Ok(builder.into())
}

/// A [`SqlClient`] over `mysql_async`. Statement reuse is handled by the
/// connection's built-in statement cache.
pub struct MySqlClient {
    conn: Option<Conn>,
}

impl MySqlClient {
    async fn connect(opts: Opts) -> Result<Self, ClientError> {
        let conn = Conn::new(opts).await.map_err(client_error)?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> Result<&mut Conn, ClientError> {
        self.conn
            .as_mut()
            .ok_or_else(|| ClientError::new("connection is closed"))
    }
}

#[async_trait]
impl SqlClient for MySqlClient {
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, ClientError> {
        let values = params
            .iter()
            .map(to_mysql)
            .collect::<Result<Vec<_>, _>>()?;
        let params = if values.is_empty() {
            mysql_async::Params::Empty
        } else {
            mysql_async::Params::Positional(values)
        };

        let conn = self.conn()?;
        conn.exec_drop(sql, params).await.map_err(client_error)?;
        Ok(conn.affected_rows())
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool, ClientError> {
        let count: Option<i64> = self
            .conn()?
            .exec_first(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = ?",
                (table,),
            )
            .await
            .map_err(client_error)?;
        Ok(count.unwrap_or(0) > 0)
    }

    async fn table_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>, ClientError> {
        let rows: Vec<(String, String)> = self
            .conn()?
            .exec(
                "SELECT column_name, data_type FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? \
                 ORDER BY ordinal_position",
                (table,),
            )
            .await
            .map_err(client_error)?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type)| ColumnInfo { name, data_type })
            .collect())
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        match self.conn.take() {
            Some(conn) => conn.disconnect().await.map_err(client_error),
            None => Ok(()),
        }
    }
}

fn client_error(err: mysql_async::Error) -> ClientError {
    match &err {
        mysql_async::Error::Server(server) => ClientError::new(server.message.clone())
            .with_code(u32::from(server.code))
            .with_sqlstate(server.state.clone()),
        other => ClientError::new(other.to_string()),
    }
}
