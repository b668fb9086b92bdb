//! SQL Server (TDS) client implementation.
//!
//! Provides the `MssqlClient` struct that implements the `DatabaseClient` trait
//! for Synapse serverless SQL endpoints and other SQL Server-compatible
//! backends using tiberius.

use crate::auth::{self, Credentials};
use crate::config::SqlConfig;
use crate::db::{ColumnInfo, Connector, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ProxyError, Result};
use crate::request::Target;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::{Duration, Instant};
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, FromSql};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

type TdsClient = Client<Compat<TcpStream>>;

/// SQL Server database client holding one open connection.
pub struct MssqlClient {
    client: Mutex<Option<TdsClient>>,
    query_timeout: Duration,
}

impl MssqlClient {
    /// Opens a connection to `server`/`database` with the given credentials.
    pub async fn connect(
        server: &str,
        database: &str,
        credentials: Credentials,
        settings: &SqlConfig,
    ) -> Result<Self> {
        let config = tds_config(server, database, credentials, settings);
        let timeout = Duration::from_secs(settings.connect_timeout_secs);

        let client = tokio::time::timeout(timeout, open(config))
            .await
            .map_err(|_| {
                ProxyError::connection(format!(
                    "Connecting to {server} timed out after {} seconds",
                    settings.connect_timeout_secs
                ))
            })??;

        debug!("Connected to {server}/{database}");
        Ok(Self {
            client: Mutex::new(Some(client)),
            query_timeout: Duration::from_secs(settings.query_timeout_secs),
        })
    }
}

fn tds_config(server: &str, database: &str, credentials: Credentials, settings: &SqlConfig) -> Config {
    let mut config = Config::new();
    config.host(server);
    config.port(settings.port);
    config.database(database);
    config.application_name("adls-proxy");
    config.encryption(if settings.encrypt {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::Off
    });
    if settings.trust_server_certificate {
        config.trust_cert();
    }
    config.authentication(match credentials {
        Credentials::AccessToken(token) => AuthMethod::aad_token(token),
        Credentials::SqlLogin { user, password } => AuthMethod::sql_server(user, password),
    });
    config
}

async fn open(mut config: Config) -> Result<TdsClient> {
    let tcp = connect_tcp(&config).await?;

    match Client::connect(config.clone(), tcp.compat_write()).await {
        Ok(client) => Ok(client),
        // Azure gateways may redirect the login to another node.
        Err(tiberius::error::Error::Routing { host, port }) => {
            debug!("Login redirected to {host}:{port}");
            config.host(&host);
            config.port(port);
            let tcp = connect_tcp(&config).await?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(|e| ProxyError::connection(e.to_string()))
        }
        Err(e) => Err(ProxyError::connection(e.to_string())),
    }
}

async fn connect_tcp(config: &Config) -> Result<TcpStream> {
    let addr = config.get_addr();
    let tcp = TcpStream::connect(&addr)
        .await
        .map_err(|e| ProxyError::connection(format!("Cannot connect to {addr}: {e}")))?;
    tcp.set_nodelay(true)
        .map_err(|e| ProxyError::connection(e.to_string()))?;
    Ok(tcp)
}

#[async_trait]
impl DatabaseClient for MssqlClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();
        let mut guard = self.client.lock().await;
        let client = guard
            .as_mut()
            .ok_or_else(|| ProxyError::connection("Connection already closed"))?;

        let rows = tokio::time::timeout(self.query_timeout, async {
            client.simple_query(sql).await?.into_first_result().await
        })
        .await
        .map_err(|_| {
            ProxyError::query(format!(
                "Query timed out after {} seconds",
                self.query_timeout.as_secs()
            ))
        })?
        .map_err(|e| ProxyError::query(e.to_string()))?;

        let columns: Vec<ColumnInfo> = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name()))
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(convert_value).collect::<Result<Row>>())
            .collect::<Result<Vec<Row>>>()?;

        Ok(QueryResult::with_data(columns, rows).with_execution_time(start.elapsed()))
    }

    async fn close(&self) -> Result<()> {
        if let Some(client) = self.client.lock().await.take() {
            client
                .close()
                .await
                .map_err(|e| ProxyError::connection(e.to_string()))?;
        }
        Ok(())
    }
}

/// Converts a TDS column value to a [`Value`].
fn convert_value(data: ColumnData<'static>) -> Result<Value> {
    let value = match data {
        ColumnData::U8(v) => v.map(|n| Value::Int(i64::from(n))),
        ColumnData::I16(v) => v.map(|n| Value::Int(i64::from(n))),
        ColumnData::I32(v) => v.map(|n| Value::Int(i64::from(n))),
        ColumnData::I64(v) => v.map(Value::Int),
        ColumnData::F32(v) => v.map(|n| Value::Float(f64::from(n))),
        ColumnData::F64(v) => v.map(Value::Float),
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::String(v) => v.map(|s| Value::String(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| Value::Guid(g.to_string())),
        ColumnData::Binary(v) => v.map(|b| Value::Bytes(b.into_owned())),
        ColumnData::Numeric(v) => v.map(|n| Value::Decimal(numeric_text(n.value(), n.scale()))),
        ColumnData::Xml(v) => v.map(|x| Value::String(x.into_owned().into_string())),
        ColumnData::Date(_) => NaiveDate::from_sql(&data).map_err(temporal_error)?.map(Value::Date),
        ColumnData::Time(_) => NaiveTime::from_sql(&data).map_err(temporal_error)?.map(Value::Time),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(&data)
                .map_err(temporal_error)?
                .map(Value::DateTime)
        }
        ColumnData::DateTimeOffset(_) => DateTime::<FixedOffset>::from_sql(&data)
            .map_err(temporal_error)?
            .map(Value::DateTimeOffset),
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Formats a scaled integer as exact decimal text, e.g. `(-5, 2)` as `-0.05`.
fn numeric_text(value: i128, scale: u8) -> String {
    let digits = value.unsigned_abs().to_string();
    let sign = if value < 0 { "-" } else { "" };
    let scale = usize::from(scale);
    if scale == 0 {
        return format!("{sign}{digits}");
    }

    let digits = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = digits.split_at(digits.len() - scale);
    format!("{sign}{int_part}.{frac_part}")
}

fn temporal_error(e: tiberius::error::Error) -> ProxyError {
    ProxyError::unexpected_result(format!("Cannot convert temporal column: {e}"))
}

/// Connects to request targets over TDS, acquiring credentials per connection.
pub struct MssqlConnector {
    settings: SqlConfig,
    http: reqwest::Client,
}

impl MssqlConnector {
    pub fn new(settings: SqlConfig) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(&self, target: &Target) -> Result<Box<dyn DatabaseClient>> {
        let credentials = auth::acquire(&self.http, &self.settings.auth).await?;
        let client =
            MssqlClient::connect(&target.server, &target.database, credentials, &self.settings)
                .await?;
        Ok(Box::new(client))
    }
}
