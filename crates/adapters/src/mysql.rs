use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{OptsBuilder, Pool, Row, Value};
use paneql_core::config::DatabaseConfig;
use paneql_core::connection::{BackendError, ConnectionProvider};
use paneql_core::query_executor::{QueryBackend, QueryBackendError, TabularRows};
use paneql_core::result_set::CellValue;
use tracing::debug;

const PASSWORD_ENV_VAR: &str = "PANEQL_DB_PASSWORD";

#[derive(Debug, Clone, Default)]
pub struct MysqlConnectionProvider;

#[async_trait]
impl ConnectionProvider for MysqlConnectionProvider {
    type Handle = MysqlQueryBackend;

    async fn connect(&self, config: &DatabaseConfig) -> Result<Self::Handle, BackendError> {
        let pool = Pool::new(opts_from_config(config));
        let mut conn = pool.get_conn().await.map_err(to_connection_error)?;
        conn.ping().await.map_err(to_connection_error)?;
        drop(conn);
        Ok(MysqlQueryBackend { pool })
    }
}

#[derive(Debug, Clone)]
pub struct MysqlQueryBackend {
    pool: Pool,
}

#[async_trait]
impl QueryBackend for MysqlQueryBackend {
    async fn run(&self, sql: &str) -> Result<TabularRows, QueryBackendError> {
        let mut conn = self.pool.get_conn().await.map_err(to_query_error)?;
        let mut result = conn.query_iter(sql).await.map_err(to_query_error)?;

        let columns = result
            .columns_ref()
            .iter()
            .map(|column| column.name_str().into_owned())
            .collect::<Vec<_>>();
        let affected_rows = result.affected_rows();
        let rows = result.collect::<Row>().await.map_err(to_query_error)?;
        result.drop_result().await.map_err(to_query_error)?;

        if columns.is_empty() {
            debug!(affected_rows, "statement returned no result set");
            return Ok(TabularRows {
                columns: vec!["affected_rows".to_string()],
                rows: vec![vec![CellValue::UInt(affected_rows)]],
            });
        }

        Ok(TabularRows {
            columns,
            rows: rows.into_iter().map(row_to_cells).collect(),
        })
    }

    async fn close(&self) -> Result<(), QueryBackendError> {
        self.pool.clone().disconnect().await.map_err(to_query_error)
    }
}

fn opts_from_config(config: &DatabaseConfig) -> OptsBuilder {
    let mut builder = OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.user.clone()));

    if let Some(password) = resolve_password(config) {
        builder = builder.pass(Some(password));
    }

    if let Some(database) = non_empty(config.database.as_deref()) {
        builder = builder.db_name(Some(database.to_string()));
    }

    builder
}

fn resolve_password(config: &DatabaseConfig) -> Option<String> {
    if let Some(password) = config.password.clone() {
        return Some(password);
    }

    std::env::var(PASSWORD_ENV_VAR)
        .ok()
        .filter(|pw| !pw.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

fn row_to_cells(row: Row) -> Vec<CellValue> {
    row.unwrap().into_iter().map(mysql_value_to_cell).collect()
}

fn mysql_value_to_cell(value: Value) -> CellValue {
    match value {
        Value::NULL => CellValue::Null,
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => CellValue::Text(text),
            Err(error) => CellValue::Bytes(error.into_bytes()),
        },
        Value::Int(value) => CellValue::Int(value),
        Value::UInt(value) => CellValue::UInt(value),
        Value::Float(value) => CellValue::Float(f64::from(value)),
        Value::Double(value) => CellValue::Float(value),
        Value::Date(year, month, day, hour, minute, second, micros) => CellValue::Text(format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micros:06}"
        )),
        Value::Time(is_negative, days, hours, minutes, seconds, micros) => {
            let sign = if is_negative { "-" } else { "" };
            CellValue::Text(format!(
                "{sign}{days:03} {hours:02}:{minutes:02}:{seconds:02}.{micros:06}"
            ))
        }
    }
}

fn to_connection_error(error: mysql_async::Error) -> BackendError {
    BackendError::new(error.to_string())
}

fn to_query_error(error: mysql_async::Error) -> QueryBackendError {
    QueryBackendError::new(error.to_string())
}
