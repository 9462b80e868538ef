use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::result_set::{CellValue, ResultSet};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct QueryBackendError {
    message: String,
}

impl QueryBackendError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryExecutorError {
    #[error("query failed: {0}")]
    Backend(#[source] QueryBackendError),
}

#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn run(&self, sql: &str) -> Result<TabularRows, QueryBackendError>;

    async fn close(&self) -> Result<(), QueryBackendError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct QueryExecutor<B: QueryBackend> {
    backend: B,
}

impl<B: QueryBackend> QueryExecutor<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, sql: &str) -> Result<ResultSet, QueryExecutorError> {
        let started_at = Instant::now();
        let tabular = self
            .backend
            .run(sql)
            .await
            .map_err(QueryExecutorError::Backend)?;
        let elapsed_micros = i64::try_from(started_at.elapsed().as_micros()).unwrap_or(i64::MAX);

        debug!(
            rows = tabular.rows.len(),
            columns = tabular.columns.len(),
            elapsed_micros,
            "query executed"
        );

        Ok(ResultSet::from_positional(
            sql,
            tabular.columns,
            tabular.rows,
            elapsed_micros,
        ))
    }

    pub async fn list_tables(&self) -> Result<Vec<String>, QueryExecutorError> {
        let result = self.execute("SHOW TABLES").await?;
        Ok(result.flattened_text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: Option<RequestId>,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> RequestId {
        let next = self.latest.map_or(1, |id| id.0 + 1);
        let id = RequestId(next);
        self.latest = Some(id);
        id
    }

    #[must_use]
    pub fn latest(&self) -> Option<RequestId> {
        self.latest
    }

    #[must_use]
    pub fn is_latest(&self, id: RequestId) -> bool {
        self.latest == Some(id)
    }
}
