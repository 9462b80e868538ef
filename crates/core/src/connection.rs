use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::query_executor::QueryBackend;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Handle: QueryBackend + Clone + Send + Sync + 'static;

    async fn connect(&self, config: &DatabaseConfig) -> Result<Self::Handle, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub name: String,
    pub address: String,
}

impl ConnectionTarget {
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} ({})", self.address, self.name)
    }
}

impl From<&DatabaseConfig> for ConnectionTarget {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            name: config.name.clone(),
            address: config.address(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConnectionState<H> {
    Pending {
        target: ConnectionTarget,
    },
    Connected {
        target: ConnectionTarget,
        handle: H,
    },
    Failed {
        target: Option<ConnectionTarget>,
        reason: String,
    },
}

impl<H> ConnectionState<H> {
    #[must_use]
    pub fn status(&self) -> &str {
        match self {
            Self::Pending { .. } => "Connecting...",
            Self::Connected { .. } => "Connected",
            Self::Failed { reason, .. } => reason,
        }
    }

    #[must_use]
    pub fn target(&self) -> Option<&ConnectionTarget> {
        match self {
            Self::Pending { target } | Self::Connected { target, .. } => Some(target),
            Self::Failed { target, .. } => target.as_ref(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        match self {
            Self::Pending { .. } => ConnectionPhase::Pending,
            Self::Connected { .. } => ConnectionPhase::Connected,
            Self::Failed { .. } => ConnectionPhase::Failed,
        }
    }

    #[must_use]
    pub fn summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            target: self.target().cloned(),
            status: self.status().to_string(),
            phase: self.phase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Pending,
    Connected,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub target: Option<ConnectionTarget>,
    pub status: String,
    pub phase: ConnectionPhase,
}

impl ConnectionSummary {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Connected
    }
}

pub async fn establish<P: ConnectionProvider>(
    provider: &P,
    config: &DatabaseConfig,
) -> ConnectionState<P::Handle> {
    let target = ConnectionTarget::from(config);
    let started_at = Instant::now();

    match provider.connect(config).await {
        Ok(handle) => {
            info!(
                name = %target.name,
                address = %target.address,
                latency_ms = started_at.elapsed().as_millis(),
                "connected"
            );
            ConnectionState::Connected { target, handle }
        }
        Err(error) => {
            warn!(name = %target.name, address = %target.address, %error, "connection failed");
            ConnectionState::Failed {
                target: Some(target),
                reason: error.to_string(),
            }
        }
    }
}
