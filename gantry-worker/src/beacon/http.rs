//! HTTP beacon client
//!
//! Signals drain verbs to the coordinator's worker-pool API, trying
//! each configured endpoint in order until one completes an exchange.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use super::BeaconClient;
use crate::error::{GantryError, Result};
use crate::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Configuration for the HTTP beacon client
#[derive(Debug, Clone)]
pub struct BeaconConfig {
    /// Coordinator base URLs, tried in order
    pub endpoints: Vec<String>,
    /// Name this worker registered under
    pub worker_name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            endpoints: vec!["http://localhost:8080".into()],
            worker_name: "worker".into(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Beacon client over the coordinator's worker-pool HTTP API
#[derive(Debug)]
pub struct HttpBeaconClient {
    config: BeaconConfig,
    http: reqwest::Client,
}

impl HttpBeaconClient {
    /// Create a new beacon client
    pub fn new(config: BeaconConfig) -> Result<Self> {
        if config.endpoints.is_empty() {
            return Err(GantryError::InvalidConfig {
                reason: "no coordinator endpoints configured".into(),
            });
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GantryError::Internal {
                message: format!("failed to build http client: {}", e),
            })?;

        Ok(Self { config, http })
    }

    /// Issue `verb` against each endpoint in turn
    ///
    /// A transport failure falls through to the next endpoint; running
    /// out of endpoints is the unreachable sentinel. A completed
    /// exchange settles the call either way, so a rejection is returned
    /// without trying further endpoints.
    async fn signal(&self, verb: &str, method: Method, path: String) -> Result<()> {
        for endpoint in &self.config.endpoints {
            let url = format!("{}{}", endpoint.trim_end_matches('/'), path);
            debug!("signaling {} via {}", verb, url);

            match self.http.request(method.clone(), &url).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("coordinator accepted {} for {}", verb, self.config.worker_name);
                    return Ok(());
                }
                Ok(response) => {
                    return Err(rejection(verb, &self.config.worker_name, response.status()));
                }
                Err(e) => {
                    warn!("coordinator endpoint {} unreachable: {}", endpoint, e);
                }
            }
        }

        Err(GantryError::Unreachable)
    }

    fn worker_path(&self) -> String {
        format!("/api/v1/workers/{}", self.config.worker_name)
    }
}

fn rejection(verb: &str, worker: &str, status: StatusCode) -> GantryError {
    GantryError::Rejected {
        verb: verb.into(),
        worker: worker.into(),
        status: status.as_u16(),
    }
}

#[async_trait]
impl BeaconClient for HttpBeaconClient {
    async fn land_worker(&self) -> Result<()> {
        self.signal("land", Method::PUT, format!("{}/land", self.worker_path()))
            .await
    }

    async fn retire_worker(&self) -> Result<()> {
        self.signal("retire", Method::PUT, format!("{}/retire", self.worker_path()))
            .await
    }

    async fn delete_worker(&self) -> Result<()> {
        self.signal("delete", Method::DELETE, self.worker_path()).await
    }
}
