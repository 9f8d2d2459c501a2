//! # HTTP Transport
//!
//! Envelopes are posted as JSON:
//!
//! | Request | Route |
//! |---------|-------|
//! | status  | `GET  {host}/api/v2/status` |
//! | call    | `POST {host}/api/v2/backend/{id}/call` |
//! | query   | `POST {host}/api/v2/backend/{id}/query` |
//!
//! A 2xx body is a [`ReplicaResponse`]. 5xx, connect failures and timeouts
//! are `Network`; any other non-2xx status is a rejection.

use crate::config::GatewayConfig;
use crate::domain::{Endpoint, Envelope, TransportError};
use crate::ports::{AgentTransport, TransportStatus};
use async_trait::async_trait;
use cv_01_wire_codec::WireValue;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Reply body for call and query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplicaResponse {
    /// The method ran.
    Replied {
        /// Encoded result
        reply: WireValue,
    },
    /// The replica refused or the method trapped.
    Rejected {
        /// Reject code
        reject_code: u32,
        /// Detail
        reject_message: String,
    },
}

impl ReplicaResponse {
    /// Reply value, or the rejection as an error.
    pub fn into_result(self) -> Result<WireValue, TransportError> {
        match self {
            ReplicaResponse::Replied { reply } => Ok(reply),
            ReplicaResponse::Rejected {
                reject_code,
                reject_message,
            } => Err(TransportError::Rejected {
                code: reject_code,
                message: reject_message,
            }),
        }
    }
}

/// reqwest-backed transport.
pub struct HttpAgentTransport {
    client: Client,
}

impl HttpAgentTransport {
    /// Build the HTTP client.
    pub fn new(config: &GatewayConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    fn route(endpoint: &Endpoint, kind: &str) -> String {
        format!("{}/api/v2/backend/{}/{}", endpoint.host, endpoint.backend_id, kind)
    }

    async fn submit(&self, url: String, envelope: &Envelope) -> Result<WireValue, TransportError> {
        let response = self
            .client
            .post(&url)
            .json(envelope)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        let body: ReplicaResponse = checked(response)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        body.into_result()
    }
}

fn network_error(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Network(format!("cannot connect to {url}"))
    } else if err.is_timeout() {
        TransportError::Network(format!("request to {url} timed out"))
    } else {
        TransportError::Network(err.to_string())
    }
}

async fn checked(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    warn!(status = %status, "[cv-04] backend returned an error status");
    Err(status_error(status, message))
}

fn status_error(status: StatusCode, message: String) -> TransportError {
    if status.is_server_error() {
        TransportError::Network(format!("{status}: {message}"))
    } else {
        TransportError::Rejected {
            code: u32::from(status.as_u16()),
            message,
        }
    }
}

#[async_trait]
impl AgentTransport for HttpAgentTransport {
    async fn status(&self, endpoint: &Endpoint) -> Result<TransportStatus, TransportError> {
        let url = format!("{}/api/v2/status", endpoint.host);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        checked(response)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn call(&self, endpoint: &Endpoint, envelope: Envelope) -> Result<WireValue, TransportError> {
        self.submit(Self::route(endpoint, "call"), &envelope).await
    }

    async fn query(
        &self,
        endpoint: &Endpoint,
        envelope: Envelope,
    ) -> Result<WireValue, TransportError> {
        self.submit(Self::route(endpoint, "query"), &envelope).await
    }
}
