//! HTTP command gateway
//!
//! Fire-and-forget request/response calls against the apparatus API. Each
//! call is a single exchange; there is no queuing and no client-side
//! mutual exclusion. Delivery behavior is delegated to a [`CommandPolicy`]:
//! the default performs one attempt with no timeout, matching the remote
//! contract, and the timeout variant adds bounded idempotency-key retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared::{
    BridgeResponse, EnergyUpdateResponse, InitializeResponse, LockResponse, Material, PortalId,
    ResponseEnvelope, ScanResponse, SetParametersResponse, SweepCandidate, SweepRequest,
    SweepResponse, TransferResponse,
};

use crate::error::{ConsoleError, ConsoleResult};
use crate::traits::CommandGateway;

/// Delivery policy for gateway commands.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandPolicy {
    /// Single attempt, wait indefinitely (observed upstream behavior).
    NoRetry,
    /// Per-attempt timeout with bounded retries. Retries carry an
    /// `Idempotency-Key` header so the remote side can deduplicate; only
    /// transport failures and timeouts are retried, a definitive refusal
    /// is returned as-is.
    TimeoutRetry {
        timeout: Duration,
        max_attempts: u32,
    },
}

/// Attempt outcome classification internal to the retry loop
enum AttemptError {
    Retryable(ConsoleError),
    Fatal(ConsoleError),
}

pub struct HttpCommandGateway {
    client: reqwest::Client,
    base_url: String,
    policy: CommandPolicy,
}

impl HttpCommandGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_policy(base_url, CommandPolicy::NoRetry)
    }

    pub fn with_policy(base_url: impl Into<String>, policy: CommandPolicy) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    fn endpoint(&self, command: &'static str) -> String {
        format!("{}/api/{}", self.base_url, command)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        command: &'static str,
        query: &[(&'static str, String)],
        body: Option<serde_json::Value>,
    ) -> ConsoleResult<T> {
        let (max_attempts, timeout) = match &self.policy {
            CommandPolicy::NoRetry => (1, None),
            CommandPolicy::TimeoutRetry {
                timeout,
                max_attempts,
            } => ((*max_attempts).max(1), Some(*timeout)),
        };
        let idempotency_key = (max_attempts > 1).then(Uuid::new_v4);

        let mut last = ConsoleError::CommandFailed {
            command,
            message: "no attempt made".to_string(),
        };
        for attempt in 1..=max_attempts {
            let mut request = self.client.post(self.endpoint(command)).query(query);
            if let Some(body) = &body {
                request = request.json(body);
            }
            if let Some(key) = idempotency_key {
                request = request.header("Idempotency-Key", key.to_string());
            }
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }

            match Self::exchange::<T>(request, command).await {
                Ok(value) => {
                    debug!(command, attempt, "command succeeded");
                    return Ok(value);
                }
                Err(AttemptError::Fatal(error)) => return Err(error),
                Err(AttemptError::Retryable(error)) => {
                    warn!(command, attempt, "command attempt failed: {error}");
                    last = error;
                }
            }
        }
        Err(last)
    }

    async fn exchange<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
        command: &'static str,
    ) -> Result<T, AttemptError> {
        let response = request.send().await.map_err(|e| {
            AttemptError::Retryable(if e.is_timeout() {
                ConsoleError::CommandTimeout { command }
            } else {
                ConsoleError::CommandFailed {
                    command,
                    message: e.to_string(),
                }
            })
        })?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| {
            AttemptError::Retryable(ConsoleError::CommandFailed {
                command,
                message: e.to_string(),
            })
        })?;

        if !status.is_success() {
            return Err(AttemptError::Fatal(ConsoleError::CommandFailed {
                command,
                message: format!("HTTP {status}"),
            }));
        }

        // Every response carries a success/failure envelope; a remote
        // refusal is definitive and never retried.
        let envelope: ResponseEnvelope = serde_json::from_str(&raw).map_err(|e| {
            AttemptError::Fatal(ConsoleError::CommandFailed {
                command,
                message: format!("unreadable response: {e}"),
            })
        })?;
        if !envelope.status.is_success() {
            return Err(AttemptError::Fatal(ConsoleError::CommandFailed {
                command,
                message: envelope
                    .message
                    .unwrap_or_else(|| "remote reported failure".to_string()),
            }));
        }

        serde_json::from_str(&raw).map_err(|e| {
            AttemptError::Fatal(ConsoleError::CommandFailed {
                command,
                message: format!("unreadable response: {e}"),
            })
        })
    }
}

#[async_trait]
impl CommandGateway for HttpCommandGateway {
    async fn initialize(
        &self,
        payload_volume: f64,
        payload_mass: f64,
    ) -> ConsoleResult<InitializeResponse> {
        self.post(
            "initialize",
            &[
                ("payload_volume", payload_volume.to_string()),
                ("payload_mass", payload_mass.to_string()),
            ],
            None,
        )
        .await
    }

    async fn set_parameters(
        &self,
        frequency1: f64,
        frequency2: f64,
    ) -> ConsoleResult<SetParametersResponse> {
        self.post(
            "set_parameters",
            &[
                ("frequency1", frequency1.to_string()),
                ("frequency2", frequency2.to_string()),
            ],
            None,
        )
        .await
    }

    async fn update_energy(&self, dt: f64) -> ConsoleResult<EnergyUpdateResponse> {
        self.post("update_energy", &[("dt", dt.to_string())], None)
            .await
    }

    async fn form_bridge(&self) -> ConsoleResult<BridgeResponse> {
        self.post("form_bridge", &[], None).await
    }

    async fn transfer_payload(&self) -> ConsoleResult<TransferResponse> {
        self.post("transfer_payload", &[], None).await
    }

    async fn parameter_sweep(&self, request: SweepRequest) -> ConsoleResult<Vec<SweepCandidate>> {
        let response: SweepResponse = self
            .post(
                "parameter_sweep",
                &[
                    ("base_freq", request.base_freq.to_string()),
                    ("sweep_range", request.range.to_string()),
                    ("steps", request.steps.to_string()),
                ],
                None,
            )
            .await?;
        Ok(response.results)
    }

    async fn apply_optimal(&self, candidate: SweepCandidate) -> ConsoleResult<()> {
        let _: ResponseEnvelope = self
            .post(
                "apply_optimal_parameters",
                &[],
                Some(serde_json::to_value(&candidate).map_err(|e| {
                    ConsoleError::CommandFailed {
                        command: "apply_optimal_parameters",
                        message: e.to_string(),
                    }
                })?),
            )
            .await?;
        Ok(())
    }

    async fn scan_portal(&self, portal: PortalId) -> ConsoleResult<ScanResponse> {
        self.post(
            "scan_portal",
            &[("portal", portal.number().to_string())],
            None,
        )
        .await
    }

    async fn lock_portal(&self, portal: PortalId) -> ConsoleResult<LockResponse> {
        self.post(
            "lock_portal",
            &[("portal", portal.number().to_string())],
            None,
        )
        .await
    }

    async fn load_payload(
        &self,
        portal: PortalId,
        material: Material,
        volume_m3: f64,
        mass_kg: f64,
    ) -> ConsoleResult<()> {
        let _: ResponseEnvelope = self
            .post(
                "load_payload",
                &[],
                Some(json!({
                    "portal_id": portal.number(),
                    "payload_type": material,
                    "payload_volume": volume_m3,
                    "payload_mass": mass_kg,
                })),
            )
            .await?;
        Ok(())
    }
}
