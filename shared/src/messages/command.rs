//! Command request/response shapes for the apparatus API
//!
//! Every response carries at minimum a success/failure indicator; the
//! richer shapes add the fields the operator acts on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{DEFAULT_BASE_FREQ_HZ, DEFAULT_SWEEP_STEPS};

/// Success/failure discriminator carried by every response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

impl ResponseStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseStatus::Success)
    }
}

/// Minimal shape shared by every command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetParametersResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub portal1_freq: f64,
    #[serde(default)]
    pub portal2_freq: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyUpdateResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub portal1_energy: f64,
    #[serde(default)]
    pub portal2_energy: f64,
    #[serde(default)]
    pub dt: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub bridge_strength: f64,
    #[serde(default)]
    pub detune: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
    /// Whether the apparatus accepted the transfer across the bridge
    #[serde(default)]
    pub transfer_result: bool,
    #[serde(default)]
    pub bridge_strength: f64,
}

/// Scan responses carry free-text contents plus an optional hint of the
/// parameters the endpoint wants before transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub portal: u8,
    #[serde(default)]
    pub contents: Option<String>,
    #[serde(default)]
    pub required_params: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub portal: u8,
    /// Lock confirmation; false means the endpoint refused the lock
    #[serde(default)]
    pub locked: bool,
}

/// Bounded neighborhood of the current operating point to search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRequest {
    pub base_freq: f64,
    pub range: f64,
    pub steps: u32,
}

impl SweepRequest {
    /// Sweep around the default drive band
    pub fn around_default(range: f64) -> Self {
        Self {
            base_freq: DEFAULT_BASE_FREQ_HZ,
            range,
            steps: DEFAULT_SWEEP_STEPS,
        }
    }

    /// Sweep around a specific center frequency
    pub fn around(base_freq: f64, range: f64) -> Self {
        Self {
            base_freq,
            range,
            steps: DEFAULT_SWEEP_STEPS,
        }
    }
}

/// One candidate operating point evaluated by the remote simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepCandidate {
    pub freq1: f64,
    pub freq2: f64,
    #[serde(default)]
    pub energy1: f64,
    #[serde(default)]
    pub energy2: f64,
    /// Coupling strength the simulator computed for this candidate
    pub bridge_strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<SweepCandidate>,
}
