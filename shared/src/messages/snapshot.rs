//! Telemetry frame data model
//!
//! One inbound frame decodes to a [`SystemState`]; each frame is
//! authoritative for everything it contains and replaces the previous
//! snapshot wholesale.

use serde::{Deserialize, Serialize};

use crate::errors::{SharedError, SharedResult};
use crate::types::{PortalId, SystemStatus};

/// One endpoint's instantaneous state as reported by the apparatus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalSnapshot {
    /// Operating frequency (Hz)
    pub freq: f64,
    /// Stability metric, 0..1 expected
    pub stability: f64,
    /// Power draw (W)
    #[serde(default)]
    pub power: f64,
    /// Cumulative delivered energy (J)
    pub energy: f64,
    /// Floor/contact temperature (°C)
    #[serde(default)]
    pub floor_temp: f64,
    #[serde(default)]
    pub floor_contact: bool,
    pub safety_status: bool,
    /// Payload currently loaded (m³ / kg)
    #[serde(default)]
    pub payload_volume: f64,
    #[serde(default)]
    pub payload_mass: f64,
    /// Recent status strings; may grow unbounded upstream, display takes
    /// the tail
    #[serde(default)]
    pub status_log: Vec<String>,
}

/// Joint bridge state, flattened into the top level of the wire frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    /// Coupling strength; values above 0.5 denote an active link
    #[serde(rename = "bridge_strength", default)]
    pub strength: f64,
    /// Energy delivered across the bridge this session (J)
    #[serde(default)]
    pub transfer_energy: f64,
    /// Signed frequency difference (Hz); positive means endpoint 1 sends
    #[serde(default)]
    pub detune: f64,
    /// Joint status log
    #[serde(default)]
    pub status_log: Vec<String>,
}

/// Whole-system snapshot decoded from one inbound telemetry frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    pub status: SystemStatus,
    #[serde(default)]
    pub run_id: Option<String>,
    /// Endpoint snapshots; absent means "unknown", never zero
    #[serde(default)]
    pub portal1: Option<PortalSnapshot>,
    #[serde(default)]
    pub portal2: Option<PortalSnapshot>,
    #[serde(flatten)]
    pub bridge: BridgeSnapshot,
}

impl SystemState {
    /// Placeholder state before the first frame arrives
    pub fn disconnected() -> Self {
        Self {
            status: SystemStatus::Disconnected,
            run_id: None,
            portal1: None,
            portal2: None,
            bridge: BridgeSnapshot::default(),
        }
    }

    pub fn portal(&self, id: PortalId) -> Option<&PortalSnapshot> {
        match id {
            PortalId::One => self.portal1.as_ref(),
            PortalId::Two => self.portal2.as_ref(),
        }
    }

    /// Decode one raw frame. Malformed frames are reported, not applied.
    pub fn decode(raw: &str) -> SharedResult<SystemState> {
        serde_json::from_str(raw).map_err(|e| SharedError::FrameDecodeError {
            message: e.to_string(),
        })
    }
}
