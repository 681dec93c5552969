//! Core types used throughout the console system

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SharedError;

/// Coupling strength above which the bridge counts as active. Transfers are
/// gated on a live reading exceeding this value.
pub const COUPLING_ACTIVE_THRESHOLD: f64 = 0.5;

/// Operating frequency band accepted by the apparatus (Hz).
pub const FREQ_MIN_HZ: f64 = 1.0;
pub const FREQ_MAX_HZ: f64 = 100.0;

/// Main portal drive frequency used as the default sweep center (Hz).
pub const DEFAULT_BASE_FREQ_HZ: f64 = 32.0;

/// Default number of candidates evaluated per sweep.
pub const DEFAULT_SWEEP_STEPS: u32 = 10;

/// Upper bound on a sane payload volume (m³).
pub const VOLUME_MAX_M3: f64 = 10.0;

/// Identifier for one of the two apparatus endpoints
///
/// The endpoints are structurally identical but are never merged; identity
/// is carried everywhere a per-endpoint state or command exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalId {
    One,
    Two,
}

impl PortalId {
    pub const BOTH: [PortalId; 2] = [PortalId::One, PortalId::Two];

    /// Wire-level endpoint number (1 or 2)
    pub fn number(&self) -> u8 {
        match self {
            PortalId::One => 1,
            PortalId::Two => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<PortalId> {
        match n {
            1 => Some(PortalId::One),
            2 => Some(PortalId::Two),
            _ => None,
        }
    }

    /// The opposite endpoint
    pub fn other(&self) -> PortalId {
        match self {
            PortalId::One => PortalId::Two,
            PortalId::Two => PortalId::One,
        }
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "portal {}", self.number())
    }
}

/// Connection-level status reported inside a telemetry frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    Disconnected,
    Connected,
    Initializing,
    Running,
    Error,
}

impl SystemStatus {
    /// Whether endpoint and bridge fields in the same frame are meaningful
    pub fn is_live(&self) -> bool {
        !matches!(self, SystemStatus::Disconnected)
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SystemStatus::Disconnected => "disconnected",
            SystemStatus::Connected => "connected",
            SystemStatus::Initializing => "initializing",
            SystemStatus::Running => "running",
            SystemStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Payload material catalogue
///
/// Densities are fixed physical constants, not operator-editable; the
/// ledger derives mass from volume (and back) through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Gold,
    Wood,
    Aluminum,
    Biological,
}

impl Material {
    pub const ALL: [Material; 4] = [
        Material::Gold,
        Material::Wood,
        Material::Aluminum,
        Material::Biological,
    ];

    /// Density in kg/m³
    pub fn density(&self) -> f64 {
        match self {
            Material::Gold => 19_300.0,
            Material::Wood => 600.0,
            Material::Aluminum => 2_700.0,
            Material::Biological => 1_000.0,
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Material::Gold => "Gold",
            Material::Wood => "Wood",
            Material::Aluminum => "Aluminum",
            Material::Biological => "Biological",
        };
        f.write_str(name)
    }
}

impl FromStr for Material {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Gold" => Ok(Material::Gold),
            "Wood" => Ok(Material::Wood),
            "Aluminum" => Ok(Material::Aluminum),
            "Biological" => Ok(Material::Biological),
            other => Err(SharedError::ProtocolError {
                message: format!("unknown material: {other}"),
            }),
        }
    }
}
