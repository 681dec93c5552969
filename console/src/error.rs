//! Console error types
//!
//! Four failure classes gate the console's behavior: connectivity (channel
//! down), decode (malformed frame), command (remote refusal or transport
//! failure on a request), and precondition (local invariant violation,
//! rejected before any network call).

use shared::{PortalId, SharedError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("telemetry channel is not connected")]
    NotConnected,

    #[error("telemetry transport failed: {message}")]
    TransportFailed { message: String },

    #[error("telemetry frame rejected: {message}")]
    FrameDecode { message: String },

    #[error("command {command} failed: {message}")]
    CommandFailed {
        command: &'static str,
        message: String,
    },

    #[error("command {command} timed out")]
    CommandTimeout { command: &'static str },

    #[error("a parameter sweep is already running")]
    SweepInProgress,

    #[error("no sweep results to apply")]
    NoSweepResults,

    #[error("{portal} is already locked for transport")]
    AlreadyLocked { portal: PortalId },

    #[error("transport not ready: both portals must be locked")]
    TransportNotReady,

    #[error("coupling strength {strength:.2} is at or below the activation threshold")]
    CouplingBelowThreshold { strength: f64 },

    #[error("no payload staged in the loading bay")]
    NothingStaged,

    #[error("{portal} already has a payload assigned")]
    EndpointOccupied { portal: PortalId },

    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("shared component error")]
    Shared(#[from] SharedError),
}

impl ConsoleError {
    /// Local invariant violations, rejected before any network call
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ConsoleError::SweepInProgress
                | ConsoleError::NoSweepResults
                | ConsoleError::AlreadyLocked { .. }
                | ConsoleError::TransportNotReady
                | ConsoleError::CouplingBelowThreshold { .. }
                | ConsoleError::NothingStaged
                | ConsoleError::EndpointOccupied { .. }
                | ConsoleError::InvalidParameter { .. }
        )
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
