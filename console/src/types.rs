//! Console-internal event types
//!
//! These never cross the wire; only the messages in `shared` do.

use shared::{PortalId, SystemState};

use crate::core::transport::LockStatus;

/// Events emitted by the telemetry channel
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// Transport established
    Connected,
    /// One decoded inbound frame; replaces the previous snapshot wholesale
    Frame(Box<SystemState>),
    /// Transport closed or failed; emitted exactly once per connection
    Disconnected,
}

/// Operator-facing updates broadcast by the console
///
/// Command and precondition failures are pushed here as well as returned to
/// the caller, so they are always observable at the operator surface.
#[derive(Debug, Clone)]
pub enum ConsoleUpdate {
    ConnectionChanged {
        connected: bool,
    },
    Snapshot(Box<SystemState>),
    LockChanged {
        portal: PortalId,
        status: LockStatus,
        transport_ready: bool,
    },
    SweepCompleted {
        candidates: usize,
        best_strength: Option<f64>,
    },
    TransferAttempted {
        accepted: bool,
        bridge_strength: f64,
    },
    PayloadCommitted {
        portal: PortalId,
    },
    SessionReset {
        run_id: Option<String>,
    },
    CommandError {
        command: &'static str,
        message: String,
    },
}
