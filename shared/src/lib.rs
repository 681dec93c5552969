//! Shared vocabulary for the dual-portal operator console
//!
//! Contains the wire-level data model and types used by both the console
//! core and its tests. Console-internal types (operator events, lock
//! states) live in the console crate.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;

pub use errors::*;
pub use types::*;

// Re-export the wire messages
pub use messages::{
    // Telemetry frames
    BridgeSnapshot, PortalSnapshot, SystemState,

    // Command request/response shapes
    BridgeResponse, EnergyUpdateResponse, InitializeResponse, LockResponse, ResponseEnvelope,
    ResponseStatus, ScanResponse, SetParametersResponse, SweepCandidate, SweepRequest,
    SweepResponse, TransferResponse,
};
