//! Wire messages exchanged with the apparatus backend
//!
//! Split by boundary: `snapshot` holds the streaming telemetry frame model,
//! `command` the request/response shapes of the command API.

pub mod command;
pub mod snapshot;

pub use command::{
    BridgeResponse, EnergyUpdateResponse, InitializeResponse, LockResponse, ResponseEnvelope,
    ResponseStatus, ScanResponse, SetParametersResponse, SweepCandidate, SweepRequest,
    SweepResponse, TransferResponse,
};
pub use snapshot::{BridgeSnapshot, PortalSnapshot, SystemState};
