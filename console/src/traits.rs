//! Service trait definitions for dependency injection
//!
//! All I/O operations are abstracted through these traits for testability

use async_trait::async_trait;
use tokio::sync::mpsc;

use shared::{
    BridgeResponse, EnergyUpdateResponse, InitializeResponse, LockResponse, Material, PortalId,
    ScanResponse, SetParametersResponse, SweepCandidate, SweepRequest, TransferResponse,
};

use crate::error::ConsoleResult;
use crate::types::TelemetryEvent;

/// Streaming telemetry service trait
///
/// Owns the single duplex connection to the apparatus. The channel is
/// receive-only; nothing is ever written back over it.
#[mockall::automock]
#[async_trait]
pub trait TelemetryChannel: Send + Sync {
    /// Open the connection and start decoding inbound frames
    async fn connect(&mut self) -> ConsoleResult<()>;

    /// Take the inbound event stream (single consumer; can only be called once)
    async fn updates(&mut self) -> ConsoleResult<mpsc::Receiver<TelemetryEvent>>;

    /// Current connectivity
    async fn is_connected(&self) -> bool;

    /// Tear down the transport; idempotent under repeated calls
    async fn disconnect(&self) -> ConsoleResult<()>;
}

/// Command gateway service trait
///
/// One typed method per request/response operation of the apparatus API.
/// Each call is a single exchange: no queuing, no client-side mutual
/// exclusion, no automatic retry. Callers that need ordering impose it
/// themselves.
#[mockall::automock]
#[async_trait]
pub trait CommandGateway: Send + Sync {
    async fn initialize(
        &self,
        payload_volume: f64,
        payload_mass: f64,
    ) -> ConsoleResult<InitializeResponse>;

    async fn set_parameters(
        &self,
        frequency1: f64,
        frequency2: f64,
    ) -> ConsoleResult<SetParametersResponse>;

    async fn update_energy(&self, dt: f64) -> ConsoleResult<EnergyUpdateResponse>;

    async fn form_bridge(&self) -> ConsoleResult<BridgeResponse>;

    async fn transfer_payload(&self) -> ConsoleResult<TransferResponse>;

    async fn parameter_sweep(&self, request: SweepRequest) -> ConsoleResult<Vec<SweepCandidate>>;

    async fn apply_optimal(&self, candidate: SweepCandidate) -> ConsoleResult<()>;

    async fn scan_portal(&self, portal: PortalId) -> ConsoleResult<ScanResponse>;

    async fn lock_portal(&self, portal: PortalId) -> ConsoleResult<LockResponse>;

    async fn load_payload(
        &self,
        portal: PortalId,
        material: Material,
        volume_m3: f64,
        mass_kg: f64,
    ) -> ConsoleResult<()>;
}
