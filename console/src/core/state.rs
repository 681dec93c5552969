//! Live mirror of remote apparatus state
//!
//! Holds the latest decoded frame and the channel connectivity flag. A
//! frame replaces the previous snapshot wholesale; there are no partial
//! merge semantics. The last snapshot is retained for display after a
//! disconnect but never satisfies a liveness-gated read.

use shared::{SystemState, SystemStatus};

#[derive(Debug, Default)]
pub struct ConsoleState {
    latest: Option<SystemState>,
    connected: bool,
    frames_applied: u64,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one inbound frame, replacing the previous snapshot wholesale.
    pub fn apply_frame(&mut self, frame: SystemState) {
        self.latest = Some(frame);
        self.frames_applied += 1;
    }

    /// Update connectivity. Returns true when the value actually changed,
    /// so repeated close events collapse to a single transition.
    pub fn set_connected(&mut self, connected: bool) -> bool {
        if self.connected == connected {
            return false;
        }
        self.connected = connected;
        true
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Latest snapshot, retained even when stale
    pub fn snapshot(&self) -> Option<&SystemState> {
        self.latest.as_ref()
    }

    pub fn frames_applied(&self) -> u64 {
        self.frames_applied
    }

    pub fn run_id(&self) -> Option<&str> {
        self.latest.as_ref().and_then(|s| s.run_id.as_deref())
    }

    /// Coupling strength usable for gating a physical action: requires a
    /// live channel and a live-status snapshot. A stale reading is never
    /// returned here.
    pub fn live_bridge_strength(&self) -> Option<f64> {
        if !self.connected {
            return None;
        }
        self.latest
            .as_ref()
            .filter(|s| s.status != SystemStatus::Disconnected)
            .map(|s| s.bridge.strength)
    }
}
