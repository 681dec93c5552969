//! Transport lock state machine and transfer gating
//!
//! Each endpoint moves `Idle → Locked` once per session; there is no
//! unlock. Joint readiness is the conjunction of both flags, recomputed on
//! every read. The transfer gate additionally requires a live coupling
//! reading above the activation threshold at the moment of the attempt.

use shared::{PortalId, COUPLING_ACTIVE_THRESHOLD};

use crate::error::{ConsoleError, ConsoleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockStatus {
    #[default]
    Idle,
    Locked,
}

#[derive(Debug, Default)]
pub struct TransportLocks {
    portal1: LockStatus,
    portal2: LockStatus,
}

impl TransportLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, portal: PortalId) -> LockStatus {
        match portal {
            PortalId::One => self.portal1,
            PortalId::Two => self.portal2,
        }
    }

    /// Pre-flight check for a lock command. Locked is terminal for the
    /// session, so re-locking is rejected locally.
    pub fn ensure_can_lock(&self, portal: PortalId) -> ConsoleResult<()> {
        match self.status(portal) {
            LockStatus::Idle => Ok(()),
            LockStatus::Locked => Err(ConsoleError::AlreadyLocked { portal }),
        }
    }

    /// Record a lock the apparatus confirmed.
    pub fn mark_locked(&mut self, portal: PortalId) {
        match portal {
            PortalId::One => self.portal1 = LockStatus::Locked,
            PortalId::Two => self.portal2 = LockStatus::Locked,
        }
    }

    /// Both endpoints locked. Pure conjunction of the two flags, never a
    /// disjunction, never cached.
    pub fn transport_ready(&self) -> bool {
        self.portal1 == LockStatus::Locked && self.portal2 == LockStatus::Locked
    }

    /// Session reset returns both endpoints to idle.
    pub fn reset(&mut self) {
        self.portal1 = LockStatus::Idle;
        self.portal2 = LockStatus::Idle;
    }
}

/// Gate for bridge formation: joint readiness plus a live channel.
pub fn ensure_bridge_permitted(locks: &TransportLocks, connected: bool) -> ConsoleResult<()> {
    if !locks.transport_ready() {
        return Err(ConsoleError::TransportNotReady);
    }
    if !connected {
        return Err(ConsoleError::NotConnected);
    }
    Ok(())
}

/// Gate for the physically irreversible transfer: joint readiness plus a
/// live coupling reading above the activation threshold. `live_strength`
/// must come from the latest snapshot at the moment of the attempt; a
/// stale (disconnected) reading arrives here as `None`.
pub fn ensure_transfer_permitted(
    locks: &TransportLocks,
    live_strength: Option<f64>,
) -> ConsoleResult<()> {
    if !locks.transport_ready() {
        return Err(ConsoleError::TransportNotReady);
    }
    match live_strength {
        None => Err(ConsoleError::NotConnected),
        Some(strength) if strength <= COUPLING_ACTIVE_THRESHOLD => {
            Err(ConsoleError::CouplingBelowThreshold { strength })
        }
        Some(_) => Ok(()),
    }
}
