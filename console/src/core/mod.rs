//! Core business logic
//!
//! Pure state machines with no I/O dependencies. All I/O goes through the
//! service traits; cross-component reads go through the shared snapshot.

pub mod display;
pub mod optimizer;
pub mod payload;
pub mod state;
pub mod transport;

pub use optimizer::{SweepOptimizer, SweepPhase};
pub use payload::{PayloadDescriptor, PayloadLedger};
pub use state::ConsoleState;
pub use transport::{LockStatus, TransportLocks};
