//! Service implementations
//!
//! Real implementations of the I/O service traits.

pub mod gateway;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use gateway::{CommandPolicy, HttpCommandGateway};
pub use telemetry::{ReconnectPolicy, WsTelemetryChannel};
