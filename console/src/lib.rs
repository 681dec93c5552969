//! Operator console core for the dual-portal apparatus
//!
//! Maintains a live mirror of remote apparatus state over a streaming
//! telemetry channel, drives request/response commands through a gateway,
//! and gates the transport sequence (scan → lock → bridge → transfer)
//! behind per-endpoint lock state and a live coupling-strength check.

pub mod config;
pub mod console_impl;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use config::ConsoleConfig;
pub use console_impl::Console;
pub use error::{ConsoleError, ConsoleResult};
pub use types::{ConsoleUpdate, TelemetryEvent};

// Re-export trait definitions
pub use traits::{CommandGateway, TelemetryChannel};

// Re-export service implementations
pub use services::{CommandPolicy, HttpCommandGateway, ReconnectPolicy, WsTelemetryChannel};
