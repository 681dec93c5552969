//! Service tests
//!
//! Exercise the real telemetry channel and command gateway against local
//! stand-in backends.
