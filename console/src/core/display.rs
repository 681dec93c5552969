//! Derived display thresholds
//!
//! Presentation policy layered over snapshot fields, kept as pure
//! functions separate from the stateful gating components.

use shared::{PortalId, COUPLING_ACTIVE_THRESHOLD};

/// Number of status-log lines shown to the operator
pub const RECENT_LOG_LINES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplingBand {
    Inactive,
    Forming,
    Active,
}

pub fn coupling_band(strength: f64) -> CouplingBand {
    if strength > COUPLING_ACTIVE_THRESHOLD {
        CouplingBand::Active
    } else if strength > 0.1 {
        CouplingBand::Forming
    } else {
        CouplingBand::Inactive
    }
}

pub fn coupling_active(strength: f64) -> bool {
    coupling_band(strength) == CouplingBand::Active
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    Nominal,
    Elevated,
    Critical,
}

pub fn temperature_band(temp_c: f64) -> TemperatureBand {
    if temp_c > 100.0 {
        TemperatureBand::Critical
    } else if temp_c > 50.0 {
        TemperatureBand::Elevated
    } else {
        TemperatureBand::Nominal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerBand {
    Low,
    Medium,
    High,
}

pub fn power_band(power_w: f64) -> PowerBand {
    if power_w > 1000.0 {
        PowerBand::High
    } else if power_w > 500.0 {
        PowerBand::Medium
    } else {
        PowerBand::Low
    }
}

/// Which endpoint is sending, from the detune sign: positive detune means
/// endpoint 1 drives energy and payload toward endpoint 2. Zero detune has
/// no direction.
pub fn transfer_direction(detune_hz: f64) -> Option<PortalId> {
    if detune_hz > 0.0 {
        Some(PortalId::One)
    } else if detune_hz < 0.0 {
        Some(PortalId::Two)
    } else {
        None
    }
}

/// Tail of a status log for display; the log itself may grow unbounded
/// upstream.
pub fn recent_log(log: &[String]) -> &[String] {
    let start = log.len().saturating_sub(RECENT_LOG_LINES);
    &log[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coupling_bands() {
        assert_eq!(coupling_band(0.0), CouplingBand::Inactive);
        assert_eq!(coupling_band(0.1), CouplingBand::Inactive);
        assert_eq!(coupling_band(0.3), CouplingBand::Forming);
        assert_eq!(coupling_band(0.5), CouplingBand::Forming);
        assert_eq!(coupling_band(0.51), CouplingBand::Active);
        assert!(coupling_active(0.62));
        assert!(!coupling_active(0.5));
    }

    #[test]
    fn temperature_bands() {
        assert_eq!(temperature_band(-196.0), TemperatureBand::Nominal);
        assert_eq!(temperature_band(50.0), TemperatureBand::Nominal);
        assert_eq!(temperature_band(75.0), TemperatureBand::Elevated);
        assert_eq!(temperature_band(101.0), TemperatureBand::Critical);
    }

    #[test]
    fn power_bands() {
        assert_eq!(power_band(100.0), PowerBand::Low);
        assert_eq!(power_band(750.0), PowerBand::Medium);
        assert_eq!(power_band(13_500.0), PowerBand::High);
    }

    #[test]
    fn detune_sign_gives_direction() {
        assert_eq!(transfer_direction(0.08), Some(PortalId::One));
        assert_eq!(transfer_direction(-0.08), Some(PortalId::Two));
        assert_eq!(transfer_direction(0.0), None);
    }

    #[test]
    fn recent_log_takes_the_tail() {
        let log: Vec<String> = (0..8).map(|i| format!("line {i}")).collect();
        let tail = recent_log(&log);
        assert_eq!(tail.len(), RECENT_LOG_LINES);
        assert_eq!(tail[0], "line 3");
        assert_eq!(tail[4], "line 7");

        let short: Vec<String> = vec!["only".into()];
        assert_eq!(recent_log(&short).len(), 1);
    }
}
