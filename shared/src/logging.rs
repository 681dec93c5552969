//! Tracing setup shared by the console binary and its tests

use chrono::{DateTime, Utc};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber with per-crate levels.
///
/// Noisy transport crates are pinned to `warn` so the operator log stays
/// readable at `debug`.
pub fn init_tracing(log_level: Option<&str>) {
    fmt()
        .with_env_filter(EnvFilter::new(filter_directives(log_level)))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Same as [`init_tracing`] but tolerates an already-installed subscriber,
/// which is the normal situation inside the test harness.
pub fn init_tracing_for_tests() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(filter_directives(Some("debug"))))
        .with_target(false)
        .with_test_writer()
        .try_init();
}

fn filter_directives(log_level: Option<&str>) -> String {
    let base = log_level.unwrap_or("info");
    format!("console={base},shared={base},tungstenite=warn,tokio_tungstenite=warn,reqwest=warn,hyper=warn")
}

/// Formatted timestamp for operator-facing log lines
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_uses_requested_level() {
        let directives = filter_directives(Some("trace"));
        assert!(directives.contains("console=trace"));
        assert!(directives.contains("tungstenite=warn"));

        let directives = filter_directives(None);
        assert!(directives.contains("console=info"));
    }
}
