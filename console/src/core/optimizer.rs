//! Parameter sweep state machine
//!
//! `Idle → Running → (Idle | IdleWithResults)`. The transition into
//! Running is two-phase (`begin` before the request, `complete`/`fail`
//! after) so the one-sweep-in-flight invariant holds across the await
//! without holding a lock over it.

use shared::SweepCandidate;

use crate::error::{ConsoleError, ConsoleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepPhase {
    #[default]
    Idle,
    Running,
    IdleWithResults,
}

#[derive(Debug, Default)]
pub struct SweepOptimizer {
    phase: SweepPhase,
    results: Vec<SweepCandidate>,
}

impl SweepOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SweepPhase {
        self.phase
    }

    pub fn results(&self) -> &[SweepCandidate] {
        &self.results
    }

    /// Claim the single in-flight sweep slot. A second sweep while one is
    /// running is rejected here, before any network call.
    pub fn begin(&mut self) -> ConsoleResult<()> {
        if self.phase == SweepPhase::Running {
            return Err(ConsoleError::SweepInProgress);
        }
        self.phase = SweepPhase::Running;
        Ok(())
    }

    /// Store the result set of a completed sweep, preserving remote order.
    pub fn complete(&mut self, results: Vec<SweepCandidate>) {
        self.results = results;
        self.phase = SweepPhase::IdleWithResults;
    }

    /// A failed sweep leaves an empty result set behind.
    pub fn fail(&mut self) {
        self.results.clear();
        self.phase = SweepPhase::Idle;
    }

    /// Forget everything, back to session start.
    pub fn reset(&mut self) {
        self.results.clear();
        self.phase = SweepPhase::Idle;
    }

    /// Select the candidate with maximum coupling strength. Ties break to
    /// the first-seen candidate in remote order, so selection is
    /// deterministic. The result set is not consumed; applying the same
    /// optimum twice is allowed.
    pub fn select_optimal(&self) -> ConsoleResult<&SweepCandidate> {
        if self.phase == SweepPhase::Running {
            return Err(ConsoleError::SweepInProgress);
        }
        let mut best: Option<&SweepCandidate> = None;
        for candidate in &self.results {
            match best {
                Some(current) if candidate.bridge_strength <= current.bridge_strength => {}
                _ => best = Some(candidate),
            }
        }
        best.ok_or(ConsoleError::NoSweepResults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(freq: f64, strength: f64) -> SweepCandidate {
        SweepCandidate {
            freq1: freq,
            freq2: freq,
            energy1: 9000.0,
            energy2: 9000.0,
            bridge_strength: strength,
        }
    }

    #[test]
    fn second_sweep_is_rejected_while_running() {
        let mut optimizer = SweepOptimizer::new();
        optimizer.begin().unwrap();
        assert!(matches!(
            optimizer.begin(),
            Err(ConsoleError::SweepInProgress)
        ));

        optimizer.complete(vec![candidate(32.0, 0.5)]);
        assert!(optimizer.begin().is_ok());
    }

    #[test]
    fn select_optimal_on_empty_results_is_an_error() {
        let optimizer = SweepOptimizer::new();
        assert!(matches!(
            optimizer.select_optimal(),
            Err(ConsoleError::NoSweepResults)
        ));
    }

    #[test]
    fn select_optimal_is_rejected_mid_sweep() {
        let mut optimizer = SweepOptimizer::new();
        optimizer.begin().unwrap();
        assert!(matches!(
            optimizer.select_optimal(),
            Err(ConsoleError::SweepInProgress)
        ));
    }

    #[test]
    fn selection_takes_maximum_strength() {
        let mut optimizer = SweepOptimizer::new();
        optimizer.begin().unwrap();
        optimizer.complete(vec![
            candidate(31.0, 0.41),
            candidate(32.0, 0.73),
            candidate(33.0, 0.52),
        ]);
        assert_eq!(optimizer.select_optimal().unwrap().freq1, 32.0);
    }

    #[test]
    fn ties_break_to_first_seen() {
        let mut optimizer = SweepOptimizer::new();
        optimizer.begin().unwrap();
        optimizer.complete(vec![
            candidate(30.0, 0.6),
            candidate(31.0, 0.6),
            candidate(34.0, 0.2),
        ]);
        assert_eq!(optimizer.select_optimal().unwrap().freq1, 30.0);
    }

    #[test]
    fn results_survive_selection() {
        let mut optimizer = SweepOptimizer::new();
        optimizer.begin().unwrap();
        optimizer.complete(vec![candidate(32.0, 0.7)]);
        let first = optimizer.select_optimal().unwrap().clone();
        let second = optimizer.select_optimal().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(optimizer.phase(), SweepPhase::IdleWithResults);
    }

    #[test]
    fn failure_clears_results() {
        let mut optimizer = SweepOptimizer::new();
        optimizer.begin().unwrap();
        optimizer.complete(vec![candidate(32.0, 0.7)]);
        optimizer.begin().unwrap();
        optimizer.fail();
        assert_eq!(optimizer.phase(), SweepPhase::Idle);
        assert!(optimizer.results().is_empty());
    }
}
