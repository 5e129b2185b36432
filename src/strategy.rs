//! Ordered strategy chains.
//!
//! Extraction tiers, segmentation strategies, and line grammars are all
//! expressed as lists of [`Strategy`] objects evaluated by [`first_success`]:
//! the first strategy whose [`attempt`](Strategy::attempt) succeeds wins, and
//! every attempt (accepted or not) is recorded in a [`Trace`].
//!
//! ```text
//! [s1, s2, s3] ──▶ s1.attempt ✗ ──▶ s2.attempt ✓ ──▶ (s2.name, output)
//!                     │                  │
//!                     ▼                  ▼
//!                 Trace: rejected    Trace: accepted
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a strategy declined its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    /// The input is not something this strategy handles (e.g. not a PDF).
    #[error("not applicable: {0}")]
    NotApplicable(String),
    /// The strategy ran but produced too little to be usable.
    #[error("insufficient output: {0}")]
    Insufficient(String),
    /// The strategy ran and failed outright.
    #[error("failed: {0}")]
    Failed(String),
}

/// One step of a strategy chain.
///
/// Implementations hold no mutable state; the same instance may be reused
/// across documents and threads.
pub trait Strategy<I: ?Sized, O>: Send + Sync {
    /// Stable identifier used in traces and logs.
    fn name(&self) -> &'static str;

    /// Try to produce an output from `input`.
    fn attempt(&self, input: &I) -> Result<O, StrategyError>;
}

/// Outcome of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Rejected,
}

/// A recorded attempt, exposed in the result's debug trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub stage: String,
    pub strategy: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Per-run log of strategy attempts.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    steps: Vec<TraceStep>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        stage: &str,
        strategy: &str,
        outcome: Outcome,
        detail: Option<String>,
    ) {
        self.steps.push(TraceStep {
            stage: stage.to_string(),
            strategy: strategy.to_string(),
            outcome,
            detail,
        });
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

/// Evaluate `strategies` in order and return the first success.
///
/// Every attempt is appended to `trace` under `stage`. Returns `None` when
/// all strategies decline.
pub fn first_success<I: ?Sized, O>(
    stage: &str,
    strategies: &[&dyn Strategy<I, O>],
    input: &I,
    trace: &mut Trace,
) -> Option<(&'static str, O)> {
    for strategy in strategies {
        match strategy.attempt(input) {
            Ok(output) => {
                tracing::debug!(stage, strategy = strategy.name(), "strategy accepted");
                trace.record(stage, strategy.name(), Outcome::Accepted, None);
                return Some((strategy.name(), output));
            }
            Err(e) => {
                tracing::debug!(stage, strategy = strategy.name(), reason = %e, "strategy rejected");
                trace.record(stage, strategy.name(), Outcome::Rejected, Some(e.to_string()));
            }
        }
    }
    None
}

/// Like [`first_success`] but without recording a trace.
///
/// Used for high-volume chains such as per-line grammars, where tracing each
/// line would drown the useful entries.
pub fn first_match<I: ?Sized, O>(strategies: &[&dyn Strategy<I, O>], input: &I) -> Option<O> {
    strategies.iter().find_map(|s| s.attempt(input).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, Option<usize>);

    impl Strategy<str, usize> for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn attempt(&self, _input: &str) -> Result<usize, StrategyError> {
            self.1
                .ok_or_else(|| StrategyError::Insufficient("nothing".to_string()))
        }
    }

    #[test]
    fn test_first_success_picks_earliest_accepting() {
        let a = Fixed("a", None);
        let b = Fixed("b", Some(2));
        let c = Fixed("c", Some(3));
        let chain: [&dyn Strategy<str, usize>; 3] = [&a, &b, &c];
        let mut trace = Trace::new();
        let got = first_success("test", &chain, "input", &mut trace);
        assert_eq!(got, Some(("b", 2)));
        assert_eq!(trace.steps().len(), 2);
        assert_eq!(trace.steps()[0].outcome, Outcome::Rejected);
        assert_eq!(trace.steps()[1].strategy, "b");
        assert_eq!(trace.steps()[1].outcome, Outcome::Accepted);
    }

    #[test]
    fn test_first_success_all_rejected() {
        let a = Fixed("a", None);
        let chain: [&dyn Strategy<str, usize>; 1] = [&a];
        let mut trace = Trace::new();
        let got = first_success("test", &chain, "input", &mut trace);
        assert!(got.is_none());
        assert_eq!(
            trace.steps()[0].detail.as_deref(),
            Some("insufficient output: nothing")
        );
    }

    #[test]
    fn test_first_match_order_matters() {
        let b = Fixed("b", Some(2));
        let c = Fixed("c", Some(3));
        let reversed: [&dyn Strategy<str, usize>; 2] = [&c, &b];
        let forward: [&dyn Strategy<str, usize>; 2] = [&b, &c];
        assert_eq!(first_match(&reversed, "x"), Some(3));
        assert_eq!(first_match(&forward, "x"), Some(2));
    }
}
