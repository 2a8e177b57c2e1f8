//! Scenario runner
//!
//! A [`Scenario`] is an ordered list of named steps sharing mutable state,
//! executed strictly one at a time. Step-level assertion failures are
//! recorded in the ledger and the run proceeds to the next step; only a
//! precondition step that signals [`StepFlow::Fatal`] halts the sequence
//! early. The runner owns the shared state for the duration of the run
//! and passes it by reference into each step.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use libris_domain::{
    Ledger, Outcome, RequestSpec, ResolutionTier, ScenarioState, StatusExpectation, Targets,
};
use tracing::{debug, info, warn};

use crate::ports::Dispatch;

/// What a step tells the runner about how to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepFlow {
    /// Proceed to the next step, whatever this one recorded.
    Continue,
    /// A required precondition does not hold; abort the remaining
    /// sequence. Reserved for "target unreachable at startup" checks,
    /// never for ordinary assertion failures.
    Fatal(String),
}

/// Boxed future returned by a step body.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = StepFlow> + Send + 'a>>;

/// A step body: a plain `async fn` over the step context.
pub type StepFn = for<'a, 'b> fn(&'a mut StepContext<'b>) -> StepFuture<'a>;

/// One named step of a scenario.
#[derive(Clone, Copy)]
pub struct Step {
    name: &'static str,
    run: StepFn,
}

impl Step {
    /// Creates a named step.
    #[must_use]
    pub const fn new(name: &'static str, run: StepFn) -> Self {
        Self { name, run }
    }

    /// The step's name, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}

/// Everything a step may touch: the dispatcher, the target addresses,
/// the shared scenario state, and the assertion ledger.
pub struct StepContext<'a> {
    dispatcher: &'a dyn Dispatch,
    /// Collaborator base addresses for this run.
    pub targets: &'a Targets,
    /// Cross-step mutable state.
    pub state: &'a mut ScenarioState,
    /// The run's assertion ledger.
    pub ledger: &'a mut Ledger,
}

impl StepContext<'_> {
    /// Dispatches a request without recording any judgement.
    pub async fn dispatch(&self, request: &RequestSpec) -> Outcome {
        let outcome = self.dispatcher.dispatch(request).await;
        if let Some(body) = outcome.body() {
            debug!(target = %request.target, body, "response received");
        }
        outcome
    }

    /// Dispatches a request and records a status assertion.
    pub async fn expect(
        &mut self,
        step: &str,
        request: &RequestSpec,
        expected: StatusExpectation,
    ) -> Outcome {
        let outcome = self.dispatch(request).await;
        let record = self
            .ledger
            .assert_status(step, Some(expected), &outcome);
        if record.passed {
            info!(step, actual = %record.actual, "ok");
        } else {
            warn!(step, expected = %record.expected, actual = %record.actual, "mismatch");
        }
        outcome
    }

    /// Dispatches a request and records an informational (always-pass)
    /// entry, for steps that probe and display without a claim.
    pub async fn probe(&mut self, step: &str, request: &RequestSpec) -> Outcome {
        let outcome = self.dispatch(request).await;
        let record = self.ledger.assert_status(step, None, &outcome);
        info!(step, actual = %record.actual, "probed");
        outcome
    }
}

/// Lifecycle of one scenario run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioStatus {
    /// Not started yet.
    Pending,
    /// Steps are executing.
    Running,
    /// All steps executed; assertion failures do not prevent completion.
    Completed,
    /// A precondition step signalled a hard stop.
    Aborted {
        /// Name of the step that aborted the run.
        step: String,
        /// The step's stated reason.
        reason: String,
    },
}

/// An ordered, named sequence of steps executed once per run.
#[derive(Debug)]
pub struct Scenario {
    name: String,
    steps: Vec<Step>,
    pacing: Duration,
    status: ScenarioStatus,
}

impl Scenario {
    /// Creates a scenario with no inter-step pacing.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
            pacing: Duration::ZERO,
            status: ScenarioStatus::Pending,
        }
    }

    /// Sets a fixed delay between steps. This is cooperative pacing to
    /// let the backend settle between dependent operations, not a
    /// correctness dependency; zero is fine against a strongly
    /// consistent target.
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// The scenario's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> &ScenarioStatus {
        &self.status
    }

    /// Executes every step in declaration order, blocking on each one
    /// before starting the next.
    ///
    /// Returns the final status: `Completed` once all steps have run, or
    /// `Aborted` when a step signalled a fatal precondition failure. The
    /// ledger accumulates records either way.
    pub async fn run(
        &mut self,
        dispatcher: &dyn Dispatch,
        targets: &Targets,
        state: &mut ScenarioState,
        ledger: &mut Ledger,
    ) -> ScenarioStatus {
        self.status = ScenarioStatus::Running;
        info!(scenario = %self.name, steps = self.steps.len(), "scenario started");

        let mut ctx = StepContext {
            dispatcher,
            targets,
            state,
            ledger,
        };

        let last = self.steps.len().saturating_sub(1);
        for (index, step) in self.steps.iter().enumerate() {
            info!(scenario = %self.name, step = step.name(), "step started");
            match (step.run)(&mut ctx).await {
                StepFlow::Continue => {}
                StepFlow::Fatal(reason) => {
                    warn!(scenario = %self.name, step = step.name(), %reason, "aborting run");
                    self.status = ScenarioStatus::Aborted {
                        step: step.name().to_string(),
                        reason,
                    };
                    return self.status.clone();
                }
            }
            if index < last && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        self.status = ScenarioStatus::Completed;
        info!(scenario = %self.name, "scenario completed");
        self.status.clone()
    }
}

/// Resolves a previously created entity id in three tiers: the id stored
/// by an earlier step, then a lazy secondary lookup, then a hardcoded
/// default. Later steps never fail merely because an earlier optional
/// step produced nothing.
pub async fn resolve_id<T, F, Fut>(stored: Option<T>, lookup: F, default: T) -> (T, ResolutionTier)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<T>> + Send,
{
    if let Some(id) = stored {
        return (id, ResolutionTier::Stored);
    }
    match lookup().await {
        Some(id) => (id, ResolutionTier::Lookup),
        None => (default, ResolutionTier::Default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use libris_domain::{EndpointTarget, HttpMethod};
    use pretty_assertions::assert_eq;

    struct CannedDispatch(Outcome);

    #[async_trait]
    impl Dispatch for CannedDispatch {
        async fn dispatch(&self, _request: &RequestSpec) -> Outcome {
            self.0.clone()
        }
    }

    fn targets() -> Targets {
        Targets::from_strs(
            "http://localhost:8080",
            "http://localhost:8081",
            "http://localhost:8082",
            "http://localhost:8083/loan",
        )
        .unwrap()
    }

    fn books_request(targets: &Targets) -> RequestSpec {
        RequestSpec::new(EndpointTarget::rest(
            HttpMethod::Get,
            &targets.book_base,
            "/api/books",
        ))
    }

    fn failing_step<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
        Box::pin(async move {
            let request = books_request(ctx.targets);
            ctx.expect("failing claim", &request, StatusExpectation::exact(404))
                .await;
            StepFlow::Continue
        })
    }

    fn passing_step<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
        Box::pin(async move {
            let request = books_request(ctx.targets);
            ctx.expect("passing claim", &request, StatusExpectation::exact(200))
                .await;
            StepFlow::Continue
        })
    }

    fn fatal_step<'a>(ctx: &'a mut StepContext<'_>) -> StepFuture<'a> {
        Box::pin(async move {
            let request = books_request(ctx.targets);
            let outcome = ctx.probe("service check", &request).await;
            if outcome.is_received() {
                StepFlow::Continue
            } else {
                StepFlow::Fatal("service not reachable".to_string())
            }
        })
    }

    #[tokio::test]
    async fn test_assertion_failure_does_not_abort() {
        let dispatcher = CannedDispatch(Outcome::received(200, "[]"));
        let mut scenario = Scenario::new(
            "isolation",
            vec![
                Step::new("fails", failing_step),
                Step::new("passes", passing_step),
            ],
        );
        let mut state = ScenarioState::new();
        let mut ledger = Ledger::new();

        let status = scenario
            .run(&dispatcher, &targets(), &mut state, &mut ledger)
            .await;

        assert_eq!(status, ScenarioStatus::Completed);
        let summary = ledger.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_fatal_precondition_aborts_remaining_steps() {
        let dispatcher = CannedDispatch(Outcome::connection_error());
        let mut scenario = Scenario::new(
            "precondition",
            vec![
                Step::new("check", fatal_step),
                Step::new("never runs", passing_step),
            ],
        );
        let mut state = ScenarioState::new();
        let mut ledger = Ledger::new();

        let status = scenario
            .run(&dispatcher, &targets(), &mut state, &mut ledger)
            .await;

        assert_eq!(
            status,
            ScenarioStatus::Aborted {
                step: "check".to_string(),
                reason: "service not reachable".to_string(),
            }
        );
        // Only the probe recorded; the second step never ran.
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_informational_probe_passes_on_failure_outcome() {
        let dispatcher = CannedDispatch(Outcome::timeout());
        let mut scenario = Scenario::new("probe", vec![Step::new("check", fatal_step)]);
        let mut state = ScenarioState::new();
        let mut ledger = Ledger::new();

        scenario
            .run(&dispatcher, &targets(), &mut state, &mut ledger)
            .await;

        assert!(ledger.records()[0].passed);
    }

    #[tokio::test]
    async fn test_resolve_id_prefers_stored() {
        let (id, tier) = resolve_id(Some(7_i64), || async { Some(99) }, 1).await;
        assert_eq!((id, tier), (7, ResolutionTier::Stored));
    }

    #[tokio::test]
    async fn test_resolve_id_falls_back_to_lookup_then_default() {
        let (id, tier) = resolve_id(None, || async { Some(99_i64) }, 1).await;
        assert_eq!((id, tier), (99, ResolutionTier::Lookup));

        let (id, tier) = resolve_id(None, || async { None }, 1_i64).await;
        assert_eq!((id, tier), (1, ResolutionTier::Default));
    }
}
