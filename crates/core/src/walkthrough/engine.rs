use std::fmt::Debug;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::dataset::Dataset;
use crate::errors::StepError;
use crate::walkthrough::states::{Snapshot, WalkthroughKind};

/// One step of a walkthrough: reads the previous trace and the dataset, returns the next
/// trace. Never mutates its input, so a failed step leaves the committed trace untouched.
pub type StepFn<T> = fn(&Dataset, &T) -> Result<T, StepError>;

/// A walkthrough's step table is a `'static` array of plain functions, so its trace type
/// must be `'static` as well.
pub trait Walkthrough {
    type Trace: Clone + Debug + Default + PartialEq + Serialize + 'static;

    fn kind(&self) -> WalkthroughKind;

    fn dataset(&self) -> &Dataset;

    /// Step 1: validates the input and captures it into a fresh trace.
    fn capture(&self, input: &str) -> Result<Self::Trace, StepError>;

    /// Steps `2..=max_steps`, in order.
    fn steps(&self) -> &'static [StepFn<Self::Trace>];

    fn max_steps(&self) -> u8 {
        self.kind().max_steps()
    }
}

#[derive(Clone, Debug)]
struct ActiveRun<T> {
    input: String,
    current_step: u8,
    trace: T,
}

/// Deterministic, manually paced driver for a [`Walkthrough`].
///
/// Every operation is synchronous and all-or-nothing: when it returns an error the engine
/// is exactly as it was before the call.
pub struct StepMachine<W>
where
    W: Walkthrough,
{
    walkthrough: W,
    run: Option<ActiveRun<W::Trace>>,
}

impl<W> StepMachine<W>
where
    W: Walkthrough,
{
    pub fn new(walkthrough: W) -> Self {
        Self { walkthrough, run: None }
    }

    pub fn kind(&self) -> WalkthroughKind {
        self.walkthrough.kind()
    }

    pub fn max_steps(&self) -> u8 {
        self.walkthrough.max_steps()
    }

    pub fn current_step(&self) -> u8 {
        self.run.as_ref().map(|run| run.current_step).unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.current_step() == self.max_steps()
    }

    /// Starts a new run at step 1. Re-initializing an active run with the same input is a
    /// no-op that returns the current snapshot.
    pub fn initialize(&mut self, input: &str) -> Result<Snapshot<W::Trace>, StepError> {
        if input.trim().is_empty() {
            return Err(StepError::InvalidInput);
        }
        if let Some(run) = &self.run {
            if run.input == input {
                debug!(
                    event_name = "walkthrough.initialize_skipped",
                    kind = self.kind().as_str(),
                    current_step = run.current_step,
                    "input already active"
                );
                return Ok(self.snapshot());
            }
        }

        let trace = self.walkthrough.capture(input)?;
        self.run = Some(ActiveRun { input: input.to_owned(), current_step: 1, trace });
        info!(
            event_name = "walkthrough.initialized",
            kind = self.kind().as_str(),
            max_steps = self.max_steps(),
            "walkthrough initialized"
        );
        Ok(self.snapshot())
    }

    pub fn advance(&mut self) -> Result<Snapshot<W::Trace>, StepError> {
        let max_steps = self.max_steps();
        let kind = self.kind();
        let run = self.run.as_mut().ok_or(StepError::NotActive)?;
        if run.current_step >= max_steps {
            return Err(StepError::AlreadyComplete { max_steps });
        }

        let next_step = run.current_step + 1;
        let step = self
            .walkthrough
            .steps()
            .get(usize::from(next_step) - 2)
            .ok_or(StepError::AlreadyComplete { max_steps })?;
        let trace = match step(self.walkthrough.dataset(), &run.trace) {
            Ok(trace) => trace,
            Err(error) => {
                warn!(
                    event_name = "walkthrough.step_rejected",
                    kind = kind.as_str(),
                    step = next_step,
                    error = %error,
                    "step computation failed"
                );
                return Err(error);
            }
        };

        run.trace = trace;
        run.current_step = next_step;
        debug!(
            event_name = "walkthrough.step_applied",
            kind = kind.as_str(),
            step = next_step,
            stage = kind.stage_title(next_step).unwrap_or_default(),
            "step applied"
        );
        Ok(self.snapshot())
    }

    pub fn reset(&mut self) {
        if self.run.take().is_some() {
            debug!(
                event_name = "walkthrough.reset",
                kind = self.kind().as_str(),
                "trace discarded"
            );
        }
    }

    pub fn snapshot(&self) -> Snapshot<W::Trace> {
        let kind = self.kind();
        let max_steps = self.max_steps();
        match &self.run {
            Some(run) => Snapshot {
                kind,
                active: true,
                input: Some(run.input.clone()),
                current_step: run.current_step,
                max_steps,
                completed: run.current_step == max_steps,
                stage: kind.stage_title(run.current_step).map(str::to_owned),
                trace: run.trace.clone(),
            },
            None => Snapshot {
                kind,
                active: false,
                input: None,
                current_step: 0,
                max_steps,
                completed: false,
                stage: None,
                trace: W::Trace::default(),
            },
        }
    }

    /// Initializes with `input` and advances until `through` (clamped to the final step),
    /// returning the snapshot produced by every step along the way.
    pub fn walk(
        &mut self,
        input: &str,
        through: u8,
    ) -> Result<Vec<Snapshot<W::Trace>>, StepError> {
        let through = through.clamp(1, self.max_steps());
        let mut snapshots = vec![self.initialize(input)?];
        while self.current_step() < through {
            snapshots.push(self.advance()?);
        }
        Ok(snapshots)
    }

    pub fn initialize_with_audit<S>(
        &mut self,
        input: &str,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<Snapshot<W::Trace>, StepError>
    where
        S: AuditSink,
    {
        let result = self.initialize(input);
        self.emit(sink, audit, "walkthrough.initialized", AuditCategory::Lifecycle, &result);
        result
    }

    pub fn advance_with_audit<S>(
        &mut self,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<Snapshot<W::Trace>, StepError>
    where
        S: AuditSink,
    {
        let result = self.advance();
        self.emit(sink, audit, "walkthrough.step_applied", AuditCategory::Step, &result);
        result
    }

    pub fn reset_with_audit<S>(&mut self, sink: &S, audit: &AuditContext)
    where
        S: AuditSink,
    {
        let discarded_step = self.current_step();
        self.reset();
        sink.emit(
            AuditEvent::new(
                audit,
                "walkthrough.reset",
                AuditCategory::Lifecycle,
                AuditOutcome::Success,
            )
            .with_metadata("kind", self.kind().as_str())
            .with_metadata("discarded_step", discarded_step.to_string()),
        );
    }

    fn emit<S>(
        &self,
        sink: &S,
        audit: &AuditContext,
        applied_type: &str,
        category: AuditCategory,
        result: &Result<Snapshot<W::Trace>, StepError>,
    ) where
        S: AuditSink,
    {
        let event = match result {
            Ok(snapshot) => {
                AuditEvent::new(audit, applied_type, category, AuditOutcome::Success)
                    .with_metadata("step", snapshot.current_step.to_string())
                    .with_metadata("completed", snapshot.completed.to_string())
            }
            Err(error) => AuditEvent::new(
                audit,
                "walkthrough.step_rejected",
                category,
                AuditOutcome::Rejected,
            )
            .with_metadata("step", self.current_step().to_string())
            .with_metadata("error", error.to_string()),
        };
        sink.emit(event.with_metadata("kind", self.kind().as_str()));
    }
}

#[cfg(test)]
mod tests {
    use crate::audit::{AuditContext, AuditOutcome, InMemoryAuditSink};
    use crate::errors::StepError;
    use crate::walkthrough::recommendation::RecommendationEngine;
    use crate::walkthrough::review::ReviewEngine;
    use crate::walkthrough::states::{ReviewTrace, Snapshot};

    #[test]
    fn audit_records_applied_and_rejected_transitions() {
        let mut engine = RecommendationEngine::default();
        let sink = InMemoryAuditSink::default();
        let audit = AuditContext::new(Some("session-1".to_owned()), "req-9", "test");

        let error = engine.advance_with_audit(&sink, &audit).expect_err("not active yet");
        assert_eq!(error, StepError::NotActive);
        engine.initialize_with_audit("Laptop", &sink, &audit).expect("initialize");
        engine.advance_with_audit(&sink, &audit).expect("step 2");
        engine.reset_with_audit(&sink, &audit);

        let events = sink.events();
        let types: Vec<_> = events.iter().map(|event| event.event_type.as_str()).collect();
        assert_eq!(
            types,
            [
                "walkthrough.step_rejected",
                "walkthrough.initialized",
                "walkthrough.step_applied",
                "walkthrough.reset",
            ]
        );
        assert_eq!(events[0].outcome, AuditOutcome::Rejected);
        assert_eq!(events[2].metadata.get("step").map(String::as_str), Some("2"));
        assert_eq!(events[3].metadata.get("discarded_step").map(String::as_str), Some("2"));
        assert!(events.iter().all(|event| event.correlation_id == "req-9"));
    }

    #[test]
    fn walk_clamps_to_final_step() {
        let mut engine = RecommendationEngine::default();
        let snapshots = engine.walk("Laptop", 200).expect("walk");

        assert_eq!(snapshots.len(), 6);
        let steps: Vec<_> = snapshots.iter().map(|snapshot| snapshot.current_step).collect();
        assert_eq!(steps, [1, 2, 3, 4, 5, 6]);
        assert!(engine.is_complete());
    }

    #[test]
    fn rerun_after_reset_reproduces_every_snapshot() {
        let mut engine = ReviewEngine::default();
        let text = "Great price, but shipping was slow.";
        let first = engine.walk(text, 8).expect("first walk");
        engine.reset();
        assert!(!engine.is_active());
        let second = engine.walk(text, 8).expect("second walk");

        assert_eq!(first, second);
        let fingerprints = |snapshots: &[Snapshot<ReviewTrace>]| -> Vec<String> {
            snapshots.iter().map(|snapshot| snapshot.fingerprint().expect("fingerprint")).collect()
        };
        assert_eq!(fingerprints(&first), fingerprints(&second));
    }

    #[test]
    fn repeated_initialize_with_same_input_is_idempotent() {
        let mut engine = RecommendationEngine::default();
        let once = engine.initialize("Laptop").expect("initialize");
        let twice = engine.initialize("Laptop").expect("initialize again");
        assert_eq!(once, twice);

        engine.advance().expect("step 2");
        let after_advance = engine.initialize("Laptop").expect("same input keeps progress");
        assert_eq!(after_advance.current_step, 2);
    }

    #[test]
    fn walk_through_zero_still_captures_input() {
        let mut engine = RecommendationEngine::default();
        let snapshots = engine.walk("Laptop", 0).expect("walk");

        assert_eq!(snapshots.len(), 1);
        assert_eq!(engine.current_step(), 1);
    }
}
