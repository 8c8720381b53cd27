//! Run lifecycle driver.
//!
//! The runner walks the selected run-set through a per-scenario state
//! machine: `Selected → (Skipped | Running → Finished)`, bracketed by
//! `run-started` and `run-finished`. Execution is single-threaded and
//! fully synchronous; a step is an opaque blocking unit of work, and
//! cancellation is cooperative: checked between steps and between
//! scenarios, never mid-step. Every selected scenario ends with exactly
//! one terminal status and exactly one `scenario-finished` event.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use scena_proto::{Event, ScenarioId, ScenarioStatus, StepError, StepKind, StepStatus};
use tracing::{debug, info};

use crate::dispatcher::{Dispatcher, FatalHandler};
use crate::report::Report;
use crate::run_context::{AbortReason, RunContext};
use crate::selector::Selection;

/// Drives one run over a populated run context.
pub struct Runner {
    dispatcher: Dispatcher,
    interrupt: Arc<AtomicBool>,
}

impl Runner {
    /// Creates a runner over a dispatcher with its plugins registered.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag for cooperative interruption.
    ///
    /// Setting it requests termination at the next step or scenario
    /// boundary; the in-flight step always completes first.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Returns the dispatcher, e.g. to inspect recorded handler failures.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Executes the run-set and aggregates the outcome.
    ///
    /// Never fails: scenario-scoped failures stay inside the run, and a
    /// fatal plugin failure or interrupt marks the remaining scenarios
    /// `aborted` rather than escaping.
    pub fn run(&mut self, ctx: &mut RunContext) -> Report {
        let run_set: Vec<ScenarioId> = ctx
            .scenarios()
            .iter()
            .filter(|s| {
                ctx.selection(s.id())
                    .is_none_or(|selection| selection.in_run_set())
            })
            .map(|s| s.id())
            .collect();

        info!(scenarios = run_set.len(), "run started");
        self.publish(
            &Event::RunStarted {
                scenarios: run_set.len(),
            },
            ctx,
        );

        for id in run_set {
            self.check_interrupt(ctx);
            if ctx.abort().is_some() {
                self.finish_aborted(id, ctx);
            } else {
                self.run_scenario(id, ctx);
            }
        }

        let report = Report::from_context(ctx);
        info!(summary = %report.summary(), "run finished");
        self.publish(
            &Event::RunFinished {
                summary: report.summary().clone(),
            },
            ctx,
        );
        report
    }

    /// One scenario through `Selected → (Skipped | Running → Finished)`.
    fn run_scenario(&mut self, id: ScenarioId, ctx: &mut RunContext) {
        self.publish(&Event::ScenarioSelected { scenario: id }, ctx);
        if ctx.abort().is_some() {
            // Fatal raised by a `scenario-selected` handler: this scenario
            // never started.
            self.finish_aborted(id, ctx);
            return;
        }

        // A unit that failed to construct is reported as failed, steps
        // never invoked.
        let construction_error = ctx
            .scenario(id)
            .and_then(|s| s.construction_error())
            .map(str::to_string);
        if let Some(error) = construction_error {
            self.publish(&Event::ScenarioStarted { scenario: id }, ctx);
            if let Some(scenario) = ctx.scenario_mut(id) {
                scenario.mark_failed();
            }
            self.finish(id, ScenarioStatus::Failed, Some(error), ctx);
            return;
        }

        // Selector verdicts are authoritative; plugin late-skips
        // (requested during `scenario-selected`) can only add to them.
        let skip_reason = match ctx.selection(id) {
            Some(Selection::Skip { reason }) => Some(reason.clone()),
            _ => ctx.skip_request(id).map(str::to_string),
        };
        if let Some(reason) = skip_reason {
            debug!(scenario = %id, reason, "scenario skipped");
            if let Some(scenario) = ctx.scenario_mut(id) {
                scenario.mark_skipped(reason.clone());
            }
            self.finish(id, ScenarioStatus::Skipped, Some(reason), ctx);
            return;
        }

        self.publish(&Event::ScenarioStarted { scenario: id }, ctx);

        let failure = self.run_steps(id, ctx);

        let (status, reason) = if let Some(error) = failure {
            if let Some(scenario) = ctx.scenario_mut(id) {
                scenario.mark_failed();
            }
            (ScenarioStatus::Failed, Some(error.message))
        } else if let Some(abort) = ctx.abort() {
            let reason = abort.to_string();
            if let Some(scenario) = ctx.scenario_mut(id) {
                scenario.mark_aborted();
            }
            (ScenarioStatus::Aborted, Some(reason))
        } else {
            if let Some(scenario) = ctx.scenario_mut(id) {
                scenario.mark_passed();
            }
            (ScenarioStatus::Passed, None)
        };
        self.finish(id, status, reason, ctx);
    }

    /// Runs a scenario's steps in declared order, fail-fast.
    ///
    /// After the first failure the remaining steps are skipped-not-executed
    /// but still emit `step-finished` for bookkeeping.
    fn run_steps(&mut self, id: ScenarioId, ctx: &mut RunContext) -> Option<StepError> {
        let phases: Vec<StepKind> = ctx
            .scenario(id)
            .map(|s| s.steps().iter().map(|step| step.kind()).collect())
            .unwrap_or_default();

        let mut failure: Option<StepError> = None;
        for (index, phase) in phases.into_iter().enumerate() {
            if failure.is_some() {
                self.publish(
                    &Event::StepFinished {
                        scenario: id,
                        step: index,
                        phase,
                        status: StepStatus::Skipped,
                        error: None,
                    },
                    ctx,
                );
                continue;
            }

            self.check_interrupt(ctx);
            if ctx.abort().is_some() {
                break;
            }

            self.publish(
                &Event::StepStarted {
                    scenario: id,
                    step: index,
                    phase,
                },
                ctx,
            );
            if ctx.abort().is_some() {
                break;
            }

            match ctx.run_step(id, index) {
                Ok(()) => {
                    self.publish(
                        &Event::StepFinished {
                            scenario: id,
                            step: index,
                            phase,
                            status: StepStatus::Passed,
                            error: None,
                        },
                        ctx,
                    );
                }
                Err(error) => {
                    debug!(scenario = %id, step = index, "step failed: {error}");
                    self.publish(
                        &Event::StepFinished {
                            scenario: id,
                            step: index,
                            phase,
                            status: StepStatus::Failed,
                            error: Some(error.clone()),
                        },
                        ctx,
                    );
                    failure = Some(error);
                }
            }
        }
        failure
    }

    /// Terminal bookkeeping for a scenario that never ran due to an abort.
    fn finish_aborted(&mut self, id: ScenarioId, ctx: &mut RunContext) {
        let reason = ctx.abort().map(|abort| abort.to_string());
        if let Some(scenario) = ctx.scenario_mut(id) {
            scenario.mark_aborted();
        }
        self.finish(id, ScenarioStatus::Aborted, reason, ctx);
    }

    fn finish(
        &mut self,
        id: ScenarioId,
        status: ScenarioStatus,
        reason: Option<String>,
        ctx: &mut RunContext,
    ) {
        self.publish(
            &Event::ScenarioFinished {
                scenario: id,
                status,
                reason,
            },
            ctx,
        );
    }

    fn check_interrupt(&self, ctx: &mut RunContext) {
        if self.interrupt.load(Ordering::SeqCst) {
            ctx.set_abort(AbortReason::Interrupted);
        }
    }

    fn publish(&mut self, event: &Event, ctx: &mut RunContext) {
        if let Err(FatalHandler { plugin, message }) = self.dispatcher.publish(event, ctx) {
            ctx.set_abort(AbortReason::PluginFatal { plugin, message });
        }
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("dispatcher", &self.dispatcher)
            .field("interrupted", &self.interrupt.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Plugin;
    use crate::selector::{PathRuleSet, Selector};
    use crate::testing::{RecordingPlugin, push_scenarios};
    use scena_proto::{EventKind, HandlerError, ScenarioSpec};

    fn prepared(specs: Vec<ScenarioSpec>) -> RunContext {
        let mut ctx = RunContext::new();
        push_scenarios(&mut ctx, "scenarios/unit.rs", specs);
        Selector::new(PathRuleSet::new()).select(&mut ctx);
        ctx
    }

    #[test]
    fn test_single_scenario_passes_through_the_full_lifecycle() {
        let mut ctx = prepared(vec![
            ScenarioSpec::new("s")
                .step(StepKind::Given, "a", || Ok(()))
                .step(StepKind::Then, "b", || Ok(())),
        ]);

        let mut dispatcher = Dispatcher::new();
        let (recording, events) = RecordingPlugin::new();
        dispatcher.register(Box::new(recording)).unwrap();

        let report = Runner::new(dispatcher).run(&mut ctx);
        assert_eq!(report.summary().passed, 1);
        assert_eq!(ctx.scenarios()[0].status(), ScenarioStatus::Passed);

        let kinds: Vec<EventKind> = events.borrow().iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            [
                EventKind::RunStarted,
                EventKind::ScenarioSelected,
                EventKind::ScenarioStarted,
                EventKind::StepStarted,
                EventKind::StepFinished,
                EventKind::StepStarted,
                EventKind::StepFinished,
                EventKind::ScenarioFinished,
                EventKind::RunFinished,
            ]
        );
    }

    /// Plugin that raises a fatal failure on the first `step-finished`.
    struct FatalOnFirstStep;

    impl Plugin for FatalOnFirstStep {
        fn name(&self) -> &str {
            "fatal-on-first-step"
        }

        fn subscriptions(&self) -> Vec<EventKind> {
            vec![EventKind::StepFinished]
        }

        fn handle(
            &mut self,
            _event: &Event,
            _ctx: &mut RunContext,
        ) -> std::result::Result<(), HandlerError> {
            Err(HandlerError::fatal("stop everything"))
        }
    }

    #[test]
    fn test_fatal_mid_scenario_still_emits_terminal_events() {
        let mut ctx = prepared(vec![
            ScenarioSpec::new("in-flight")
                .step(StepKind::Given, "a", || Ok(()))
                .step(StepKind::Then, "never runs", || {
                    Err(StepError::new("unreachable"))
                }),
        ]);

        let mut dispatcher = Dispatcher::new();
        let (recording, events) = RecordingPlugin::new();
        dispatcher.register(Box::new(recording)).unwrap();
        dispatcher.register(Box::new(FatalOnFirstStep)).unwrap();

        let report = Runner::new(dispatcher).run(&mut ctx);

        // The second step never started; the scenario still finished, as
        // aborted, and the run still closed.
        assert_eq!(ctx.scenarios()[0].status(), ScenarioStatus::Aborted);
        assert_eq!(report.summary().aborted, 1);
        let kinds: Vec<EventKind> = events.borrow().iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            [
                EventKind::RunStarted,
                EventKind::ScenarioSelected,
                EventKind::ScenarioStarted,
                EventKind::StepStarted,
                EventKind::StepFinished,
                EventKind::ScenarioFinished,
                EventKind::RunFinished,
            ]
        );
        assert!(matches!(
            report.abort(),
            Some(AbortReason::PluginFatal { .. })
        ));
    }

    #[test]
    fn test_unselected_context_defaults_to_running_everything() {
        // A context that never went through the selector still runs; the
        // selection default is permissive.
        let mut ctx = RunContext::new();
        push_scenarios(
            &mut ctx,
            "scenarios/unit.rs",
            vec![ScenarioSpec::new("s").step(StepKind::Given, "a", || Ok(()))],
        );

        let report = Runner::new(Dispatcher::new()).run(&mut ctx);
        assert_eq!(report.summary().passed, 1);
    }
}

