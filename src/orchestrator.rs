// 🎛️ Import Orchestrator - Sequences steps, contains failures
//
// State machine: NotStarted → Running → Complete, or Running → Failed.
// Both end states are terminal; an orchestrator runs once.
//
// The error boundary lives here. Steps propagate ImportError freely; the
// orchestrator converts the first failure into one failure notification and
// a Failed outcome, and never lets the error object itself cross to the
// caller. Callers branch on the outcome, not on a panic or a Result chain.

use std::time::{Duration, Instant};

use log::info;
use rusqlite::Connection;

use crate::notify::Notifier;
use crate::steps::ImportStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    NotStarted,
    Running,
    Complete,
    Failed,
}

/// What a run produced: the success duration, or the failing step and the
/// rendered cause. Richer than a bare boolean, but still no error object.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Completed { duration: Duration },
    Failed { step: &'static str, reason: String },
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Completed { .. })
    }
}

pub struct ImportOrchestrator<'n> {
    notifier: &'n dyn Notifier,
    state: ImportState,
}

impl<'n> ImportOrchestrator<'n> {
    /// The notifier is injected, never reached for through globals.
    pub fn new(notifier: &'n dyn Notifier) -> Self {
        ImportOrchestrator {
            notifier,
            state: ImportState::NotStarted,
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    /// Run the steps strictly in sequence.
    ///
    /// A later step never starts once the run has failed: downstream steps
    /// may assume earlier record types are consistent in the store.
    /// Exactly one terminal notification is emitted per run.
    ///
    /// Consumes the orchestrator: `Complete` and `Failed` are terminal, so
    /// a second run needs a fresh orchestrator and re-running a finished
    /// one is unrepresentable.
    pub fn run(mut self, conn: &Connection, steps: &[Box<dyn ImportStep>]) -> ImportOutcome {
        self.state = ImportState::Running;
        self.notifier.import_started();
        let started = Instant::now();

        for step in steps {
            info!("running import step: {}", step.name());

            if let Err(err) = step.run(conn) {
                self.state = ImportState::Failed;

                // Maximize the diagnostic carried by the notification; it
                // is all the detail the caller will ever see.
                let reason = format!("step {} failed: {err}", step.name());
                self.notifier.import_failed(&reason);

                return ImportOutcome::Failed {
                    step: step.name(),
                    reason: err.to_string(),
                };
            }
        }

        self.state = ImportState::Complete;
        let duration = started.elapsed();
        self.notifier.import_succeeded(duration);

        ImportOutcome::Completed { duration }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;
    use crate::error::ImportError;
    use crate::notify::{Notification, RecordingNotifier};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct OkStep;

    impl ImportStep for OkStep {
        fn name(&self) -> &'static str {
            "ok"
        }

        fn run(&self, _conn: &Connection) -> Result<(), ImportError> {
            Ok(())
        }
    }

    struct FailingStep;

    impl ImportStep for FailingStep {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn run(&self, _conn: &Connection) -> Result<(), ImportError> {
            Err(ImportError::normalization("ISSUE_NO", "junk", "not a number"))
        }
    }

    struct CountingStep {
        runs: Arc<AtomicUsize>,
    }

    impl ImportStep for CountingStep {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn run(&self, _conn: &Connection) -> Result<(), ImportError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_success_emits_start_then_duration() {
        let conn = test_conn();
        let notifier = RecordingNotifier::new();
        let orchestrator = ImportOrchestrator::new(&notifier);
        assert_eq!(orchestrator.state(), ImportState::NotStarted);

        let steps: Vec<Box<dyn ImportStep>> = vec![Box::new(OkStep), Box::new(OkStep)];
        let outcome = orchestrator.run(&conn, &steps);

        assert!(outcome.is_success());

        let events = notifier.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Notification::Started);
        assert!(matches!(events[1], Notification::Succeeded { .. }));
    }

    #[test]
    fn test_failure_emits_exactly_one_failure_notification() {
        let conn = test_conn();
        let notifier = RecordingNotifier::new();
        let orchestrator = ImportOrchestrator::new(&notifier);

        let steps: Vec<Box<dyn ImportStep>> = vec![Box::new(FailingStep)];
        let outcome = orchestrator.run(&conn, &steps);

        assert!(!outcome.is_success());

        let events = notifier.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Notification::Started);
        match &events[1] {
            Notification::Failed { description } => {
                assert!(description.contains("failing"));
                assert!(description.contains("ISSUE_NO"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_later_steps_do_not_run_after_failure() {
        let conn = test_conn();
        let notifier = RecordingNotifier::new();
        let orchestrator = ImportOrchestrator::new(&notifier);
        let runs = Arc::new(AtomicUsize::new(0));

        let steps: Vec<Box<dyn ImportStep>> = vec![
            Box::new(FailingStep),
            Box::new(CountingStep { runs: Arc::clone(&runs) }),
        ];
        let outcome = orchestrator.run(&conn, &steps);

        assert!(!outcome.is_success());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_outcome_names_step_and_reason() {
        let conn = test_conn();
        let notifier = RecordingNotifier::new();
        let orchestrator = ImportOrchestrator::new(&notifier);

        let steps: Vec<Box<dyn ImportStep>> = vec![Box::new(FailingStep)];
        match orchestrator.run(&conn, &steps) {
            ImportOutcome::Failed { step, reason } => {
                assert_eq!(step, "failing");
                assert!(reason.contains("normalization"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_each_run_takes_a_fresh_orchestrator() {
        // run() consumes the orchestrator, so the end states are terminal
        // by construction; a second import is a second orchestrator and
        // still emits exactly one start and one terminal event.
        let conn = test_conn();
        let notifier = RecordingNotifier::new();

        let steps: Vec<Box<dyn ImportStep>> = vec![Box::new(OkStep)];
        ImportOrchestrator::new(&notifier).run(&conn, &steps);
        ImportOrchestrator::new(&notifier).run(&conn, &steps);

        let events = notifier.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], Notification::Started);
        assert!(matches!(events[1], Notification::Succeeded { .. }));
        assert_eq!(events[2], Notification::Started);
        assert!(matches!(events[3], Notification::Succeeded { .. }));
    }
}
