// 📣 Notifier - Import outcome events
//
// The orchestrator reports start, success and failure through a capability
// it is handed at construction, never through process-wide state. Events
// are fire-and-forget: the pipeline consumes no return value from them.

use std::sync::Mutex;
use std::time::Duration;

use log::{error, info};
use serde_json::json;

pub trait Notifier {
    fn import_started(&self);

    fn import_succeeded(&self, duration: Duration);

    /// `description` carries the failing step name and underlying cause;
    /// this is the only diagnostic detail that leaves the orchestrator.
    fn import_failed(&self, description: &str);
}

/// Notifier that writes structured events to the application log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn import_started(&self) {
        info!("{}", json!({ "event": "nald-import.started" }));
    }

    fn import_succeeded(&self, duration: Duration) {
        info!(
            "{}",
            json!({
                "event": "nald-import.succeeded",
                "duration_seconds": duration.as_secs_f64(),
            })
        );
    }

    fn import_failed(&self, description: &str) {
        error!(
            "{}",
            json!({
                "event": "nald-import.failed",
                "description": description,
            })
        );
    }
}

/// One observed notification, for assertion in tests and dry runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Started,
    Succeeded { duration: Duration },
    Failed { description: String },
}

/// Notifier that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// A panic while the lock was held poisons the mutex; the event list
    /// itself is still intact, so keep recording rather than panicking.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for RecordingNotifier {
    fn import_started(&self) {
        self.lock().push(Notification::Started);
    }

    fn import_succeeded(&self, duration: Duration) {
        self.lock().push(Notification::Succeeded { duration });
    }

    fn import_failed(&self, description: &str) {
        self.lock().push(Notification::Failed {
            description: description.to_string(),
        });
    }
}
