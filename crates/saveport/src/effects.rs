//! Effect abstractions for the shell collaborators.
//!
//! Narrow trait definitions for the UI, delivery and telemetry side
//! effects, so the orchestration can be exercised against in-memory
//! doubles.

/// Kind of user-facing notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Success,
    Failure,
}

/// UI collaborator: shows a toast-style message to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: Notice);
}

/// Delivery collaborator: hands a finished archive blob to the user under
/// a suggested file name.
pub trait Delivery: Send + Sync {
    fn deliver(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Operation outcomes delivered to telemetry. Side effect only; never part
/// of an operation's correctness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Downloaded,
    Restored,
    RestoreFailed { detail: String },
}

/// Telemetry collaborator: records operation outcomes.
pub trait Telemetry: Send + Sync {
    fn record(&self, event: Event);
}
