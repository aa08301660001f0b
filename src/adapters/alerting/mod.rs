//! Failure notification adapters.

mod tracing_notifier;

pub use tracing_notifier::{TracingFailureNotifier, ALERT_TARGET};
