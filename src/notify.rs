//! User-facing notification sink.
//!
//! The store reports outcomes (toasts, in the original UI) through this
//! trait; embedders bridge it to whatever notification surface they have.
//! Calls are fire-and-forget — the store never consumes a return value.

use tracing::{info, warn};

pub trait Notifier: Send + Sync {
    fn success(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
    fn info(&self, title: &str, message: &str);
}

/// Default sink that routes notifications into the tracing pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, title: &str, message: &str) {
        info!(title, message, "notification: success");
    }

    fn error(&self, title: &str, message: &str) {
        warn!(title, message, "notification: error");
    }

    fn info(&self, title: &str, message: &str) {
        info!(title, message, "notification: info");
    }
}
