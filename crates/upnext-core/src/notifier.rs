//! The outbound-notification seam: a trait standing in for the webhook
//! client described in `SPEC_FULL.md` §1 as out of scope.

use tracing::warn;

/// Sends a notification message somewhere.
///
/// A real implementation POSTs `message` to `notification_webhook_url` /
/// `warning.webhook_url`; wiring up an HTTP client is out of scope here.
pub trait Notifier: Send + Sync {
    /// Sends `message`.
    fn notify(&self, message: &str);
}

/// Discards every notification. Used when no webhook is configured.
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _message: &str) {}
}

/// Logs every notification via `tracing` instead of sending it anywhere.
#[derive(Debug, Default)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn notify(&self, message: &str) {
        warn!(message, "notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_notifier_does_not_panic() {
        NoopNotifier.notify("anything");
    }

    #[test]
    fn logging_notifier_does_not_panic() {
        LoggingNotifier.notify("anything");
    }
}
