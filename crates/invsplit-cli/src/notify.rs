//! End-of-run notification.

use tracing::{info, warn};

/// Delivers run summaries to recipients.
pub trait Notifier {
    /// Send `body` under `subject` to one recipient.
    fn notify(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Notifier that records the summary in the run log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!("Notification for {}: {}\n{}", recipient, subject, body);
        Ok(())
    }
}

/// Notify every recipient, logging failures instead of propagating them.
pub fn notify_all(notifier: &dyn Notifier, recipients: &[String], subject: &str, body: &str) -> usize {
    if recipients.is_empty() {
        info!("No notification recipients configured; skipping notification");
        return 0;
    }

    let mut delivered = 0;
    for recipient in recipients {
        match notifier.notify(recipient, subject, body) {
            Ok(()) => delivered += 1,
            Err(e) => warn!("Could not notify {}: {}", recipient, e),
        }
    }
    delivered
}
