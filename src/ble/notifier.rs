//! Broadcast of TX notifications to every connected central.

use super::connections::ConnectionRegistry;
use super::{AttributeHandle, RadioStack};

/// Outcome of one [`Notifier::send`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotifyReport {
    pub delivered: usize,
    pub failed: usize,
}

impl NotifyReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Sends on the TX characteristic. Usable from any context; it only reads
/// the connection registry.
pub struct Notifier<'a, S: RadioStack> {
    stack: &'a S,
    connections: &'a ConnectionRegistry,
    tx: AttributeHandle,
}

impl<'a, S: RadioStack> Notifier<'a, S> {
    pub fn new(stack: &'a S, connections: &'a ConnectionRegistry, tx: AttributeHandle) -> Self {
        Self {
            stack,
            connections,
            tx,
        }
    }

    /// Notify `message` once to each tracked connection.
    ///
    /// A failing connection is logged and skipped; the others still get the
    /// message. Nothing is retried or queued.
    pub fn send(&self, message: &[u8]) -> NotifyReport {
        // Release the lock before talking to the radio.
        let targets = self.connections.snapshot();

        let mut report = NotifyReport::default();
        for conn in targets {
            match self.stack.notify(conn, self.tx, message) {
                Ok(()) => {
                    debug!("Notified {} bytes to {}", message.len(), conn);
                    report.delivered += 1;
                }
                Err(e) => {
                    warn!("Notify to {} failed: {}", conn, e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Convenience for text messages.
    pub fn send_str(&self, message: &str) -> NotifyReport {
        self.send(message.as_bytes())
    }
}
