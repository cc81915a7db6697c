//! Console notifications

use super::{Notification, NotificationVariant, Notifier};

/// Writes notifications to stderr and mirrors them into the log
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        eprintln!("{}", notification.render());
        match notification.variant {
            NotificationVariant::Success => tracing::info!(
                title = %notification.title,
                description = %notification.description,
                "notification"
            ),
            NotificationVariant::Danger => tracing::warn!(
                title = %notification.title,
                description = %notification.description,
                "notification"
            ),
        }
    }
}
