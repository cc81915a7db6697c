//! Side-effect capabilities injected into the reactor
//!
//! The reactor decides *what* should happen; these traits decide *how*.
//! Every capability is passed in explicitly so the reactor can be driven
//! without a browser, a terminal, or a form file.

mod form;
mod launcher;
mod notifier;

pub use form::{FormError, PrintedForm, YamlForm};
pub use launcher::{BrowserLauncher, PrintLauncher};
pub use notifier::ConsoleNotifier;

/// Form field the reactor commits the injected secret name into
pub const AUTH_SECRET_FIELD: &str = "git.authSecret";

/// Errors raised while executing a side effect
#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("Invalid authorization URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to open authorization page: {0}")]
    Launch(#[source] std::io::Error),

    #[error(transparent)]
    Form(#[from] FormError),
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Success,
    Danger,
}

impl NotificationVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationVariant::Success => "success",
            NotificationVariant::Danger => "danger",
        }
    }
}

/// Transient, fire-and-forget message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub variant: NotificationVariant,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: NotificationVariant::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn danger(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: NotificationVariant::Danger,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Single-line rendering used by console output
    pub fn render(&self) -> String {
        let icon = match self.variant {
            NotificationVariant::Success => "✓",
            NotificationVariant::Danger => "✗",
        };
        if self.description.is_empty() {
            format!("{} {}", icon, self.title)
        } else {
            format!("{} {}: {}", icon, self.title, self.description)
        }
    }
}

/// Opens the external authorization page for a binding
#[cfg_attr(test, mockall::automock)]
pub trait AuthLauncher {
    fn launch(&self, url: &str) -> Result<(), EffectError>;
}

/// The dependent form the reactor writes into
#[cfg_attr(test, mockall::automock)]
pub trait FormSink {
    /// Set a field addressed by dot notation (e.g. `git.authSecret`)
    fn set_field(&mut self, path: &str, value: &str) -> Result<(), EffectError>;
}

/// Fire-and-forget notification dispatch
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_success() {
        let n = Notification::success(
            "Authorization successful!!",
            "Git repository successfully authorized.",
        );
        insta::assert_snapshot!(
            n.render(),
            @"✓ Authorization successful!!: Git repository successfully authorized."
        );
    }

    #[test]
    fn test_render_danger_without_description() {
        let n = Notification::danger("Authorization failed!!", "");
        insta::assert_snapshot!(n.render(), @"✗ Authorization failed!!");
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(NotificationVariant::Success.as_str(), "success");
        assert_eq!(NotificationVariant::Danger.as_str(), "danger");
    }
}
