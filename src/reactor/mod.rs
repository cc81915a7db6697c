//! Binding-status reactor
//!
//! Turns status changes of one watched `SPIAccessTokenBinding` into side
//! effects: opening the OAuth page, committing the injected secret name into
//! the form, and notifying the user.
//!
//! Decision logic lives in [`reduce`], a pure function over two
//! [`Observation`]s. [`BindingReactor`] owns the target, remembers the last
//! observation and executes effects against the injected capabilities.

mod observation;
mod reducer;

pub use observation::{BindingSnapshot, Observation};
pub use reducer::{
    Effect, FAILURE_TITLE, INCOMPLETE_DESCRIPTION, INCOMPLETE_TITLE, SUCCESS_DESCRIPTION,
    SUCCESS_TITLE, reduce,
};

use kube::ResourceExt;

use crate::effects::{AuthLauncher, FormSink, Notifier};
use crate::models::{BindingPhase, SPIAccessTokenBinding};

/// Reacts to status transitions of a single binding
pub struct BindingReactor {
    name: String,
    namespace: String,
    launcher: Box<dyn AuthLauncher + Send>,
    form: Box<dyn FormSink + Send>,
    notifier: Box<dyn Notifier + Send>,
    previous: Option<Observation>,
    torn_down: bool,
}

impl BindingReactor {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        launcher: Box<dyn AuthLauncher + Send>,
        form: Box<dyn FormSink + Send>,
        notifier: Box<dyn Notifier + Send>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            launcher,
            form,
            notifier,
            previous: None,
            torn_down: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// True while a non-empty name is targeted and teardown has not happened
    pub fn is_active(&self) -> bool {
        !self.torn_down && !self.name.is_empty()
    }

    /// Whether `(namespace, name)` is the binding currently watched
    pub fn is_watching(&self, namespace: &str, name: &str) -> bool {
        self.is_active() && self.namespace == namespace && self.name == name
    }

    /// Phase from the most recent observation
    pub fn last_phase(&self) -> Option<&BindingPhase> {
        self.previous.as_ref().and_then(Observation::phase)
    }

    /// Point the reactor at another binding
    ///
    /// The previous observation is forgotten, so the new target is evaluated
    /// from scratch. An empty name stops all reactions.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name == self.name {
            return;
        }
        tracing::debug!(from = %self.name, to = %name, "reactor target changed");
        self.name = name;
        self.previous = None;
    }

    /// Stop reacting for good
    pub fn teardown(&mut self) {
        if !self.torn_down {
            tracing::debug!(binding = %self.name, "reactor torn down");
        }
        self.torn_down = true;
        self.previous = None;
    }

    /// Feed the current value of the watched binding
    ///
    /// `binding` is `None` while the object does not exist (or was deleted).
    /// Objects that are not the current target are ignored and do not
    /// disturb the remembered observation. Returns the effects that were
    /// dispatched.
    pub fn observe(
        &mut self,
        binding: Option<&SPIAccessTokenBinding>,
        loaded: bool,
    ) -> Vec<Effect> {
        if !self.is_active() {
            return Vec::new();
        }

        if let Some(obj) = binding {
            let ns = obj.namespace().unwrap_or_default();
            let name = obj.name_any();
            if !self.is_watching(&ns, &name) {
                tracing::debug!(
                    namespace = %ns,
                    name = %name,
                    "ignoring binding that is not being watched"
                );
                return Vec::new();
            }
        }

        let next = Observation::new(
            self.name.clone(),
            loaded,
            binding.map(BindingSnapshot::from),
        );
        let effects = reduce(self.previous.as_ref(), &next);
        self.previous = Some(next);

        self.dispatch(&effects);
        effects
    }

    fn dispatch(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::OpenUrl(url) => {
                    if let Err(e) = self.launcher.launch(url) {
                        tracing::warn!(binding = %self.name, error = %e, "failed to launch authorization");
                    }
                }
                Effect::SetField { path, value } => {
                    if let Err(e) = self.form.set_field(path, value) {
                        tracing::warn!(binding = %self.name, field = %path, error = %e, "failed to update form");
                    }
                }
                Effect::Notify(notification) => self.notifier.notify(notification),
            }
        }
    }
}
