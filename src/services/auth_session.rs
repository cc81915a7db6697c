//! Authorization session
//!
//! `AuthSession` wraps a binding watcher and a reactor into one cancellable
//! event loop. The event handling itself lives in [`SessionDriver`], which
//! has no Kubernetes dependency and can be fed events directly.

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::models::BindingPhase;
use crate::reactor::BindingReactor;
use crate::watcher::{BindingState, BindingWatcher, WatchEvent};

/// What the session loop should do after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    /// The binding reached a terminal phase and the session should end
    Finished(BindingPhase),
    /// The watch transport gave up
    Failed(String),
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Finished(BindingPhase),
    Interrupted,
    Closed,
}

/// Folds watch events into state and feeds the reactor
pub struct SessionDriver {
    state: BindingState,
    reactor: BindingReactor,
    exit_on_terminal: bool,
}

impl SessionDriver {
    pub fn new(reactor: BindingReactor, exit_on_terminal: bool) -> Self {
        Self {
            state: BindingState::new(),
            reactor,
            exit_on_terminal,
        }
    }

    pub fn reactor(&self) -> &BindingReactor {
        &self.reactor
    }

    pub fn state(&self) -> &BindingState {
        &self.state
    }

    /// Apply one watch event
    pub fn apply_event(&mut self, event: WatchEvent) -> SessionFlow {
        if let Some(name) = event.binding_name() {
            if name != self.reactor.name() {
                tracing::debug!(event_for = %name, target = %self.reactor.name(), "dropping stale watch event");
                return SessionFlow::Continue;
            }
        }

        match &event {
            WatchEvent::Error(msg) => {
                tracing::warn!("Watch event error: {}", msg);
                return SessionFlow::Continue;
            }
            WatchEvent::Stopped { reason, .. } => {
                tracing::warn!("Watcher stopped: {}", reason);
                return SessionFlow::Failed(reason.clone());
            }
            _ => {}
        }

        if !self.state.apply(&event) {
            return SessionFlow::Continue;
        }

        let effects = self
            .reactor
            .observe(self.state.binding(), self.state.loaded());
        if !effects.is_empty() {
            tracing::debug!(count = effects.len(), "effects dispatched");
        }

        match self.settled_phase() {
            Some(phase) if self.exit_on_terminal => SessionFlow::Finished(phase),
            _ => SessionFlow::Continue,
        }
    }

    /// Terminal phase after which nothing more is expected from the binding
    ///
    /// `Injected` only counts once a synced secret is referenced; until then
    /// the operator may still fill it in.
    fn settled_phase(&self) -> Option<BindingPhase> {
        match self.reactor.last_phase()? {
            BindingPhase::Injected => {
                let secret = self.state.binding().and_then(|b| b.synced_secret_name());
                if secret.is_none() {
                    tracing::info!(binding = %self.reactor.name(), "Injected without secret, still watching");
                }
                secret.map(|_| BindingPhase::Injected)
            }
            phase if phase.is_terminal() => Some(phase.clone()),
            _ => None,
        }
    }

    /// Retarget to another binding name, forgetting the old value
    pub fn set_name(&mut self, name: &str) {
        self.state.clear();
        self.reactor.set_name(name);
    }

    pub fn teardown(&mut self) {
        self.reactor.teardown();
    }
}

/// A live authorization session for one binding
pub struct AuthSession {
    watcher: BindingWatcher,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
    driver: SessionDriver,
}

impl AuthSession {
    /// Start watching the reactor's target binding
    pub fn start(client: kube::Client, reactor: BindingReactor, exit_on_terminal: bool) -> Result<Self> {
        let (mut watcher, event_rx) = BindingWatcher::new(client, reactor.namespace());
        watcher
            .watch(reactor.name())
            .context("Failed to start binding watcher")?;

        Ok(Self {
            watcher,
            event_rx,
            driver: SessionDriver::new(reactor, exit_on_terminal),
        })
    }

    /// Run until a terminal phase, Ctrl-C, or the watcher giving up
    pub async fn run(mut self) -> Result<SessionOutcome> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    let Some(event) = event else {
                        self.shutdown();
                        return Ok(SessionOutcome::Closed);
                    };
                    if let WatchEvent::Error(msg) = &event {
                        eprintln!("warning: {}", msg);
                    }
                    match self.driver.apply_event(event) {
                        SessionFlow::Continue => {}
                        SessionFlow::Finished(phase) => {
                            self.shutdown();
                            return Ok(SessionOutcome::Finished(phase));
                        }
                        SessionFlow::Failed(msg) => {
                            self.shutdown();
                            return Err(anyhow::anyhow!(msg));
                        }
                    }
                }
                _ = &mut ctrl_c => {
                    tracing::debug!("interrupted");
                    self.shutdown();
                    return Ok(SessionOutcome::Interrupted);
                }
            }
        }
    }

    /// Stop the watcher and tear down the reactor
    pub fn shutdown(&mut self) {
        self.watcher.stop();
        self.driver.teardown();
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
