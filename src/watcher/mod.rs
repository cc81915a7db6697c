//! Watcher module
//!
//! Watches a single `SPIAccessTokenBinding` by name and forwards its changes
//! over a channel. The watcher only transports state; reacting to it is the
//! reactor's job.

mod state;

pub use state::*;

use anyhow::Result;
use futures::StreamExt;
use kube::runtime::watcher;
use kube::{Api, Client, ResourceExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::SPIAccessTokenBinding;

/// Consecutive watch errors tolerated before the watcher gives up
pub const MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// Event emitted by the binding watcher
///
/// Every event except `Error` names the binding it concerns, so a consumer
/// that retargets can drop events still in flight for the previous name.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// Binding was added or updated
    Applied(Box<SPIAccessTokenBinding>),
    /// Binding was deleted
    Deleted { namespace: String, name: String },
    /// A (re)list started; objects up to the next `Loaded` replace the
    /// current value
    Relisting { name: String },
    /// List finished; the current value is now known
    Loaded { name: String },
    /// Watch error occurred
    Error(String),
    /// Watcher gave up after too many consecutive errors
    Stopped { name: String, reason: String },
}

impl WatchEvent {
    /// Name of the binding this event belongs to
    pub fn binding_name(&self) -> Option<&str> {
        match self {
            WatchEvent::Applied(obj) => obj.metadata.name.as_deref(),
            WatchEvent::Deleted { name, .. }
            | WatchEvent::Relisting { name }
            | WatchEvent::Loaded { name }
            | WatchEvent::Stopped { name, .. } => Some(name.as_str()),
            WatchEvent::Error(_) => None,
        }
    }
}

/// Field selector restricting a watch to one object
pub fn name_selector(name: &str) -> String {
    format!("metadata.name={}", name)
}

/// Watches one named binding in one namespace
///
/// `watch()` (re)starts the underlying stream for a new name; `stop()`
/// aborts it. Dropping the watcher stops it as well.
pub struct BindingWatcher {
    client: Client,
    namespace: String,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
    handle: Option<JoinHandle<()>>,
}

impl BindingWatcher {
    /// Create a new BindingWatcher for `namespace`
    pub fn new(
        client: Client,
        namespace: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                client,
                namespace: namespace.into(),
                event_tx: tx,
                handle: None,
            },
            rx,
        )
    }

    /// Start watching the binding called `name`
    ///
    /// Any previous watch is stopped first. An empty name only stops.
    pub fn watch(&mut self, name: &str) -> Result<()> {
        self.stop();
        if name.is_empty() {
            return Ok(());
        }

        let api: Api<SPIAccessTokenBinding> = Api::namespaced(self.client.clone(), &self.namespace);
        let config = watcher::Config::default().fields(&name_selector(name));
        let event_tx = self.event_tx.clone();
        let target = name.to_string();

        tracing::debug!(namespace = %self.namespace, name = %target, "starting binding watcher");

        let handle = tokio::spawn(async move {
            // The watcher performs the initial list itself (Init/InitApply/InitDone)
            let mut w = Box::pin(watcher(api, config));
            let mut error_count = 0u32;

            while let Some(event) = w.next().await {
                match event {
                    Ok(watcher::Event::InitApply(obj)) | Ok(watcher::Event::Apply(obj)) => {
                        error_count = 0;
                        tracing::debug!(name = %obj.name_any(), phase = ?obj.phase(), "binding applied");
                        if event_tx.send(WatchEvent::Applied(Box::new(obj))).is_err() {
                            break;
                        }
                    }
                    Ok(watcher::Event::Delete(obj)) => {
                        error_count = 0;
                        let deleted = WatchEvent::Deleted {
                            namespace: obj.namespace().unwrap_or_default(),
                            name: obj.name_any(),
                        };
                        if event_tx.send(deleted).is_err() {
                            break;
                        }
                    }
                    Ok(watcher::Event::Init) => {
                        error_count = 0;
                        let relisting = WatchEvent::Relisting {
                            name: target.clone(),
                        };
                        if event_tx.send(relisting).is_err() {
                            break;
                        }
                    }
                    Ok(watcher::Event::InitDone) => {
                        error_count = 0;
                        let loaded = WatchEvent::Loaded {
                            name: target.clone(),
                        };
                        if event_tx.send(loaded).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error_count += 1;
                        tracing::warn!(binding = %target, error = %e, "binding watcher error");
                        // Only report occasionally to avoid spam
                        if error_count == 1 || error_count.is_multiple_of(10) {
                            let _ = event_tx.send(WatchEvent::Error(format!(
                                "{} watcher error ({}): {}",
                                target, error_count, e
                            )));
                        }
                        if error_count >= MAX_CONSECUTIVE_ERRORS {
                            let _ = event_tx.send(WatchEvent::Stopped {
                                name: target.clone(),
                                reason: format!(
                                    "{} watcher stopped after {} consecutive errors",
                                    target, error_count
                                ),
                            });
                            break;
                        }
                        tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                    }
                }
            }
        });

        self.handle = Some(handle);
        Ok(())
    }

    /// Abort the watcher task
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for BindingWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
