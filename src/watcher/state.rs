//! Watched value state
//!
//! Folds `WatchEvent`s into the `(value, loaded)` pair the reactor consumes.

use kube::ResourceExt;

use super::WatchEvent;
use crate::models::SPIAccessTokenBinding;

/// Current value of the watched binding plus the loaded flag
#[derive(Debug, Clone, Default)]
pub struct BindingState {
    binding: Option<SPIAccessTokenBinding>,
    loaded: bool,
    /// Value collected while a list is in progress; `Some(None)` means the
    /// list has not returned the binding (yet)
    relist: Option<Option<SPIAccessTokenBinding>>,
}

impl BindingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding(&self) -> Option<&SPIAccessTokenBinding> {
        self.binding.as_ref()
    }

    /// True once a list has completed or an object was seen
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Apply an event, returning true when the reactor should re-evaluate
    ///
    /// While a list is in progress the visible value stays untouched and is
    /// replaced in one step when the list finishes. A binding deleted while
    /// the watch was disconnected therefore disappears at that point.
    pub fn apply(&mut self, event: &WatchEvent) -> bool {
        match event {
            WatchEvent::Applied(obj) => match self.relist.as_mut() {
                Some(buffered) => {
                    *buffered = Some(obj.as_ref().clone());
                    false
                }
                None => {
                    self.binding = Some(obj.as_ref().clone());
                    self.loaded = true;
                    true
                }
            },
            WatchEvent::Deleted { namespace, name } => match self.relist.as_mut() {
                Some(buffered) => {
                    if is_named(buffered.as_ref(), namespace, name) {
                        *buffered = None;
                    }
                    false
                }
                None => {
                    let matches = is_named(self.binding.as_ref(), namespace, name);
                    if matches {
                        self.binding = None;
                    }
                    matches
                }
            },
            WatchEvent::Relisting { .. } => {
                self.relist = Some(None);
                false
            }
            WatchEvent::Loaded { .. } => {
                let mut changed = !self.loaded;
                if let Some(listed) = self.relist.take() {
                    self.binding = listed;
                    changed = true;
                }
                self.loaded = true;
                changed
            }
            WatchEvent::Error(_) | WatchEvent::Stopped { .. } => false,
        }
    }

    /// Forget everything (used when the watched name changes)
    pub fn clear(&mut self) {
        self.binding = None;
        self.loaded = false;
        self.relist = None;
    }
}

fn is_named(binding: Option<&SPIAccessTokenBinding>, namespace: &str, name: &str) -> bool {
    binding.is_some_and(|b| b.namespace().as_deref() == Some(namespace) && b.name_any() == name)
}
