use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::Key;
use crate::interaction::channel::{EventChannel, SubscriptionId};

/// Current selection state.
///
/// `filtering` distinguishes "nothing selected, show everything" from "a
/// region was chosen and captured nothing".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub keys: IndexSet<Key>,
    pub filtering: bool,
}

impl SelectionSnapshot {
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether `key` should be drawn as highlighted.
    #[must_use]
    pub fn admits(&self, key: &str) -> bool {
        !self.filtering || self.keys.contains(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionChanged {
    /// Name of the view that owns the broadcaster.
    pub source: String,
    pub selection: SelectionSnapshot,
}

/// Owns a set of selected keys and notifies subscribers after every mutation.
///
/// Each mutating call produces exactly one notification, even when the set
/// did not change.
#[derive(Debug)]
pub struct SelectionBroadcaster {
    source: String,
    selection: SelectionSnapshot,
    channel: EventChannel<SelectionChanged>,
    notifications: u64,
}

impl SelectionBroadcaster {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            selection: SelectionSnapshot::default(),
            channel: EventChannel::new(),
            notifications: 0,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Adds `key` if absent, removes it otherwise. Returns `true` when the key
    /// is selected afterwards.
    pub fn toggle(&mut self, key: impl Into<Key>) -> bool {
        let key = key.into();
        let selected = if self.selection.keys.shift_remove(&key) {
            false
        } else {
            self.selection.keys.insert(key);
            true
        };
        self.selection.filtering = !self.selection.keys.is_empty();
        self.notify();
        selected
    }

    pub fn clear(&mut self) {
        self.selection.keys.clear();
        self.selection.filtering = false;
        self.notify();
    }

    /// Replaces the whole selection with a chosen region, possibly empty.
    pub fn replace(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.selection.keys = keys.into_iter().collect();
        self.selection.filtering = true;
        self.notify();
    }

    #[must_use]
    pub fn snapshot(&self) -> SelectionSnapshot {
        self.selection.clone()
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionSnapshot {
        &self.selection
    }

    #[must_use]
    pub fn is_selected(&self, key: &str) -> bool {
        self.selection.contains(key)
    }

    pub fn subscribe(&self, handler: impl FnMut(&SelectionChanged) + 'static) -> SubscriptionId {
        self.channel.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }

    /// Shared handle for wiring views without borrowing the broadcaster.
    #[must_use]
    pub fn channel(&self) -> EventChannel<SelectionChanged> {
        self.channel.clone()
    }

    #[must_use]
    pub fn notification_count(&self) -> u64 {
        self.notifications
    }

    fn notify(&mut self) {
        self.notifications += 1;
        let event = SelectionChanged {
            source: self.source.clone(),
            selection: self.selection.clone(),
        };
        let delivered = self.channel.publish(&event);
        debug!(
            source = %self.source,
            selected = self.selection.len(),
            filtering = self.selection.filtering,
            delivered,
            "selection changed"
        );
    }
}
