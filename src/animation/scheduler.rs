use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

use crate::animation::easing::Easing;
use crate::animation::interpolate::interpolate;
use crate::join::{Attributes, ElementId, ElementStore, RenderedElement};

/// Named subset of an element's attributes; each group carries at most one
/// active transition.
pub type AttrGroup = &'static str;

pub const DEFAULT_GROUP: AttrGroup = "main";

/// What happens once a transition reaches its target.
pub enum Completion {
    None,
    /// Remove the element from its store (exit transitions).
    Remove,
    Callback(Box<dyn FnOnce(ElementId)>),
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Remove => f.write_str("Remove"),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Request for one animation: `from -> to` over `duration_ms`.
#[derive(Debug)]
pub struct TransitionSpec {
    from: Attributes,
    to: Attributes,
    duration_ms: f64,
    easing: Easing,
    completion: Completion,
}

impl TransitionSpec {
    #[must_use]
    pub fn new(to: Attributes, duration_ms: f64) -> Self {
        Self {
            from: Attributes::new(),
            to,
            duration_ms,
            easing: Easing::default(),
            completion: Completion::None,
        }
    }

    /// Starting values, applied only when nothing is in flight for the group.
    #[must_use]
    pub fn from(mut self, from: Attributes) -> Self {
        self.from = from;
        self
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn remove_on_complete(mut self) -> Self {
        self.completion = Completion::Remove;
        self
    }

    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce(ElementId) + 'static) -> Self {
        self.completion = Completion::Callback(Box::new(callback));
        self
    }
}

#[derive(Debug)]
struct ActiveTransition {
    start_ms: f64,
    duration_ms: f64,
    easing: Easing,
    start: Attributes,
    target: Attributes,
    completion: Completion,
}

impl ActiveTransition {
    fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }
}

/// Elements touched by one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Transitions that reached their target this tick (including removals).
    pub completed: Vec<ElementId>,
    /// Elements removed from the store by exit transitions.
    pub removed: Vec<ElementId>,
}

/// Cooperative, tick-driven animation driver.
///
/// Time only moves when the host calls [`TransitionScheduler::tick`] (from a
/// display-refresh callback or a simulated clock). Transitions progress
/// independently; restarting one on the same `(element, group)` cancels the
/// previous one without running its completion and continues from the
/// element's current values.
#[derive(Debug, Default)]
pub struct TransitionScheduler {
    now_ms: f64,
    active: IndexMap<(ElementId, AttrGroup), ActiveTransition>,
}

impl TransitionScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    #[must_use]
    pub fn is_animating(&self, id: ElementId) -> bool {
        self.active.keys().any(|(element, _)| *element == id)
    }

    /// Starts animating `element`; the transition begins at the current clock.
    pub fn animate(&mut self, element: &mut RenderedElement, group: AttrGroup, spec: TransitionSpec) {
        let slot = (element.id(), group);
        if self.active.shift_remove(&slot).is_some() {
            trace!(element = element.id().get(), group, "superseding in-flight transition");
        } else {
            element.attributes_mut().merge(&spec.from);
        }

        let mut start = Attributes::new();
        for (attr, target) in spec.to.iter() {
            let current = element
                .attributes()
                .get(*attr)
                .cloned()
                .unwrap_or_else(|| target.clone());
            start.set(*attr, current);
        }

        self.active.insert(
            slot,
            ActiveTransition {
                start_ms: self.now_ms,
                duration_ms: spec.duration_ms,
                easing: spec.easing,
                start,
                target: spec.to,
                completion: spec.completion,
            },
        );
    }

    /// Drops every transition of `id` without running completions.
    pub fn cancel_element(&mut self, id: ElementId) -> usize {
        let before = self.active.len();
        self.active.retain(|(element, _), _| *element != id);
        before - self.active.len()
    }

    /// Advances the clock by `delta_ms` and ticks.
    pub fn advance(&mut self, delta_ms: f64, store: &mut ElementStore) -> TickReport {
        self.tick(self.now_ms + delta_ms.max(0.0), store)
    }

    /// Moves the clock to `now_ms` (never backwards) and writes interpolated
    /// values into `store`.
    pub fn tick(&mut self, now_ms: f64, store: &mut ElementStore) -> TickReport {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }

        let mut finished = Vec::new();
        let mut orphaned = Vec::new();
        for (slot, transition) in &self.active {
            let Some(element) = store.by_id_mut(slot.0) else {
                orphaned.push(*slot);
                continue;
            };
            let progress = transition.progress(self.now_ms);
            if progress >= 1.0 {
                element.attributes_mut().merge(&transition.target);
                finished.push(*slot);
                continue;
            }
            let eased = transition.easing.apply(progress);
            for (attr, target) in transition.target.iter() {
                if let Some(from) = transition.start.get(*attr) {
                    element
                        .attributes_mut()
                        .set(*attr, interpolate(from, target, eased));
                }
            }
        }

        for slot in orphaned {
            self.active.shift_remove(&slot);
        }

        let mut report = TickReport::default();
        for slot in finished {
            let Some(transition) = self.active.shift_remove(&slot) else {
                continue;
            };
            let id = slot.0;
            report.completed.push(id);
            match transition.completion {
                Completion::None => {}
                Completion::Remove => {
                    self.cancel_element(id);
                    if store.remove_by_id(id).is_some() {
                        report.removed.push(id);
                    }
                }
                Completion::Callback(callback) => callback(id),
            }
        }
        report
    }
}
