use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::animation::{DEFAULT_GROUP, Easing, TickReport, TransitionScheduler, TransitionSpec};
use crate::core::Key;
use crate::error::ChartResult;
use crate::join::element::{Attributes, ElementStore, MarkKind, RenderedElement};
use crate::join::reconcile::reconcile;

/// Per-chart mapping from a datum to element attributes.
pub trait Encoding<T> {
    fn key(&self, datum: &T) -> Key;

    /// Enclosing group for nested joins.
    fn parent(&self, _datum: &T) -> Option<Key> {
        None
    }

    /// Initial attributes of a newly created element.
    fn enter(&self, datum: &T) -> Attributes;

    /// Target attributes for entering and updating elements.
    fn update(&self, datum: &T) -> Attributes;

    /// Target attributes an exiting element animates to before removal.
    fn exit(&self, element: &RenderedElement) -> Attributes;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoinTiming {
    pub enter_ms: f64,
    pub update_ms: f64,
    pub exit_ms: f64,
    #[serde(default)]
    pub easing: Easing,
}

impl JoinTiming {
    #[must_use]
    pub fn new(update_ms: f64, exit_ms: f64) -> Self {
        Self {
            enter_ms: update_ms,
            update_ms,
            exit_ms,
            easing: Easing::default(),
        }
    }

    #[must_use]
    pub fn with_enter_ms(mut self, enter_ms: f64) -> Self {
        self.enter_ms = enter_ms;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JoinSummary {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
    /// Updated elements that were exiting and got their removal cancelled.
    pub revived: usize,
}

/// Elements of one mark type plus the scheduler animating them.
///
/// Exiting elements stay in the scene (and joinable by key) until their exit
/// transition completes.
#[derive(Debug)]
pub struct Scene {
    name: &'static str,
    kind: MarkKind,
    store: ElementStore,
    scheduler: TransitionScheduler,
}

impl Scene {
    #[must_use]
    pub fn new(name: &'static str, kind: MarkKind) -> Self {
        Self {
            name,
            kind,
            store: ElementStore::new(),
            scheduler: TransitionScheduler::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Binds `data` to the scene and schedules enter/update/exit transitions.
    ///
    /// On a duplicate key nothing changes and the error is returned.
    pub fn join<T>(
        &mut self,
        data: &[T],
        encoding: &impl Encoding<T>,
        timing: JoinTiming,
    ) -> ChartResult<JoinSummary> {
        let previous: Vec<Key> = self.store.keys().cloned().collect();
        let partition = reconcile(&previous, data, |datum| encoding.key(datum)).inspect_err(
            |err| error!(scene = self.name, error = %err, "rejecting data join"),
        )?;

        let mut summary = JoinSummary::default();

        for datum in partition.enter {
            let id = self.store.insert(
                encoding.key(datum),
                self.kind,
                encoding.parent(datum),
                encoding.enter(datum),
            );
            if let Some(element) = self.store.by_id_mut(id) {
                let spec = TransitionSpec::new(encoding.update(datum), timing.enter_ms)
                    .easing(timing.easing);
                self.scheduler.animate(element, DEFAULT_GROUP, spec);
            }
            summary.entered += 1;
        }

        for (key, datum) in partition.update {
            let Some(element) = self.store.get_mut(key.as_str()) else {
                continue;
            };
            if element.is_exiting() {
                element.set_exiting(false);
                summary.revived += 1;
            }
            element.set_parent(encoding.parent(datum));
            let spec =
                TransitionSpec::new(encoding.update(datum), timing.update_ms).easing(timing.easing);
            self.scheduler.animate(element, DEFAULT_GROUP, spec);
            summary.updated += 1;
        }

        for key in partition.exit {
            let Some(element) = self.store.get_mut(key.as_str()) else {
                continue;
            };
            if element.is_exiting() {
                continue;
            }
            element.set_exiting(true);
            let target = encoding.exit(element);
            let spec = TransitionSpec::new(target, timing.exit_ms)
                .easing(timing.easing)
                .remove_on_complete();
            self.scheduler.animate(element, DEFAULT_GROUP, spec);
            summary.exited += 1;
        }

        debug!(
            scene = self.name,
            entered = summary.entered,
            updated = summary.updated,
            exited = summary.exited,
            revived = summary.revived,
            "joined data"
        );
        Ok(summary)
    }

    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        self.scheduler.tick(now_ms, &mut self.store)
    }

    pub fn advance(&mut self, delta_ms: f64) -> TickReport {
        self.scheduler.advance(delta_ms, &mut self.store)
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.scheduler.is_idle()
    }

    #[must_use]
    pub fn scheduler(&self) -> &TransitionScheduler {
        &self.scheduler
    }

    /// All elements, exiting ones included, in creation order.
    pub fn elements(&self) -> impl Iterator<Item = &RenderedElement> {
        self.store.iter()
    }

    /// Elements that are not on their way out.
    pub fn live_elements(&self) -> impl Iterator<Item = &RenderedElement> {
        self.store.iter().filter(|element| !element.is_exiting())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RenderedElement> {
        self.store.get(key)
    }

    /// Direct, untransitioned attribute writes (selection styling, hover).
    pub fn get_mut(&mut self, key: &str) -> Option<&mut RenderedElement> {
        self.store.get_mut(key)
    }

    pub fn restyle(&mut self, mut apply: impl FnMut(&mut RenderedElement)) {
        for element in self.store.iter_mut() {
            apply(element);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
