//! Keyed data joins: partitioning new data against rendered elements and
//! applying the partition through animated transitions.

mod element;
mod reconcile;
mod scene;

pub use element::{Attr, AttrValue, Attributes, ElementId, ElementStore, MarkKind, RenderedElement};
pub use reconcile::{Partition, reconcile};
pub use scene::{Encoding, JoinSummary, JoinTiming, Scene};
