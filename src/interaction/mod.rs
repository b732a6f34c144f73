//! Pointer gestures and cross-view selection state.

mod brush;
mod channel;
mod selection;

pub use brush::{BrushEvent, BrushGesture, BrushOutcome, BrushPhase, BrushRect, hit_test};
pub use channel::{EventChannel, SubscriptionId};
pub use selection::{SelectionBroadcaster, SelectionChanged, SelectionSnapshot};
