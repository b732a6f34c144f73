//! Tick-driven attribute transitions.

mod easing;
mod interpolate;
mod scheduler;

pub use easing::Easing;
pub use interpolate::interpolate;
pub use scheduler::{
    AttrGroup, Completion, DEFAULT_GROUP, TickReport, TransitionScheduler, TransitionSpec,
};
