//! chart-join: keyed data joins, animated transitions and linked selections
//! for small statistical dashboards.
//!
//! The crate is split the same way end to end:
//! - `core`: typed CSV records, scales, color scales, axes and path data.
//! - `join`: the keyed reconciler and scenes of rendered elements.
//! - `animation`: easing, interpolation and the transition scheduler.
//! - `interaction`: selection broadcasting and brush hit-testing.
//! - `charts`: the bar, line, grouped-bar and scatter controllers.
//! - `render`: backend-agnostic frames plus null and SVG renderers.
//! - `api`: the dashboard wiring the four views together.

pub mod animation;
pub mod api;
pub mod charts;
pub mod core;
pub mod error;
pub mod interaction;
pub mod join;
pub mod render;
pub mod telemetry;

pub use api::{Dashboard, DashboardConfig};
pub use error::{ChartError, ChartResult};
