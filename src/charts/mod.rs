//! Chart controllers: each owns its filter state, scales and scenes, and
//! turns user input into data joins.

mod bar_chart;
pub mod filters;
mod grouped_bar_chart;
mod line_chart;
mod scatter_chart;

pub use bar_chart::{BarChart, BarChartConfig};
pub use grouped_bar_chart::{Chip, GroupedBarChart, GroupedBarChartConfig};
pub use line_chart::{LineChart, LineChartConfig, LineSeries};
pub use scatter_chart::{ScatterChart, ScatterChartConfig, Tooltip};

use crate::core::{Margins, PlotArea, Viewport};
use crate::interaction::SelectionChanged;
use crate::render::RenderFrame;

/// Common surface of every chart controller.
pub trait ChartView {
    fn view_id(&self) -> &'static str;

    /// Drives all scenes to `now_ms`; returns `true` while anything animates.
    fn tick(&mut self, now_ms: f64) -> bool;

    fn is_animating(&self) -> bool;

    fn render_frame(&self) -> RenderFrame;
}

/// Views that restyle when another view's selection changes.
pub trait SelectionListener {
    fn on_selection(&mut self, event: &SelectionChanged);
}

/// Frame viewport large enough for `plot` inside `margins`.
pub(crate) fn frame_viewport(viewport: Viewport, margins: Margins, plot: PlotArea) -> Viewport {
    let width = (margins.left + plot.width + margins.right).ceil().max(1.0) as u32;
    let height = (margins.top + plot.height + margins.bottom).ceil().max(1.0) as u32;
    Viewport::new(viewport.width.max(width), viewport.height.max(height))
}
