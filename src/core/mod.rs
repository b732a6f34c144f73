pub mod axis;
pub mod color;
pub mod color_scale;
pub mod dataset;
pub mod line_path;
pub mod scale;
pub mod types;

pub use axis::{Axis, AxisOrient, AxisTick};
pub use color::Color;
pub use color_scale::{OrdinalColorScale, SequentialColorScale};
pub use dataset::{CountryIndicators, InternetUseRecord};
pub use line_path::{Curve, line_path};
pub use scale::{BandScale, LinearScale, SqrtScale, extent};
pub use types::{Key, Margins, PlotArea, Viewport};
