use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::charts::{BarChartConfig, GroupedBarChartConfig, LineChartConfig, ScatterChartConfig};
use crate::error::{ChartError, ChartResult};

/// Dashboard bootstrap configuration.
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_internet_use_path")]
    pub internet_use_path: PathBuf,
    #[serde(default = "default_gapminder_path")]
    pub gapminder_path: PathBuf,
    /// Simulated frame interval used by [`crate::api::Dashboard::settle`].
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,
    #[serde(default)]
    pub bar_chart: BarChartConfig,
    #[serde(default)]
    pub line_chart: LineChartConfig,
    #[serde(default)]
    pub grouped_bar_chart: GroupedBarChartConfig,
    #[serde(default)]
    pub scatter_chart: ScatterChartConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            internet_use_path: default_internet_use_path(),
            gapminder_path: default_gapminder_path(),
            frame_ms: default_frame_ms(),
            bar_chart: BarChartConfig::default(),
            line_chart: LineChartConfig::default(),
            grouped_bar_chart: GroupedBarChartConfig::default(),
            scatter_chart: ScatterChartConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| ChartError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ChartResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            ChartError::InvalidConfig(format!("cannot read `{}`: {err}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| ChartError::InvalidConfig(err.to_string()))
    }

    /// Sets both input files.
    #[must_use]
    pub fn with_paths(
        mut self,
        internet_use_path: impl Into<PathBuf>,
        gapminder_path: impl Into<PathBuf>,
    ) -> Self {
        self.internet_use_path = internet_use_path.into();
        self.gapminder_path = gapminder_path.into();
        self
    }

    #[must_use]
    pub fn with_frame_ms(mut self, frame_ms: f64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.frame_ms.is_finite() || self.frame_ms <= 0.0 {
            return Err(ChartError::InvalidConfig(format!(
                "frame_ms must be finite and > 0, got {}",
                self.frame_ms
            )));
        }
        for (name, viewport) in [
            ("bar_chart", self.bar_chart.viewport),
            ("line_chart", self.line_chart.viewport),
            ("grouped_bar_chart", self.grouped_bar_chart.viewport),
            ("scatter_chart", self.scatter_chart.viewport),
        ] {
            if !viewport.is_valid() {
                return Err(ChartError::InvalidConfig(format!(
                    "{name} viewport must be non-empty, got {}x{}",
                    viewport.width, viewport.height
                )));
            }
        }
        for (name, opacity) in [
            ("bar_chart", self.bar_chart.dimmed_opacity),
            ("grouped_bar_chart", self.grouped_bar_chart.dimmed_opacity),
            ("scatter_chart", self.scatter_chart.dimmed_opacity),
        ] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(ChartError::InvalidConfig(format!(
                    "{name} dimmed_opacity must be in [0, 1], got {opacity}"
                )));
            }
        }
        Ok(())
    }
}

fn default_internet_use_path() -> PathBuf {
    PathBuf::from("data/internet-use-sample.csv")
}

fn default_gapminder_path() -> PathBuf {
    PathBuf::from("data/gapminder_internet.csv")
}

fn default_frame_ms() -> f64 {
    16.0
}

#[cfg(test)]
mod tests {
    use super::DashboardConfig;

    #[test]
    fn empty_object_uses_defaults() {
        let config = DashboardConfig::from_json_str("{}").expect("defaults");
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.bar_chart.top_n, 5);
    }

    #[test]
    fn non_positive_frame_interval_is_rejected() {
        assert!(DashboardConfig::from_json_str(r#"{"frame_ms": 0}"#).is_err());
    }

    #[test]
    fn dimmed_opacity_outside_unit_interval_is_rejected() {
        let json = r#"{"grouped_bar_chart":{"dimmed_opacity":1.5}}"#;
        assert!(DashboardConfig::from_json_str(json).is_err());
        let json = r#"{"bar_chart":{"dimmed_opacity":0.1}}"#;
        let config = DashboardConfig::from_json_str(json).expect("in range");
        assert_eq!(config.bar_chart.dimmed_opacity, 0.1);
    }
}
