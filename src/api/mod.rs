//! Dashboard assembly: configuration and the four linked views.

mod config;
mod dashboard;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
