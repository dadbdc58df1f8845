//! Plotly engine
//!
//! Builders for every plot type plus the file saver. Each builder runs the
//! same pipeline:
//!
//! 1. check that every bound column exists in the data
//! 2. express pass: one trace per group of the discrete grouping columns
//! 3. plot-type specific additions (trendlines for scatter plots)
//! 4. theming pass: titles, size, template, axes, trace styling

pub mod bar;
pub mod boxplot;
pub mod data;
pub mod express;
pub mod figure;
pub mod line;
pub mod saver;
pub mod scatter;
#[cfg(feature = "static-export")]
pub mod static_export;
pub mod template;
pub mod theming;

pub use figure::PlotlyFigure;
pub use saver::{
    install_chromedriver, save, save_with, ExportFormat, ImageBackend, ImageExportError,
    PlotlyJsSource, SaveOptions, UnavailableBackend,
};
#[cfg(feature = "static-export")]
pub use static_export::WebDriverBackend;

use super::Registry;
use crate::figure::Figure;
use crate::plot::{Engine, PlotConfig, PlotType};
use crate::VueError;

/// Error for a builder handed another plot type's configuration
fn mismatched(expected: PlotType, config: &PlotConfig) -> VueError {
    VueError::InternalError(format!(
        "{} builder received a {} configuration",
        expected,
        config.plot_type()
    ))
}

/// Register the Plotly builders and saver
pub fn register(registry: &mut Registry) {
    registry.register_builder(PlotType::Scatter, Engine::Plotly, |data, config| match config {
        PlotConfig::Scatter(c) => scatter::build(data, c).map(Figure::Plotly),
        other => Err(mismatched(PlotType::Scatter, other)),
    });
    registry.register_builder(PlotType::Line, Engine::Plotly, |data, config| match config {
        PlotConfig::Line(c) => line::build(data, c).map(Figure::Plotly),
        other => Err(mismatched(PlotType::Line, other)),
    });
    registry.register_builder(PlotType::Bar, Engine::Plotly, |data, config| match config {
        PlotConfig::Bar(c) => bar::build(data, c).map(Figure::Plotly),
        other => Err(mismatched(PlotType::Bar, other)),
    });
    registry.register_builder(PlotType::Box, Engine::Plotly, |data, config| match config {
        PlotConfig::Box(c) => boxplot::build(data, c).map(Figure::Plotly),
        other => Err(mismatched(PlotType::Box, other)),
    });
    registry.register_saver(Engine::Plotly, save);
}
