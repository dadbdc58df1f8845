//! Plot entry points
//!
//! Every entry point runs the same flow: validate the parameters into a
//! [`PlotConfig`], look up the builder for `(plot type, engine)` in the
//! process-wide registry, build the figure and, when a path is given, hand it
//! to the engine's saver.

use crate::engines;
use crate::figure::Figure;
use crate::plot::{Engine, PlotConfig, PlotType};
use crate::{DataFrame, Result};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Validate `params` for `plot_type` and build (and optionally save) the figure
pub fn create_plot(
    plot_type: PlotType,
    data: &DataFrame,
    engine: Engine,
    file_path: Option<&Path>,
    params: Value,
) -> Result<Figure> {
    let config = PlotConfig::from_params(plot_type, params)?;
    plot_with_config(data, engine, file_path, &config)
}

/// Build (and optionally save) a figure from an already validated configuration
pub fn plot_with_config(
    data: &DataFrame,
    engine: Engine,
    file_path: Option<&Path>,
    config: &PlotConfig,
) -> Result<Figure> {
    let plot_type = config.plot_type();
    let build = engines::get_builder(plot_type, engine)?;
    debug!(%plot_type, %engine, rows = data.height(), "Building plot");
    let figure = build(data, config)?;

    if let Some(path) = file_path {
        let save = engines::get_saver(engine)?;
        save(&figure, path)?;
    }
    Ok(figure)
}

pub fn create_scatter_plot(
    data: &DataFrame,
    engine: Engine,
    file_path: Option<&Path>,
    params: Value,
) -> Result<Figure> {
    create_plot(PlotType::Scatter, data, engine, file_path, params)
}

pub fn create_line_plot(
    data: &DataFrame,
    engine: Engine,
    file_path: Option<&Path>,
    params: Value,
) -> Result<Figure> {
    create_plot(PlotType::Line, data, engine, file_path, params)
}

pub fn create_bar_plot(
    data: &DataFrame,
    engine: Engine,
    file_path: Option<&Path>,
    params: Value,
) -> Result<Figure> {
    create_plot(PlotType::Bar, data, engine, file_path, params)
}

pub fn create_box_plot(
    data: &DataFrame,
    engine: Engine,
    file_path: Option<&Path>,
    params: Value,
) -> Result<Figure> {
    create_plot(PlotType::Box, data, engine, file_path, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VueError;
    use polars::prelude::*;
    use serde_json::json;

    fn frame() -> DataFrame {
        df! {
            "sample" => &["S1", "S1", "S2", "S2", "S3", "S3"],
            "protein" => &["P1", "P2", "P1", "P2", "P1", "P2"],
            "intensity" => &[21.3, 18.9, 22.1, 19.4, 20.8, 18.2],
        }
        .unwrap()
    }

    #[test]
    fn test_bar_plot_to_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plots").join("bar.json");
        let figure = create_bar_plot(
            &frame(),
            Engine::Plotly,
            Some(out.as_path()),
            json!({"x": "sample", "y": "intensity", "color": "protein", "barmode": "group"}),
        )
        .unwrap();

        assert_eq!(figure.engine(), Engine::Plotly);
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written, figure.to_json());
        assert_eq!(written["layout"]["barmode"], "group");
    }

    #[test]
    fn test_box_plot_without_saving() {
        let figure = create_box_plot(
            &frame(),
            Engine::default(),
            None,
            json!({"x": "protein", "y": "intensity", "points": "all"}),
        )
        .unwrap();
        assert_eq!(figure.as_plotly().unwrap().traces()[0]["boxpoints"], "all");
    }

    #[test]
    fn test_missing_required_field() {
        let err = create_line_plot(&frame(), Engine::Plotly, None, json!({"x": "sample"}))
            .unwrap_err();
        assert!(matches!(err, VueError::MissingField { ref field, .. } if field == "y"));
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plot.bmp");
        let err = create_scatter_plot(
            &frame(),
            Engine::Plotly,
            Some(out.as_path()),
            json!({"x": "sample", "y": "intensity"}),
        )
        .unwrap_err();
        assert!(matches!(err, VueError::UnsupportedFormat { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_plot_with_typed_config() {
        let config =
            PlotConfig::from_params(PlotType::Scatter, json!({"x": "sample", "y": "intensity"}))
                .unwrap();
        let figure = plot_with_config(&frame(), Engine::Plotly, None, &config).unwrap();
        assert_eq!(figure.as_plotly().unwrap().traces().len(), 1);
    }

    #[cfg(feature = "static-export")]
    #[test]
    #[ignore = "needs Chrome and a chromedriver on WEBDRIVER_PATH"]
    fn test_scatter_plot_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("scatter.png");
        create_scatter_plot(
            &frame(),
            Engine::Plotly,
            Some(out.as_path()),
            json!({"x": "sample", "y": "intensity", "color": "protein"}),
        )
        .unwrap();
        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }
}
