//! Image export through `plotly_static`
//!
//! `plotly_static` renders the figure in a headless Chrome driven over
//! WebDriver. It names its output after the image format, so files saved as
//! `.jpg` or with an upper-case extension are renamed afterwards.

use super::saver::{ExportFormat, ImageBackend, ImageExportError};
use plotly_static::{ImageFormat, StaticExporterBuilder};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// [`ImageBackend`] rendering with a local chromedriver
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDriverBackend;

fn image_format(format: ExportFormat) -> Result<ImageFormat, ImageExportError> {
    match format {
        ExportFormat::Png => Ok(ImageFormat::PNG),
        ExportFormat::Jpeg => Ok(ImageFormat::JPEG),
        ExportFormat::Webp => Ok(ImageFormat::WEBP),
        ExportFormat::Svg => Ok(ImageFormat::SVG),
        ExportFormat::Pdf => Ok(ImageFormat::PDF),
        other => Err(ImageExportError::Failed(format!(
            "'{}' is not an image format",
            other.extension()
        ))),
    }
}

impl ImageBackend for WebDriverBackend {
    fn export(
        &self,
        figure: &Value,
        format: ExportFormat,
        width: usize,
        height: usize,
        scale: f64,
        path: &Path,
    ) -> Result<(), ImageExportError> {
        let image_format = image_format(format)?;

        // Failing to start is how plotly_static reports a missing driver
        let mut exporter = StaticExporterBuilder::default()
            .build()
            .map_err(|e| ImageExportError::BrowserMissing(e.to_string()))?;

        exporter
            .write_fig(path, figure, image_format, width, height, scale)
            .map_err(|e| ImageExportError::Failed(format!("Failed to export image: {}", e)))?;

        let written = path.with_extension(format.extension());
        if written != path {
            fs::rename(&written, path).map_err(|e| {
                ImageExportError::Failed(format!(
                    "could not move '{}' to '{}': {}",
                    written.display(),
                    path.display(),
                    e
                ))
            })?;
        }

        debug!(path = %path.display(), width, height, "Exported static image");
        Ok(())
    }
}
