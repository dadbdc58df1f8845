//! Writing Plotly figures to disk
//!
//! The output format is chosen from the file extension. Interactive HTML and
//! the raw figure JSON are written directly; raster and vector images are
//! rendered by an [`ImageBackend`], which by default drives a headless
//! browser through WebDriver.

use crate::naming;
use crate::{Figure, Result, VueError};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info, warn};

#[cfg(feature = "static-export")]
use super::static_export::WebDriverBackend;

/// Figure size used when the layout does not set one
const DEFAULT_WIDTH: usize = 800;
const DEFAULT_HEIGHT: usize = 600;

/// Browser driver fetched when image export finds none
const DRIVER_PACKAGE: &str = "chromedriver@stable";
const DRIVER_DIR: &str = "vuecore-webdriver";

/// Element id of the plot container in HTML output
const HTML_DIV_ID: &str = "vuecore-plot";

// =============================================================================
// Formats and options
// =============================================================================

/// File format of a saved plot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Webp,
    Svg,
    Pdf,
    Html,
    Json,
}

impl ExportFormat {
    /// Format for a path's extension, compared case-insensitively
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            "svg" => Ok(ExportFormat::Svg),
            "pdf" => Ok(ExportFormat::Pdf),
            "html" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            _ => Err(VueError::UnsupportedFormat {
                extension: format!(".{}", extension),
            }),
        }
    }

    /// Canonical extension, as image renderers name their output
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    /// Whether the format needs an image backend
    pub fn is_image(&self) -> bool {
        !matches!(self, ExportFormat::Html | ExportFormat::Json)
    }
}

/// Where HTML output loads plotly.js from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlotlyJsSource {
    /// The pinned plotly.js release on the public CDN
    #[default]
    Cdn,
    /// Any other script URL, e.g. a local copy
    Url(String),
}

impl PlotlyJsSource {
    fn url(&self) -> &str {
        match self {
            PlotlyJsSource::Cdn => naming::PLOTLYJS_CDN_URL,
            PlotlyJsSource::Url(url) => url,
        }
    }
}

/// Options for [`save_with`]
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOptions {
    pub plotlyjs: PlotlyJsSource,
    /// Pixel multiplier for raster images
    pub scale: f64,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            plotlyjs: PlotlyJsSource::Cdn,
            scale: 1.0,
        }
    }
}

// =============================================================================
// Image backends
// =============================================================================

/// Failure reported by an [`ImageBackend`]
#[derive(Debug, Error)]
pub enum ImageExportError {
    /// No browser or WebDriver binary could be started
    #[error("no browser driver available: {0}")]
    BrowserMissing(String),

    #[error("{0}")]
    Failed(String),
}

/// Renderer for the image formats
///
/// Implementations turn the figure document into a file at `path`. They
/// signal [`ImageExportError::BrowserMissing`] when the rendering browser is
/// unavailable, which makes the saver try [`ImageBackend::install_browser`]
/// once before giving up.
pub trait ImageBackend {
    /// Render `figure` (a `{"data", "layout"}` document) into `path`
    fn export(
        &self,
        figure: &Value,
        format: ExportFormat,
        width: usize,
        height: usize,
        scale: f64,
        path: &Path,
    ) -> std::result::Result<(), ImageExportError>;

    /// Make a browser driver available for the next `export` call
    fn install_browser(&self) -> std::result::Result<(), ImageExportError> {
        install_chromedriver().map(|_| ())
    }
}

/// Backend used when the crate is built without image export
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

impl ImageBackend for UnavailableBackend {
    fn export(
        &self,
        _figure: &Value,
        format: ExportFormat,
        _width: usize,
        _height: usize,
        _scale: f64,
        _path: &Path,
    ) -> std::result::Result<(), ImageExportError> {
        Err(ImageExportError::Failed(format!(
            "exporting .{} images requires the 'static-export' feature",
            format.extension()
        )))
    }

    fn install_browser(&self) -> std::result::Result<(), ImageExportError> {
        Err(ImageExportError::Failed(
            "image export is not enabled".to_string(),
        ))
    }
}

#[cfg(feature = "static-export")]
fn default_backend() -> Box<dyn ImageBackend> {
    Box::new(WebDriverBackend::default())
}

#[cfg(not(feature = "static-export"))]
fn default_backend() -> Box<dyn ImageBackend> {
    Box::new(UnavailableBackend)
}

/// Download chromedriver into the temp directory and point `WEBDRIVER_PATH` at it
pub fn install_chromedriver() -> std::result::Result<PathBuf, ImageExportError> {
    let dir = std::env::temp_dir().join(DRIVER_DIR);
    fs::create_dir_all(&dir).map_err(|e| ImageExportError::Failed(e.to_string()))?;

    info!("Installing {} into {}", DRIVER_PACKAGE, dir.display());
    let output = Command::new("npx")
        .args(["--yes", "@puppeteer/browsers", "install", DRIVER_PACKAGE, "--path"])
        .arg(&dir)
        .output()
        .map_err(|e| ImageExportError::Failed(format!("could not run npx: {}", e)))?;
    if !output.status.success() {
        return Err(ImageExportError::Failed(format!(
            "npx exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let driver = find_driver(&dir).ok_or_else(|| {
        ImageExportError::Failed(format!("no chromedriver binary found under {}", dir.display()))
    })?;
    std::env::set_var("WEBDRIVER_PATH", &driver);
    debug!(driver = %driver.display(), "Installed chromedriver");
    Ok(driver)
}

fn find_driver(dir: &Path) -> Option<PathBuf> {
    for entry in fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_driver(&path) {
                return Some(found);
            }
        } else if matches!(
            path.file_name().and_then(|n| n.to_str()),
            Some("chromedriver" | "chromedriver.exe")
        ) {
            return Some(path);
        }
    }
    None
}

// =============================================================================
// Saving
// =============================================================================

/// Save a figure with default options and the default image backend
pub fn save(figure: &Figure, path: &Path) -> Result<()> {
    let backend = default_backend();
    save_with(figure, path, &SaveOptions::default(), backend.as_ref())
}

/// Save a figure, rendering images through `backend`
pub fn save_with(
    figure: &Figure,
    path: &Path,
    options: &SaveOptions,
    backend: &dyn ImageBackend,
) -> Result<()> {
    let format = ExportFormat::from_path(path)?;
    let export_error = |message: String| VueError::Export {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            export_error(format!("could not create directory '{}': {}", parent.display(), e))
        })?;
    }

    let document = figure.to_json();
    match format {
        ExportFormat::Html => {
            let html = html_document(&document, options).map_err(export_error)?;
            fs::write(path, html).map_err(|e| export_error(e.to_string()))?;
        }
        ExportFormat::Json => {
            let json = serde_json::to_string(&document).map_err(|e| export_error(e.to_string()))?;
            fs::write(path, json).map_err(|e| export_error(e.to_string()))?;
        }
        _ => export_image(backend, &document, format, path, options).map_err(export_error)?,
    }

    info!("Plot saved to {}", path.display());
    Ok(())
}

/// Self-contained HTML page; every placeholder is filled in one pass
fn html_document(document: &Value, options: &SaveOptions) -> std::result::Result<String, String> {
    let encode = |value: &Value| {
        serde_json::to_string(value)
            .map(|s| s.replace("</", "<\\/"))
            .map_err(|e| e.to_string())
    };
    let data = encode(&document["data"])?;
    let layout = encode(&document["layout"])?;
    let plotlyjs = options.plotlyjs.url().replace('"', "&quot;");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<script src="{plotlyjs}" charset="utf-8"></script>
</head>
<body>
<div id="{id}" class="plotly-graph-div" style="height:100%; width:100%;"></div>
<script type="text/javascript">
window.PLOTLYENV = window.PLOTLYENV || {{}};
Plotly.newPlot("{id}", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#,
        plotlyjs = plotlyjs,
        id = HTML_DIV_ID,
        data = data,
        layout = layout,
    ))
}

fn layout_size(document: &Value, key: &str, default: usize) -> usize {
    document["layout"][key]
        .as_u64()
        .map_or(default, |v| v as usize)
}

fn export_image(
    backend: &dyn ImageBackend,
    document: &Value,
    format: ExportFormat,
    path: &Path,
    options: &SaveOptions,
) -> std::result::Result<(), String> {
    let width = layout_size(document, "width", DEFAULT_WIDTH);
    let height = layout_size(document, "height", DEFAULT_HEIGHT);
    let export = || backend.export(document, format, width, height, options.scale, path);

    match export() {
        Ok(()) => Ok(()),
        Err(ImageExportError::BrowserMissing(reason)) => {
            warn!(
                "Image export could not start a browser ({}). Attempting to install {}",
                reason, DRIVER_PACKAGE
            );
            backend.install_browser().map_err(|e| {
                format!(
                    "{}. Automatic browser installation failed ({}). Install chromedriver manually \
                     and set WEBDRIVER_PATH, or save as .html or .json instead",
                    reason, e
                )
            })?;
            export().map_err(|e| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}
