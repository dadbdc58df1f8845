/*!
# vuecore - validated plotting for multi-omics data

vuecore turns a tabular dataset and a set of keyword parameters into a
Plotly figure. Parameters are validated against a schema per plot type
before anything is drawn; the figure is then produced by an engine looked
up in a registry and can optionally be written to disk.

## Example

```rust,ignore
use polars::prelude::*;
use serde_json::json;
use vuecore::{create_scatter_plot, Engine};

let data = df! {
    "a" => &[1.0, 2.0, 3.0],
    "b" => &[2.0, 4.0, 1.0],
    "g" => &["x", "y", "x"],
}?;

let figure = create_scatter_plot(
    &data,
    Engine::Plotly,
    Some("out.html".as_ref()),
    json!({"x": "a", "y": "b", "color": "g", "title": "Expression"}),
)?;
```

## Architecture

- **Schema** ([`plot::schema`]) - one configuration record per plot type,
  built from a parameter map with defaults, field checks and cross-field rules.
  Unknown parameters are kept and forwarded to the engine.
- **Registry** ([`engines`]) - `(plot type, engine) -> builder` and
  `engine -> saver` lookup tables.
- **Engines** ([`engines::plotly`]) - builders that translate a validated
  configuration into a figure, and a saver that exports it by file extension.
- **Entry points** ([`plots`]) - `create_<type>_plot` functions tying the
  three together.
*/

pub mod engines;
pub mod figure;
pub mod naming;
pub mod plot;
pub mod plots;
pub mod stats;

// Re-export key types for convenience
pub use engines::{get_builder, get_saver, register_builder, register_saver, Registry};
pub use figure::Figure;
pub use plot::schema::{BarConfig, BoxConfig, LineConfig, PlotConfig, ScatterConfig};
pub use plot::{Engine, Params, PlotType};
pub use plots::{
    create_bar_plot, create_box_plot, create_line_plot, create_plot, create_scatter_plot,
    plot_with_config,
};

// DataFrame abstraction (wraps Polars)
pub use polars::prelude::DataFrame;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum VueError {
    #[error("Validation error: missing required field '{field}' for {plot_type} plot")]
    MissingField { plot_type: PlotType, field: String },

    #[error("Validation error: invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Validation error: {message} (fields: {})", fields.join(", "))]
    ConflictingFields {
        fields: Vec<String>,
        message: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("No '{plot_type}' builder found for engine '{engine}'")]
    BuilderNotFound { plot_type: PlotType, engine: Engine },

    #[error("No saver found for engine '{engine}'")]
    SaverNotFound { engine: Engine },

    #[error("Unsupported file format: '{extension}'. Supported formats: .png, .jpg, .jpeg, .webp, .svg, .pdf, .html, .json")]
    UnsupportedFormat { extension: String },

    #[error("[vuecore] Failed to save plot '{}': {message}", path.display())]
    Export {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, VueError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
