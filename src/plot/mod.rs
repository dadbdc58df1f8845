//! Plot types and configuration schemas
//!
//! This module contains the identifiers used to key the engine registry
//! (`PlotType`, `Engine`), the shared value types used by the configuration
//! records, and the schemas themselves.
//!
//! # Architecture
//!
//! - `types` - parameter map alias and the small enums shared by schemas
//! - `schema` - one configuration record per plot type plus `PlotConfig`

pub mod schema;
pub mod types;

pub use schema::*;
pub use types::*;

use crate::{Result, VueError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of plot a configuration describes and a builder produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotType {
    Scatter,
    Line,
    Bar,
    Box,
}

impl PlotType {
    /// All plot types, in registration order
    pub const ALL: [PlotType; 4] = [PlotType::Scatter, PlotType::Line, PlotType::Bar, PlotType::Box];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlotType::Scatter => "scatter",
            PlotType::Line => "line",
            PlotType::Bar => "bar",
            PlotType::Box => "box",
        }
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlotType {
    type Err = VueError;

    fn from_str(s: &str) -> Result<Self> {
        PlotType::ALL
            .into_iter()
            .find(|plot_type| plot_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                VueError::ValidationError(format!(
                    "Unknown plot type '{}'. Expected one of: scatter, line, bar, box",
                    s
                ))
            })
    }
}

/// Rendering backend a figure is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Plotly,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Plotly => "plotly",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Engine {
    type Err = VueError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plotly" => Ok(Engine::Plotly),
            other => Err(VueError::ValidationError(format!(
                "Unknown engine '{}'. Expected one of: plotly",
                other
            ))),
        }
    }
}
