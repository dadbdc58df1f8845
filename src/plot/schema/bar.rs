//! Bar plot configuration

use super::{check_log_range, collect_bindings, default_height, default_opacity, default_width, FieldKind, FieldSpec, Schema};
use crate::plot::types::{AxisRange, BarMode, Orientation, Params, Template};
use crate::plot::PlotType;
use crate::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Validated configuration of a bar plot, aligned with plotly-express `bar`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BarConfig {
    pub x: String,
    pub y: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub pattern_shape: Option<String>,
    #[serde(default)]
    pub hover_name: Option<String>,
    #[serde(default)]
    pub hover_data: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub facet_row: Option<String>,
    #[serde(default)]
    pub facet_col: Option<String>,
    #[serde(default)]
    pub error_x: Option<String>,
    #[serde(default)]
    pub error_y: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub color_discrete_map: HashMap<String, String>,
    #[serde(default)]
    pub pattern_shape_map: HashMap<String, String>,
    #[serde(default)]
    pub category_orders: HashMap<String, Vec<Value>>,

    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub barmode: BarMode,
    #[serde(default)]
    pub log_x: bool,
    #[serde(default)]
    pub log_y: bool,
    #[serde(default)]
    pub range_x: Option<AxisRange>,
    #[serde(default)]
    pub range_y: Option<AxisRange>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(default)]
    pub template: Template,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,

    /// Forwarded to the figure as described on [`super::ScatterConfig`]
    #[serde(flatten)]
    pub extra: Params,
}

fn default_title() -> String {
    "Bar Plot".to_string()
}

impl BarConfig {
    pub fn bound_columns(&self) -> Vec<(&'static str, &str)> {
        collect_bindings(
            &[
                ("x", Some(self.x.as_str())),
                ("y", Some(self.y.as_str())),
                ("color", self.color.as_deref()),
                ("pattern_shape", self.pattern_shape.as_deref()),
                ("hover_name", self.hover_name.as_deref()),
                ("text", self.text.as_deref()),
                ("facet_row", self.facet_row.as_deref()),
                ("facet_col", self.facet_col.as_deref()),
                ("error_x", self.error_x.as_deref()),
                ("error_y", self.error_y.as_deref()),
            ],
            &self.hover_data,
        )
    }
}

impl Schema for BarConfig {
    const PLOT_TYPE: PlotType = PlotType::Bar;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("x", FieldKind::Column),
        FieldSpec::required("y", FieldKind::Column),
        FieldSpec::optional("pattern_shape", FieldKind::Column),
        FieldSpec::optional("text", FieldKind::Column),
        FieldSpec::optional("error_x", FieldKind::Column),
        FieldSpec::optional("error_y", FieldKind::Column),
        FieldSpec::optional("pattern_shape_map", FieldKind::TextMap),
        FieldSpec::optional("opacity", FieldKind::Float { min: Some(0.0), max: Some(1.0) }),
        FieldSpec::optional("orientation", FieldKind::Choice(Orientation::VARIANTS)),
        FieldSpec::optional("barmode", FieldKind::Choice(BarMode::VARIANTS)),
    ];

    fn check_invariants(&self) -> Result<()> {
        check_log_range('x', self.log_x, self.range_x)?;
        check_log_range('y', self.log_y, self.range_y)
    }
}
