//! Box plot configuration

use super::{check_log_range, collect_bindings, default_height, default_width, FieldKind, FieldSpec, Schema};
use crate::plot::types::{AxisRange, BoxMode, BoxPoints, Orientation, Params, Template};
use crate::plot::PlotType;
use crate::{Result, VueError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Validated configuration of a box plot, aligned with plotly-express `box`.
///
/// Either axis may be left unbound: a box plot of `y` alone draws a single
/// box per trace, a box plot with both draws one box per `x` category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoxConfig {
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub hover_name: Option<String>,
    #[serde(default)]
    pub hover_data: Vec<String>,
    #[serde(default)]
    pub facet_row: Option<String>,
    #[serde(default)]
    pub facet_col: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub color_discrete_map: HashMap<String, String>,
    #[serde(default)]
    pub category_orders: HashMap<String, Vec<Value>>,

    /// Left to plotly when unset
    #[serde(default)]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub boxmode: BoxMode,
    #[serde(default)]
    pub log_x: bool,
    #[serde(default)]
    pub log_y: bool,
    #[serde(default)]
    pub range_x: Option<AxisRange>,
    #[serde(default)]
    pub range_y: Option<AxisRange>,
    #[serde(default)]
    pub notched: bool,
    #[serde(default)]
    pub points: BoxPoints,
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
    "Box Plot".to_string()
}

impl BoxConfig {
    pub fn bound_columns(&self) -> Vec<(&'static str, &str)> {
        collect_bindings(
            &[
                ("x", self.x.as_deref()),
                ("y", self.y.as_deref()),
                ("color", self.color.as_deref()),
                ("hover_name", self.hover_name.as_deref()),
                ("facet_row", self.facet_row.as_deref()),
                ("facet_col", self.facet_col.as_deref()),
            ],
            &self.hover_data,
        )
    }
}

impl Schema for BoxConfig {
    const PLOT_TYPE: PlotType = PlotType::Box;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("x", FieldKind::Column),
        FieldSpec::optional("y", FieldKind::Column),
        FieldSpec::optional("orientation", FieldKind::Choice(Orientation::VARIANTS)),
        FieldSpec::optional("boxmode", FieldKind::Choice(BoxMode::VARIANTS)),
        FieldSpec::optional("notched", FieldKind::Flag),
        FieldSpec::optional("points", FieldKind::ChoiceOrFalse(BoxPoints::VARIANTS)),
    ];

    fn check_invariants(&self) -> Result<()> {
        if self.x.is_none() && self.y.is_none() {
            return Err(VueError::MissingField {
                plot_type: PlotType::Box,
                field: "x or y".to_string(),
            });
        }
        check_log_range('x', self.log_x, self.range_x)?;
        check_log_range('y', self.log_y, self.range_y)
    }
}
