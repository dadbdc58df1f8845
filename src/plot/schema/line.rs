//! Line plot configuration

use super::{check_log_range, collect_bindings, default_height, default_width, FieldKind, FieldSpec, Schema};
use crate::plot::types::{AxisRange, LineShape, Params, Template};
use crate::plot::PlotType;
use crate::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Validated configuration of a line plot, aligned with plotly-express `line`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineConfig {
    pub x: String,
    pub y: String,
    /// Splits lines without giving them a distinct style
    #[serde(default)]
    pub line_group: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub line_dash: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
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
    pub line_dash_map: HashMap<String, String>,
    #[serde(default)]
    pub symbol_map: HashMap<String, String>,
    #[serde(default)]
    pub category_orders: HashMap<String, Vec<Value>>,

    #[serde(default)]
    pub markers: bool,
    #[serde(default)]
    pub log_x: bool,
    #[serde(default)]
    pub log_y: bool,
    #[serde(default)]
    pub range_x: Option<AxisRange>,
    #[serde(default)]
    pub range_y: Option<AxisRange>,
    #[serde(default)]
    pub line_shape: LineShape,
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
    "Line Plot".to_string()
}

impl LineConfig {
    pub fn bound_columns(&self) -> Vec<(&'static str, &str)> {
        collect_bindings(
            &[
                ("x", Some(self.x.as_str())),
                ("y", Some(self.y.as_str())),
                ("line_group", self.line_group.as_deref()),
                ("color", self.color.as_deref()),
                ("line_dash", self.line_dash.as_deref()),
                ("symbol", self.symbol.as_deref()),
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

impl Schema for LineConfig {
    const PLOT_TYPE: PlotType = PlotType::Line;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("x", FieldKind::Column),
        FieldSpec::required("y", FieldKind::Column),
        FieldSpec::optional("line_group", FieldKind::Column),
        FieldSpec::optional("line_dash", FieldKind::Column),
        FieldSpec::optional("symbol", FieldKind::Column),
        FieldSpec::optional("text", FieldKind::Column),
        FieldSpec::optional("error_x", FieldKind::Column),
        FieldSpec::optional("error_y", FieldKind::Column),
        FieldSpec::optional("line_dash_map", FieldKind::TextMap),
        FieldSpec::optional("symbol_map", FieldKind::TextMap),
        FieldSpec::optional("markers", FieldKind::Flag),
        FieldSpec::optional("line_shape", FieldKind::Choice(LineShape::VARIANTS)),
    ];

    fn check_invariants(&self) -> Result<()> {
        check_log_range('x', self.log_x, self.range_x)?;
        check_log_range('y', self.log_y, self.range_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VueError;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let params = json!({"x": "day", "y": "value"}).as_object().cloned().unwrap();
        let c = LineConfig::from_params(params).unwrap();
        assert_eq!(c.title, "Line Plot");
        assert_eq!(c.line_shape, LineShape::Linear);
        assert!(!c.markers);
        assert_eq!(c.range_x, None);
    }

    #[test]
    fn test_missing_x() {
        let params = json!({"y": "value"}).as_object().cloned().unwrap();
        let err = LineConfig::from_params(params).unwrap_err();
        assert!(matches!(err, VueError::MissingField { ref field, plot_type: PlotType::Line } if field == "x"));
    }

    #[test]
    fn test_line_shape_and_ranges() {
        let params = json!({
            "x": "day", "y": "value", "line_shape": "spline", "range_y": [0, 25], "markers": true
        })
        .as_object()
        .cloned()
        .unwrap();
        let c = LineConfig::from_params(params).unwrap();
        assert_eq!(c.line_shape, LineShape::Spline);
        assert_eq!(c.range_y, Some([0.0, 25.0]));
        assert!(c.markers);

        let params = json!({"x": "day", "y": "value", "line_shape": "curvy"})
            .as_object()
            .cloned()
            .unwrap();
        assert!(matches!(
            LineConfig::from_params(params),
            Err(VueError::InvalidField { .. })
        ));
    }
}
