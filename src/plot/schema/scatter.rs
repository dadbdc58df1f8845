//! Scatter plot configuration

use super::{check_log_range, collect_bindings, default_height, default_opacity, default_width, FieldKind, FieldSpec, Schema};
use crate::plot::types::{AxisRange, Params, Template, TrendlineKind};
use crate::plot::PlotType;
use crate::{Result, VueError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Validated configuration of a scatter plot.
///
/// Column bindings and styling follow plotly-express `scatter`. Keys the
/// schema does not know end up in `extra` and are forwarded to the figure:
///
/// * layout attributes (`bargap`, `bargroupgap`, `barnorm`, `boxgap`,
///   `boxgroupgap`, `dragmode`, `font`, `margin`, `paper_bgcolor`,
///   `plot_bgcolor`, `separators`) are merged into the layout;
/// * plotly-express arguments with no figure attribute (`render_mode`,
///   `animation_frame`, `marginal_x`, `color_continuous_scale` and the other
///   sequence and facet-spacing options) are dropped with a warning;
/// * anything else is merged into every trace as a trace attribute, so
///   `{"cliponaxis": false}` or `{"marker": {"opacity": 0.5}}` land on each
///   trace as given.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScatterConfig {
    // Data mapping
    pub x: String,
    pub y: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
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
    pub symbol_map: HashMap<String, String>,
    #[serde(default)]
    pub category_orders: HashMap<String, Vec<Value>>,

    // Styling and layout
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_size_max")]
    pub size_max: u32,
    #[serde(default)]
    pub trendline: Option<TrendlineKind>,
    #[serde(default)]
    pub trendline_options: Option<Params>,
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
    #[serde(default = "default_marker_line_width")]
    pub marker_line_width: f64,
    #[serde(default = "default_marker_line_color")]
    pub marker_line_color: String,

    // Special features
    #[serde(default)]
    pub color_by_density: bool,

    #[serde(flatten)]
    pub extra: Params,
}

fn default_title() -> String {
    "Scatter Plot".to_string()
}

fn default_size_max() -> u32 {
    20
}

fn default_marker_line_width() -> f64 {
    0.5
}

fn default_marker_line_color() -> String {
    "DarkSlateGrey".to_string()
}

impl ScatterConfig {
    /// Column bindings in the order the parameters are declared
    pub fn bound_columns(&self) -> Vec<(&'static str, &str)> {
        collect_bindings(
            &[
                ("x", Some(self.x.as_str())),
                ("y", Some(self.y.as_str())),
                ("color", self.color.as_deref()),
                ("symbol", self.symbol.as_deref()),
                ("size", self.size.as_deref()),
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

    fn check_trendline_options(&self) -> Result<()> {
        let Some(options) = &self.trendline_options else {
            return Ok(());
        };
        let Some(kind) = self.trendline else {
            return Err(VueError::ConflictingFields {
                fields: vec!["trendline_options".to_string(), "trendline".to_string()],
                message: "'trendline_options' requires 'trendline' to be set".to_string(),
            });
        };
        let invalid = |message: String| VueError::InvalidField {
            field: "trendline_options".to_string(),
            message,
        };

        match kind {
            TrendlineKind::Rolling => {
                let window = options.get("window").and_then(Value::as_u64);
                if !matches!(window, Some(w) if w > 0) {
                    return Err(invalid(
                        "the 'rolling' trendline requires a positive integer 'window'".to_string(),
                    ));
                }
            }
            TrendlineKind::Ewm => {
                let given: Vec<&str> = ["alpha", "span", "halflife", "com"]
                    .into_iter()
                    .filter(|key| options.get(*key).is_some_and(|v| !v.is_null()))
                    .collect();
                if given.len() != 1 {
                    return Err(invalid(format!(
                        "the 'ewm' trendline requires exactly one of alpha, span, halflife, com (got {})",
                        if given.is_empty() { "none".to_string() } else { given.join(", ") }
                    )));
                }
                let key = given[0];
                let valid = match options.get(key).and_then(Value::as_f64) {
                    Some(alpha) if key == "alpha" => alpha > 0.0 && alpha <= 1.0,
                    Some(span) if key == "span" => span >= 1.0,
                    Some(halflife) if key == "halflife" => halflife > 0.0,
                    Some(com) => com >= 0.0,
                    None => false,
                };
                if !valid {
                    return Err(invalid(format!("'{}' is out of range for the 'ewm' trendline", key)));
                }
            }
            TrendlineKind::Lowess => {
                if let Some(frac) = options.get("frac") {
                    if !matches!(frac.as_f64(), Some(f) if f > 0.0 && f <= 1.0) {
                        return Err(invalid(format!(
                            "'frac' must be in (0, 1] for the 'lowess' trendline, got {}",
                            frac
                        )));
                    }
                }
            }
            TrendlineKind::Ols | TrendlineKind::Expanding => {}
        }
        Ok(())
    }
}

impl Schema for ScatterConfig {
    const PLOT_TYPE: PlotType = PlotType::Scatter;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("x", FieldKind::Column),
        FieldSpec::required("y", FieldKind::Column),
        FieldSpec::optional("symbol", FieldKind::Column),
        FieldSpec::optional("size", FieldKind::Column),
        FieldSpec::optional("text", FieldKind::Column),
        FieldSpec::optional("error_x", FieldKind::Column),
        FieldSpec::optional("error_y", FieldKind::Column),
        FieldSpec::optional("symbol_map", FieldKind::TextMap),
        FieldSpec::optional("opacity", FieldKind::Float { min: Some(0.0), max: Some(1.0) }),
        FieldSpec::optional("size_max", FieldKind::PositiveInt),
        FieldSpec::optional("trendline", FieldKind::Choice(TrendlineKind::VARIANTS)),
        FieldSpec::optional("trendline_options", FieldKind::Object),
        FieldSpec::optional("marker_line_width", FieldKind::Float { min: Some(0.0), max: None }),
        FieldSpec::optional("marker_line_color", FieldKind::Text),
        FieldSpec::optional("color_by_density", FieldKind::Flag),
    ];

    fn check_invariants(&self) -> Result<()> {
        if self.color_by_density && self.color.is_some() {
            return Err(VueError::ConflictingFields {
                fields: vec!["color".to_string(), "color_by_density".to_string()],
                message: "Cannot use both 'color' and 'color_by_density'. These options are mutually exclusive."
                    .to_string(),
            });
        }
        check_log_range('x', self.log_x, self.range_x)?;
        check_log_range('y', self.log_y, self.range_y)?;
        self.check_trendline_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Result<ScatterConfig> {
        ScatterConfig::from_params(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_defaults() {
        let c = config(json!({"x": "a", "y": "b"})).unwrap();
        assert_eq!(c.title, "Scatter Plot");
        assert_eq!(c.template, Template::PlotlyWhite);
        assert_eq!((c.width, c.height), (800, 600));
        assert_eq!(c.opacity, 0.8);
        assert_eq!(c.size_max, 20);
        assert_eq!(c.marker_line_width, 0.5);
        assert_eq!(c.marker_line_color, "DarkSlateGrey");
        assert!(!c.color_by_density);
        assert!(c.hover_data.is_empty());
        assert!(c.extra.is_empty());
    }

    #[test]
    fn test_missing_y_names_the_field() {
        let err = config(json!({"x": "a"})).unwrap_err();
        assert!(matches!(&err, VueError::MissingField { field, .. } if field == "y"));
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn test_color_and_density_conflict() {
        let err = config(json!({"x": "a", "y": "b", "color": "g", "color_by_density": true}))
            .unwrap_err();
        match err {
            VueError::ConflictingFields { fields, message } => {
                assert_eq!(fields, vec!["color", "color_by_density"]);
                assert!(message.contains("mutually exclusive"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_density_without_color_is_fine() {
        let c = config(json!({"x": "a", "y": "b", "color_by_density": true})).unwrap();
        assert!(c.color_by_density);
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let c = config(json!({"x": "a", "y": "b", "render_mode": "webgl", "color": null})).unwrap();
        assert_eq!(c.extra.get("render_mode"), Some(&json!("webgl")));
        assert_eq!(c.color, None);
        assert!(!c.extra.contains_key("color"));
    }

    #[test]
    fn test_opacity_bounds() {
        assert!(config(json!({"x": "a", "y": "b", "opacity": 0})).is_ok());
        let err = config(json!({"x": "a", "y": "b", "opacity": -0.1})).unwrap_err();
        assert!(err.to_string().contains("'opacity'"));
    }

    #[test]
    fn test_trendline_options() {
        assert!(config(json!({"x": "a", "y": "b", "trendline": "ols"})).is_ok());
        assert!(config(json!({
            "x": "a", "y": "b", "trendline": "rolling", "trendline_options": {"window": 5}
        }))
        .is_ok());

        let orphan = config(json!({"x": "a", "y": "b", "trendline_options": {"frac": 0.5}}));
        assert!(matches!(orphan, Err(VueError::ConflictingFields { .. })));

        let no_window = config(json!({
            "x": "a", "y": "b", "trendline": "rolling", "trendline_options": {}
        }));
        assert!(no_window.unwrap_err().to_string().contains("window"));

        let two_decays = config(json!({
            "x": "a", "y": "b", "trendline": "ewm", "trendline_options": {"alpha": 0.5, "span": 3}
        }));
        assert!(two_decays.unwrap_err().to_string().contains("exactly one"));

        let bad_frac = config(json!({
            "x": "a", "y": "b", "trendline": "lowess", "trendline_options": {"frac": 1.5}
        }));
        assert!(bad_frac.is_err());
    }

    #[test]
    fn test_unknown_trendline() {
        let err = config(json!({"x": "a", "y": "b", "trendline": "spline"})).unwrap_err();
        assert!(err.to_string().contains("'trendline'"));
    }

    #[test]
    fn test_bound_columns_include_hover_data() {
        let c = config(json!({
            "x": "a", "y": "b", "color": "g", "hover_data": ["gene", "p"]
        }))
        .unwrap();
        assert_eq!(
            c.bound_columns(),
            vec![("x", "a"), ("y", "b"), ("color", "g"), ("hover_data", "gene"), ("hover_data", "p")]
        );
    }
}
