//! Configuration schemas for each plot type
//!
//! A schema turns a loose parameter map into a typed configuration record in
//! three steps:
//!
//! 1. **Field checks** against a static table of `FieldSpec`s: required
//!    fields must be present, known fields must have the right shape and stay
//!    within their bounds. Every failure names the offending field.
//! 2. **Defaulting** through serde: absent fields take their default, unknown
//!    fields are collected into `extra` and later forwarded to the engine.
//! 3. **Invariants** across fields (e.g. `color` vs `color_by_density`).
//!
//! # Example
//!
//! ```rust,ignore
//! use vuecore::plot::{PlotConfig, PlotType};
//! use serde_json::json;
//!
//! let config = PlotConfig::from_params(PlotType::Line, json!({"x": "day", "y": "value"}))?;
//! assert_eq!(config.plot_type(), PlotType::Line);
//! ```

use super::types::{AxisRange, Params, Template};
use super::PlotType;
use crate::{Result, VueError};
use serde::de::DeserializeOwned;
use serde_json::Value;

mod bar;
mod boxplot;
mod line;
mod scatter;

pub use bar::BarConfig;
pub use boxplot::BoxConfig;
pub use line::LineConfig;
pub use scatter::ScatterConfig;

// =============================================================================
// Field table
// =============================================================================

/// Shape a parameter value must have
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Name of a data column
    Column,
    /// List of data column names
    Columns,
    /// Free text
    Text,
    /// Boolean switch
    Flag,
    /// Strictly positive integer
    PositiveInt,
    /// Number within optional inclusive bounds
    Float { min: Option<f64>, max: Option<f64> },
    /// `[min, max]` pair of numbers
    Range,
    /// Object with string values
    TextMap,
    /// Object with list values
    ListMap,
    /// Any object
    Object,
    /// One of a fixed set of strings
    Choice(&'static [&'static str]),
    /// One of a fixed set of strings, or `false`
    ChoiceOrFalse(&'static [&'static str]),
}

/// Declaration of a single configuration field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Check a single value against the shape its field declares
fn check_kind(name: &str, kind: FieldKind, value: &Value) -> Result<()> {
    let invalid = |message: String| VueError::InvalidField {
        field: name.to_string(),
        message,
    };

    match kind {
        FieldKind::Column | FieldKind::Text => {
            if !value.is_string() {
                return Err(invalid(format!("expected a string, got {}", value)));
            }
        }
        FieldKind::Columns => {
            let all_strings = value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false);
            if !all_strings {
                return Err(invalid(format!(
                    "expected a list of column names, got {}",
                    value
                )));
            }
        }
        FieldKind::Flag => {
            if !value.is_boolean() {
                return Err(invalid(format!("expected true or false, got {}", value)));
            }
        }
        FieldKind::PositiveInt => {
            let as_int = value.as_u64().or_else(|| {
                value
                    .as_f64()
                    .filter(|v| v.fract() == 0.0 && *v >= 0.0)
                    .map(|v| v as u64)
            });
            match as_int {
                Some(v) if v > u64::from(u32::MAX) => {
                    return Err(invalid(format!(
                        "must be less than or equal to {}, got {}",
                        u32::MAX,
                        v
                    )))
                }
                Some(v) if v > 0 => {}
                _ => return Err(invalid(format!("expected a positive integer, got {}", value))),
            }
        }
        FieldKind::Float { min, max } => {
            let v = value
                .as_f64()
                .ok_or_else(|| invalid(format!("expected a number, got {}", value)))?;
            if let Some(min) = min {
                if v < min {
                    return Err(invalid(format!("must be greater than or equal to {}, got {}", min, v)));
                }
            }
            if let Some(max) = max {
                if v > max {
                    return Err(invalid(format!("must be less than or equal to {}, got {}", max, v)));
                }
            }
        }
        FieldKind::Range => {
            let pair = value
                .as_array()
                .filter(|items| items.len() == 2 && items.iter().all(Value::is_number));
            if pair.is_none() {
                return Err(invalid(format!(
                    "expected a [min, max] pair of numbers, got {}",
                    value
                )));
            }
        }
        FieldKind::TextMap => {
            let all_strings = value
                .as_object()
                .map(|map| map.values().all(Value::is_string))
                .unwrap_or(false);
            if !all_strings {
                return Err(invalid(format!(
                    "expected an object with string values, got {}",
                    value
                )));
            }
        }
        FieldKind::ListMap => {
            let all_lists = value
                .as_object()
                .map(|map| {
                    map.values().all(|v| {
                        v.as_array()
                            .map(|items| items.iter().all(|i| i.is_string() || i.is_number()))
                            .unwrap_or(false)
                    })
                })
                .unwrap_or(false);
            if !all_lists {
                return Err(invalid(format!(
                    "expected an object mapping columns to lists of values, got {}",
                    value
                )));
            }
        }
        FieldKind::Object => {
            if !value.is_object() {
                return Err(invalid(format!("expected an object, got {}", value)));
            }
        }
        FieldKind::Choice(choices) | FieldKind::ChoiceOrFalse(choices) => {
            if matches!(kind, FieldKind::ChoiceOrFalse(_)) && value == &Value::Bool(false) {
                return Ok(());
            }
            let accepted = value
                .as_str()
                .map(|s| choices.contains(&s))
                .unwrap_or(false);
            if !accepted {
                return Err(invalid(format!(
                    "expected one of {}, got {}",
                    choices.join(", "),
                    value
                )));
            }
        }
    }
    Ok(())
}

/// Run the field table over a parameter map.
///
/// Null values of optional fields are dropped so they fall back to their
/// defaults. Keys absent from the table are left untouched.
pub fn validate_fields(plot_type: PlotType, fields: &[FieldSpec], params: &mut Params) -> Result<()> {
    for spec in fields {
        let is_null = matches!(params.get(spec.name), Some(Value::Null));
        if is_null || !params.contains_key(spec.name) {
            if spec.required {
                return Err(VueError::MissingField {
                    plot_type,
                    field: spec.name.to_string(),
                });
            }
            params.remove(spec.name);
            continue;
        }
        if let Some(value) = params.get_mut(spec.name) {
            check_kind(spec.name, spec.kind, value)?;
            // 900.0 passes as a positive integer but must reach serde as 900
            if spec.kind == FieldKind::PositiveInt && !value.is_u64() {
                if let Some(v) = value.as_f64() {
                    *value = Value::from(v as u64);
                }
            }
        }
    }
    Ok(())
}

/// Fields shared by every plot type (the x/y bindings are declared per schema)
pub const COMMON_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("color", FieldKind::Column),
    FieldSpec::optional("hover_name", FieldKind::Column),
    FieldSpec::optional("hover_data", FieldKind::Columns),
    FieldSpec::optional("facet_row", FieldKind::Column),
    FieldSpec::optional("facet_col", FieldKind::Column),
    FieldSpec::optional("labels", FieldKind::TextMap),
    FieldSpec::optional("color_discrete_map", FieldKind::TextMap),
    FieldSpec::optional("category_orders", FieldKind::ListMap),
    FieldSpec::optional("log_x", FieldKind::Flag),
    FieldSpec::optional("log_y", FieldKind::Flag),
    FieldSpec::optional("range_x", FieldKind::Range),
    FieldSpec::optional("range_y", FieldKind::Range),
    FieldSpec::optional("title", FieldKind::Text),
    FieldSpec::optional("subtitle", FieldKind::Text),
    FieldSpec::optional("x_title", FieldKind::Text),
    FieldSpec::optional("y_title", FieldKind::Text),
    FieldSpec::optional("template", FieldKind::Choice(Template::VARIANTS)),
    FieldSpec::optional("width", FieldKind::PositiveInt),
    FieldSpec::optional("height", FieldKind::PositiveInt),
];

// =============================================================================
// Schema trait
// =============================================================================

/// A typed configuration record for one plot type
pub trait Schema: DeserializeOwned {
    /// Plot type this schema configures
    const PLOT_TYPE: PlotType;

    /// Schema-specific field table, checked before `COMMON_FIELDS`
    const FIELDS: &'static [FieldSpec];

    /// Cross-field rules, checked after defaults are applied
    fn check_invariants(&self) -> Result<()> {
        Ok(())
    }

    /// Build and validate a configuration from keyword parameters
    fn from_params(mut params: Params) -> Result<Self> {
        validate_fields(Self::PLOT_TYPE, Self::FIELDS, &mut params)?;
        validate_fields(Self::PLOT_TYPE, COMMON_FIELDS, &mut params)?;
        let config: Self = serde_json::from_value(Value::Object(params)).map_err(|e| {
            VueError::ValidationError(format!("Invalid {} configuration: {}", Self::PLOT_TYPE, e))
        })?;
        config.check_invariants()?;
        Ok(config)
    }
}

/// Log axes take their range in data units, so both bounds must be positive
pub(crate) fn check_log_range(axis: char, log: bool, range: Option<AxisRange>) -> Result<()> {
    match range {
        Some(range) if log && range.iter().any(|bound| *bound <= 0.0) => {
            Err(VueError::ConflictingFields {
                fields: vec![format!("log_{}", axis), format!("range_{}", axis)],
                message: format!(
                    "'range_{}' bounds must be positive on a log axis, got [{}, {}]",
                    axis, range[0], range[1]
                ),
            })
        }
        _ => Ok(()),
    }
}

pub(crate) fn default_width() -> u32 {
    800
}

pub(crate) fn default_height() -> u32 {
    600
}

pub(crate) fn default_opacity() -> f64 {
    0.8
}

// =============================================================================
// PlotConfig
// =============================================================================

/// Validated configuration for any plot type
#[derive(Debug, Clone, PartialEq)]
pub enum PlotConfig {
    Scatter(ScatterConfig),
    Line(LineConfig),
    Bar(BarConfig),
    Box(BoxConfig),
}

impl PlotConfig {
    /// Validate keyword parameters against the schema of `plot_type`.
    ///
    /// `params` must be a JSON object; unknown keys are kept for pass-through.
    pub fn from_params(plot_type: PlotType, params: Value) -> Result<Self> {
        let params = match params {
            Value::Object(map) => map,
            Value::Null => Params::new(),
            other => {
                return Err(VueError::ValidationError(format!(
                    "Plot parameters must be an object of keyword arguments, got {}",
                    other
                )))
            }
        };

        Ok(match plot_type {
            PlotType::Scatter => PlotConfig::Scatter(ScatterConfig::from_params(params)?),
            PlotType::Line => PlotConfig::Line(LineConfig::from_params(params)?),
            PlotType::Bar => PlotConfig::Bar(BarConfig::from_params(params)?),
            PlotType::Box => PlotConfig::Box(BoxConfig::from_params(params)?),
        })
    }

    pub fn plot_type(&self) -> PlotType {
        match self {
            PlotConfig::Scatter(_) => PlotType::Scatter,
            PlotConfig::Line(_) => PlotType::Line,
            PlotConfig::Bar(_) => PlotType::Bar,
            PlotConfig::Box(_) => PlotType::Box,
        }
    }

    /// Every data column the configuration refers to, with the parameter naming it
    pub fn bound_columns(&self) -> Vec<(&'static str, &str)> {
        match self {
            PlotConfig::Scatter(c) => c.bound_columns(),
            PlotConfig::Line(c) => c.bound_columns(),
            PlotConfig::Bar(c) => c.bound_columns(),
            PlotConfig::Box(c) => c.bound_columns(),
        }
    }

    /// Parameters outside the schema, forwarded to the engine unvalidated
    pub fn extra(&self) -> &Params {
        match self {
            PlotConfig::Scatter(c) => &c.extra,
            PlotConfig::Line(c) => &c.extra,
            PlotConfig::Bar(c) => &c.extra,
            PlotConfig::Box(c) => &c.extra,
        }
    }
}

/// Collect `(parameter, column)` pairs for the set optional bindings
pub(crate) fn collect_bindings<'a>(
    bindings: &[(&'static str, Option<&'a str>)],
    hover_data: &'a [String],
) -> Vec<(&'static str, &'a str)> {
    let mut out: Vec<(&'static str, &'a str)> = bindings
        .iter()
        .filter_map(|(param, column)| column.map(|c| (*param, c)))
        .collect();
    out.extend(hover_data.iter().map(|c| ("hover_data", c.as_str())));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::required("x", FieldKind::Column),
        FieldSpec::optional("opacity", FieldKind::Float { min: Some(0.0), max: Some(1.0) }),
        FieldSpec::optional("width", FieldKind::PositiveInt),
        FieldSpec::optional("range_x", FieldKind::Range),
        FieldSpec::optional("mode", FieldKind::Choice(&["a", "b"])),
        FieldSpec::optional("points", FieldKind::ChoiceOrFalse(&["all"])),
    ];

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_field_missing() {
        let mut p = params(json!({"opacity": 0.5}));
        let err = validate_fields(PlotType::Scatter, FIELDS, &mut p).unwrap_err();
        match err {
            VueError::MissingField { field, plot_type } => {
                assert_eq!(field, "x");
                assert_eq!(plot_type, PlotType::Scatter);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_required_field_null_counts_as_missing() {
        let mut p = params(json!({"x": null}));
        assert!(matches!(
            validate_fields(PlotType::Line, FIELDS, &mut p),
            Err(VueError::MissingField { .. })
        ));
    }

    #[test]
    fn test_optional_null_is_dropped() {
        let mut p = params(json!({"x": "a", "opacity": null}));
        validate_fields(PlotType::Scatter, FIELDS, &mut p).unwrap();
        assert!(!p.contains_key("opacity"));
    }

    #[test]
    fn test_bounds_name_the_field() {
        let mut p = params(json!({"x": "a", "opacity": 1.5}));
        let err = validate_fields(PlotType::Scatter, FIELDS, &mut p).unwrap_err();
        assert!(err.to_string().contains("'opacity'"));
        assert!(err.to_string().contains("less than or equal to 1"));
    }

    #[test]
    fn test_shapes() {
        let ok = [
            json!({"x": "a", "width": 900}),
            json!({"x": "a", "width": 900.0}),
            json!({"x": "a", "range_x": [0, 10.5]}),
            json!({"x": "a", "mode": "b"}),
            json!({"x": "a", "points": false}),
            json!({"x": "a", "unknown": [1, 2, 3]}),
        ];
        for value in ok {
            let mut p = params(value.clone());
            assert!(validate_fields(PlotType::Bar, FIELDS, &mut p).is_ok(), "{value}");
        }

        let bad = [
            json!({"x": 1}),
            json!({"x": "a", "width": 0}),
            json!({"x": "a", "width": -3}),
            json!({"x": "a", "width": 5_000_000_000u64}),
            json!({"x": "a", "range_x": [0]}),
            json!({"x": "a", "mode": "c"}),
            json!({"x": "a", "points": true}),
        ];
        for value in bad {
            let mut p = params(value.clone());
            assert!(
                matches!(
                    validate_fields(PlotType::Bar, FIELDS, &mut p),
                    Err(VueError::InvalidField { .. })
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn test_oversized_integer_names_the_field() {
        let err = PlotConfig::from_params(
            PlotType::Scatter,
            json!({"x": "a", "y": "b", "width": 5_000_000_000u64}),
        )
        .unwrap_err();
        assert!(matches!(err, VueError::InvalidField { ref field, .. } if field == "width"));
        assert!(err.to_string().contains("'width'"));
    }

    #[test]
    fn test_log_axis_range_must_be_positive() {
        let err = PlotConfig::from_params(
            PlotType::Scatter,
            json!({"x": "a", "y": "b", "log_x": true, "range_x": [0, 100]}),
        )
        .unwrap_err();
        match err {
            VueError::ConflictingFields { fields, .. } => assert_eq!(fields, vec!["log_x", "range_x"]),
            other => panic!("unexpected error: {other}"),
        }

        for plot_type in [PlotType::Line, PlotType::Bar, PlotType::Box] {
            let result = PlotConfig::from_params(
                plot_type,
                json!({"x": "a", "y": "b", "log_y": true, "range_y": [-1, 10]}),
            );
            assert!(matches!(result, Err(VueError::ConflictingFields { .. })), "{plot_type}");
        }

        assert!(PlotConfig::from_params(
            PlotType::Scatter,
            json!({"x": "a", "y": "b", "log_x": true, "range_x": [1, 100], "range_y": [-5, 5]}),
        )
        .is_ok());
    }

    #[test]
    fn test_from_params_rejects_non_object() {
        let err = PlotConfig::from_params(PlotType::Scatter, json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn test_plot_config_dispatches_by_type() {
        let config =
            PlotConfig::from_params(PlotType::Bar, json!({"x": "a", "y": "b", "custom": 1}))
                .unwrap();
        assert_eq!(config.plot_type(), PlotType::Bar);
        assert_eq!(config.extra().get("custom"), Some(&json!(1)));
        assert_eq!(config.bound_columns(), vec![("x", "a"), ("y", "b")]);
    }
}
