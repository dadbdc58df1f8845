//! Value types shared by the plot configuration schemas
//!
//! The parameter map models the keyword arguments a caller passes to a plot
//! entry point. The enums below model the closed vocabularies a few of those
//! parameters accept; each exposes `VARIANTS` (the accepted spellings, used by
//! field validation) and `as_str` (the value Plotly expects).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Keyword parameters for a plot call: parameter name -> JSON value
pub type Params = serde_json::Map<String, Value>;

/// Explicit axis range `[min, max]` in data units
pub type AxisRange = [f64; 2];

/// Bar/box orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    #[serde(rename = "v")]
    Vertical,
    #[serde(rename = "h")]
    Horizontal,
}

impl Orientation {
    pub const VARIANTS: &'static [&'static str] = &["v", "h"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Vertical => "v",
            Orientation::Horizontal => "h",
        }
    }
}

/// How bars sharing a location are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Group,
    Overlay,
    #[default]
    Relative,
    Stack,
}

impl BarMode {
    pub const VARIANTS: &'static [&'static str] = &["group", "overlay", "relative", "stack"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BarMode::Group => "group",
            BarMode::Overlay => "overlay",
            BarMode::Relative => "relative",
            BarMode::Stack => "stack",
        }
    }
}

/// How boxes sharing a location are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxMode {
    #[default]
    Group,
    Overlay,
}

impl BoxMode {
    pub const VARIANTS: &'static [&'static str] = &["group", "overlay"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoxMode::Group => "group",
            BoxMode::Overlay => "overlay",
        }
    }
}

/// Which sample points a box plot draws next to the boxes
///
/// Plotly spells "no points" as the boolean `false`, every other mode as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxPoints {
    #[default]
    Outliers,
    SuspectedOutliers,
    All,
    Hidden,
}

impl BoxPoints {
    pub const VARIANTS: &'static [&'static str] = &["outliers", "suspectedoutliers", "all"];

    pub fn to_value(&self) -> Value {
        match self {
            BoxPoints::Outliers => Value::from("outliers"),
            BoxPoints::SuspectedOutliers => Value::from("suspectedoutliers"),
            BoxPoints::All => Value::from("all"),
            BoxPoints::Hidden => Value::Bool(false),
        }
    }
}

impl Serialize for BoxPoints {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BoxPoints {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(false) => Ok(BoxPoints::Hidden),
            Value::String(s) => match s.as_str() {
                "outliers" => Ok(BoxPoints::Outliers),
                "suspectedoutliers" => Ok(BoxPoints::SuspectedOutliers),
                "all" => Ok(BoxPoints::All),
                other => Err(serde::de::Error::custom(format!(
                    "unknown points mode '{}'",
                    other
                ))),
            },
            other => Err(serde::de::Error::custom(format!(
                "expected a points mode or false, got {}",
                other
            ))),
        }
    }
}

/// Interpolation between line points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineShape {
    #[default]
    Linear,
    Spline,
    Hv,
    Vh,
    Hvh,
    Vhv,
}

impl LineShape {
    pub const VARIANTS: &'static [&'static str] = &["linear", "spline", "hv", "vh", "hvh", "vhv"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineShape::Linear => "linear",
            LineShape::Spline => "spline",
            LineShape::Hv => "hv",
            LineShape::Vh => "vh",
            LineShape::Hvh => "hvh",
            LineShape::Vhv => "vhv",
        }
    }
}

/// Trendline fitted through each scatter group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendlineKind {
    /// Ordinary least squares
    Ols,
    /// Locally weighted scatterplot smoothing
    Lowess,
    /// Moving mean over a fixed window
    Rolling,
    /// Cumulative mean
    Expanding,
    /// Exponentially weighted mean
    Ewm,
}

impl TrendlineKind {
    pub const VARIANTS: &'static [&'static str] = &["ols", "lowess", "rolling", "expanding", "ewm"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendlineKind::Ols => "ols",
            TrendlineKind::Lowess => "lowess",
            TrendlineKind::Rolling => "rolling",
            TrendlineKind::Expanding => "expanding",
            TrendlineKind::Ewm => "ewm",
        }
    }
}

/// Named visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    Plotly,
    #[default]
    PlotlyWhite,
    PlotlyDark,
    SimpleWhite,
    None,
}

impl Template {
    pub const VARIANTS: &'static [&'static str] =
        &["plotly", "plotly_white", "plotly_dark", "simple_white", "none"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Plotly => "plotly",
            Template::PlotlyWhite => "plotly_white",
            Template::PlotlyDark => "plotly_dark",
            Template::SimpleWhite => "simple_white",
            Template::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_box_points_accepts_false() {
        let points: BoxPoints = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(points, BoxPoints::Hidden);
        assert_eq!(points.to_value(), json!(false));

        let points: BoxPoints = serde_json::from_value(json!("suspectedoutliers")).unwrap();
        assert_eq!(points, BoxPoints::SuspectedOutliers);
        assert!(serde_json::from_value::<BoxPoints>(json!(true)).is_err());
    }

    #[test]
    fn test_variant_lists_match_serde_names() {
        for name in Template::VARIANTS {
            let template: Template = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(template.as_str(), *name);
        }
        for name in BarMode::VARIANTS {
            let mode: BarMode = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(mode.as_str(), *name);
        }
        for name in LineShape::VARIANTS {
            let shape: LineShape = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(shape.as_str(), *name);
        }
        for name in TrendlineKind::VARIANTS {
            let kind: TrendlineKind = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(kind.as_str(), *name);
        }
        for name in Orientation::VARIANTS {
            let orientation: Orientation = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(orientation.as_str(), *name);
        }
    }
}
