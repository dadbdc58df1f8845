//! Scatter plot builder
//!
//! On top of the express pass this adds the two scatter-only features:
//! density colouring, where each point is coloured by the kernel density of
//! the x/y cloud around it, and trendlines, fitted per group and drawn as a
//! line trace directly after the group's markers.

use super::data;
use super::express::{self, ExpressArgs, TraceKind};
use super::figure::PlotlyFigure;
use super::theming;
use crate::plot::{Params, ScatterConfig, TrendlineKind};
use crate::stats::{self, Decay};
use crate::{DataFrame, Result, VueError};
use serde_json::{json, Value};
use tracing::debug;

/// Label of the density colour bar
const DENSITY_LABEL: &str = "density";

pub fn build(data: &DataFrame, config: &ScatterConfig) -> Result<PlotlyFigure> {
    data::check_columns(data, &config.bound_columns())?;

    let continuous_color = if config.color_by_density {
        Some((DENSITY_LABEL.to_string(), density(data, config)?))
    } else {
        None
    };

    let args = ExpressArgs {
        kind: TraceKind::Scatter,
        x: Some(&config.x),
        y: Some(&config.y),
        color: config.color.as_deref(),
        symbol: config.symbol.as_deref(),
        size: config.size.as_deref(),
        text: config.text.as_deref(),
        hover_name: config.hover_name.as_deref(),
        hover_data: &config.hover_data,
        error_x: config.error_x.as_deref(),
        error_y: config.error_y.as_deref(),
        facet_row: config.facet_row.as_deref(),
        facet_col: config.facet_col.as_deref(),
        labels: Some(&config.labels),
        color_discrete_map: if config.color_by_density {
            None
        } else {
            Some(&config.color_discrete_map)
        },
        symbol_map: Some(&config.symbol_map),
        category_orders: Some(&config.category_orders),
        continuous_color,
        size_max: config.size_max,
        template: config.template,
        extra: Some(&config.extra),
        ..Default::default()
    };
    let express = express::build(data, &args)?;
    let mut fig = express.figure;

    if let Some(kind) = config.trendline {
        add_trendlines(&mut fig, &express.rows, data, config, &args, kind)?;
    }

    theming::apply_scatter_theme(&mut fig, config);

    debug!(
        traces = fig.traces().len(),
        density = config.color_by_density,
        "Built scatter figure"
    );
    Ok(fig)
}

/// Density at every row; rows missing x or y get no value
fn density(data: &DataFrame, config: &ScatterConfig) -> Result<Vec<Option<f64>>> {
    let xs = data::numeric_values(data, &config.x, "x")?;
    let ys = data::numeric_values(data, &config.y, "y")?;

    let rows: Vec<usize> = (0..xs.len())
        .filter(|&i| xs[i].is_some() && ys[i].is_some())
        .collect();
    let x: Vec<f64> = rows.iter().filter_map(|&i| xs[i]).collect();
    let y: Vec<f64> = rows.iter().filter_map(|&i| ys[i]).collect();
    let values = stats::point_density(&x, &y)?;

    let mut out = vec![None; xs.len()];
    for (row, value) in rows.into_iter().zip(values) {
        out[row] = Some(value);
    }
    Ok(out)
}

// =============================================================================
// Trendlines
// =============================================================================

fn add_trendlines(
    fig: &mut PlotlyFigure,
    trace_rows: &[Vec<usize>],
    data: &DataFrame,
    config: &ScatterConfig,
    args: &ExpressArgs<'_>,
    kind: TrendlineKind,
) -> Result<()> {
    let empty = Params::new();
    let options = config.trendline_options.as_ref().unwrap_or(&empty);
    let fit = TrendlineFit::from_options(kind, options)?;

    let xs = data::numeric_values(data, &config.x, "x")?;
    let ys = data::numeric_values(data, &config.y, "y")?;

    // Walk backwards so insertion does not shift the traces still to visit
    for (index, rows) in trace_rows.iter().enumerate().rev() {
        let mut points: Vec<(f64, f64)> = rows
            .iter()
            .filter_map(|&r| Some((xs[r]?, ys[r]?)))
            .collect();
        if points.is_empty() {
            continue;
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let x: Vec<f64> = points.iter().map(|p| p.0).collect();
        let y: Vec<f64> = points.iter().map(|p| p.1).collect();

        let Some(fitted) = fit.apply(&x, &y, config.log_x, config.log_y)? else {
            debug!(group = index, kind = kind.as_str(), "Skipped trendline for a degenerate group");
            continue;
        };
        let trace = trendline_trace(&fig.traces()[index], &x, fitted, fit.label(), args);
        fig.insert_trace(index + 1, trace);
    }

    debug!(kind = kind.as_str(), groups = trace_rows.len(), "Added trendlines");
    Ok(())
}

/// A trendline method with its options resolved
#[derive(Debug, Clone, Copy, PartialEq)]
enum TrendlineFit {
    Ols { add_constant: bool },
    Lowess { frac: f64 },
    Rolling { window: usize, min_periods: Option<usize> },
    Expanding,
    Ewm(Decay),
}

impl TrendlineFit {
    fn from_options(kind: TrendlineKind, options: &Params) -> Result<Self> {
        let invalid = |message: String| VueError::InvalidField {
            field: "trendline_options".to_string(),
            message,
        };

        if let Some(function) = options.get("function") {
            if function.as_str() != Some("mean") {
                return Err(invalid(format!(
                    "unsupported trendline function {}, only 'mean' is available",
                    function
                )));
            }
        }

        let float = |key: &str| options.get(key).and_then(Value::as_f64);
        let count = |key: &str| options.get(key).and_then(Value::as_u64).map(|v| v as usize);

        Ok(match kind {
            TrendlineKind::Ols => TrendlineFit::Ols {
                add_constant: options
                    .get("add_constant")
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            },
            TrendlineKind::Lowess => TrendlineFit::Lowess {
                frac: float("frac").unwrap_or(2.0 / 3.0),
            },
            TrendlineKind::Rolling => TrendlineFit::Rolling {
                window: count("window").filter(|w| *w > 0).ok_or_else(|| {
                    invalid("the 'rolling' trendline requires a positive integer 'window'".to_string())
                })?,
                min_periods: count("min_periods"),
            },
            TrendlineKind::Expanding => TrendlineFit::Expanding,
            TrendlineKind::Ewm => {
                let decay = if let Some(alpha) = float("alpha") {
                    Decay::Alpha(alpha)
                } else if let Some(span) = float("span") {
                    Decay::Span(span)
                } else if let Some(halflife) = float("halflife") {
                    Decay::Halflife(halflife)
                } else if let Some(com) = float("com") {
                    Decay::CenterOfMass(com)
                } else {
                    return Err(invalid(
                        "the 'ewm' trendline requires one of alpha, span, halflife, com".to_string(),
                    ));
                };
                TrendlineFit::Ewm(decay)
            }
        })
    }

    fn label(&self) -> &'static str {
        match self {
            TrendlineFit::Ols { .. } => "OLS",
            TrendlineFit::Lowess { .. } => "LOWESS",
            TrendlineFit::Rolling { .. } => "Rolling mean",
            TrendlineFit::Expanding => "Expanding mean",
            TrendlineFit::Ewm(_) => "EWM mean",
        }
    }

    /// Fitted y for each sorted x. OLS fits in log space on log axes.
    ///
    /// `None` when the group cannot be fitted: OLS needs two distinct x values
    /// (or a non-zero x without a constant).
    fn apply(
        &self,
        x: &[f64],
        y: &[f64],
        log_x: bool,
        log_y: bool,
    ) -> Result<Option<Vec<Option<f64>>>> {
        Ok(Some(match *self {
            TrendlineFit::Ols { add_constant } => {
                if (log_x && x.iter().any(|v| *v <= 0.0)) || (log_y && y.iter().any(|v| *v <= 0.0)) {
                    return Err(VueError::DataError(
                        "Can't do OLS trendline with non-positive values on a log axis".to_string(),
                    ));
                }
                let fx: Vec<f64> = if log_x { x.iter().map(|v| v.ln()).collect() } else { x.to_vec() };
                let fy: Vec<f64> = if log_y { y.iter().map(|v| v.ln()).collect() } else { y.to_vec() };
                let degenerate = if add_constant {
                    fx.first() == fx.last()
                } else {
                    fx.iter().all(|v| *v == 0.0)
                };
                if degenerate {
                    return Ok(None);
                }
                stats::ols(&fx, &fy, add_constant)?
                    .into_iter()
                    .map(|v| Some(if log_y { v.exp() } else { v }))
                    .collect()
            }
            TrendlineFit::Lowess { frac } => stats::lowess(x, y, frac).into_iter().map(Some).collect(),
            TrendlineFit::Rolling { window, min_periods } => stats::rolling_mean(y, window, min_periods),
            TrendlineFit::Expanding => stats::expanding_mean(y).into_iter().map(Some).collect(),
            TrendlineFit::Ewm(decay) => stats::ewm_mean(y, decay).into_iter().map(Some).collect(),
        }))
    }
}

fn trendline_trace(
    source: &Value,
    x: &[f64],
    fitted: Vec<Option<f64>>,
    label: &str,
    args: &ExpressArgs<'_>,
) -> Value {
    let x_label = args.x.map(|c| args.label(c)).unwrap_or_default();
    let y_label = args.y.map(|c| args.label(c)).unwrap_or_default();

    let mut trace = json!({
        "type": "scatter",
        "mode": "lines",
        "x": x,
        "y": fitted,
        "name": source["name"],
        "legendgroup": source["legendgroup"],
        "showlegend": false,
        "xaxis": source["xaxis"],
        "yaxis": source["yaxis"],
        "hovertemplate": format!(
            "<b>{} trendline</b><br><br>{}=%{{x}}<br>{}=%{{y}} <b>(trend)</b><extra></extra>",
            label, x_label, y_label
        ),
    });
    if let Some(color) = source["marker"]["color"].as_str() {
        trace["line"] = json!({ "color": color });
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::schema::Schema;
    use polars::prelude::*;

    fn config(value: Value) -> ScatterConfig {
        ScatterConfig::from_params(value.as_object().cloned().unwrap()).unwrap()
    }

    fn frame() -> DataFrame {
        df! {
            "log2fc" => &[-2.0, -1.0, 0.5, 1.0, 2.0, 3.0],
            "neglog10p" => &[3.0, 1.5, 0.5, 2.0, 4.0, 6.0],
            "regulation" => &["down", "down", "ns", "up", "up", "up"],
            "gene" => &["g1", "g2", "g3", "g4", "g5", "g6"],
        }
        .unwrap()
    }

    #[test]
    fn test_basic_scatter_styling() {
        let fig = build(
            &frame(),
            &config(json!({"x": "log2fc", "y": "neglog10p", "color": "regulation", "hover_name": "gene"})),
        )
        .unwrap();
        let traces = fig.traces();
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[0]["mode"], "markers");
        assert_eq!(traces[0]["marker"]["opacity"], 0.8);
        assert_eq!(traces[0]["marker"]["line"]["color"], "DarkSlateGrey");
        assert_eq!(traces[2]["hovertext"], json!(["g4", "g5", "g6"]));
        assert_eq!(fig.layout()["legend"]["orientation"], "h");
        assert_eq!(fig.layout()["title"]["text"], "Scatter Plot");
        assert_eq!(fig.layout()["yaxis"]["title"]["text"], "Neglog10P");
    }

    #[test]
    fn test_density_colouring() {
        let fig = build(
            &frame(),
            &config(json!({"x": "log2fc", "y": "neglog10p", "color_by_density": true})),
        )
        .unwrap();
        let trace = &fig.traces()[0];
        assert_eq!(fig.traces().len(), 1);
        let colors = trace["marker"]["color"].as_array().unwrap();
        assert_eq!(colors.len(), 6);
        assert!(colors.iter().all(|c| c.as_f64().is_some_and(|v| v > 0.0)));
        assert_eq!(fig.layout()["coloraxis"]["colorbar"]["title"]["text"], "density");
    }

    #[test]
    fn test_ols_trendline_per_group() {
        let fig = build(
            &frame(),
            &config(json!({
                "x": "log2fc", "y": "neglog10p", "color": "regulation",
                "category_orders": {"regulation": ["up", "down", "ns"]},
                "trendline": "ols"
            })),
        )
        .unwrap();
        // "ns" holds a single point, so only "up" and "down" get a line
        let traces = fig.traces();
        assert_eq!(traces.len(), 5);
        assert_eq!(traces[3]["name"], "down");
        assert_eq!(traces[3]["mode"], "lines");
        assert_eq!(traces[4]["name"], "ns");
        assert_eq!(traces[4]["mode"], "markers");
        assert_eq!(traces[0]["name"], "up");
        assert_eq!(traces[1]["mode"], "lines");
        assert_eq!(traces[1]["name"], "up");
        assert_eq!(traces[1]["showlegend"], false);
        assert_eq!(traces[1]["line"]["color"], traces[0]["marker"]["color"]);
        assert!(traces[1]["hovertemplate"].as_str().unwrap().starts_with("<b>OLS trendline</b>"));
        assert!(traces[1].get("marker").is_none());

        // up: (1,2), (2,4), (3,6) lie on y = 2x
        let fitted: Vec<f64> = traces[1]["y"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        for (got, want) in fitted.iter().zip([2.0, 4.0, 6.0]) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ols_skips_constant_x_group() {
        let data = df! {
            "dose" => &[1.0, 1.0, 1.0, 1.0, 2.0, 3.0],
            "response" => &[0.2, 0.4, 0.3, 1.0, 2.1, 2.9],
            "batch" => &["a", "a", "a", "b", "b", "b"],
        }
        .unwrap();
        let fig = build(
            &data,
            &config(json!({"x": "dose", "y": "response", "color": "batch", "trendline": "ols"})),
        )
        .unwrap();
        let modes: Vec<&Value> = fig.traces().iter().map(|t| &t["mode"]).collect();
        assert_eq!(modes, vec!["markers", "markers", "lines"]);
        assert_eq!(fig.traces()[2]["name"], "b");

        let fit = TrendlineFit::Ols { add_constant: false };
        assert_eq!(fit.apply(&[0.0, 0.0], &[1.0, 2.0], false, false).unwrap(), None);
    }

    #[test]
    fn test_rolling_trendline_pads_with_null() {
        let fig = build(
            &frame(),
            &config(json!({
                "x": "log2fc", "y": "neglog10p",
                "trendline": "rolling", "trendline_options": {"window": 2}
            })),
        )
        .unwrap();
        let trend = &fig.traces()[1];
        assert_eq!(trend["y"][0], Value::Null);
        assert_eq!(trend["y"][1], json!(2.25));
        assert_eq!(trend["x"], json!([-2.0, -1.0, 0.5, 1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_unsupported_trendline_function() {
        let err = build(
            &frame(),
            &config(json!({
                "x": "log2fc", "y": "neglog10p",
                "trendline": "expanding", "trendline_options": {"function": "median"}
            })),
        )
        .unwrap_err();
        assert!(matches!(err, VueError::InvalidField { ref field, .. } if field == "trendline_options"));
    }

    #[test]
    fn test_ols_on_log_axis_rejects_non_positive() {
        let err = build(
            &frame(),
            &config(json!({"x": "log2fc", "y": "neglog10p", "trendline": "ols", "log_x": true})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("log axis"));
    }

    #[test]
    fn test_ewm_options_resolve_to_decay() {
        let mut options = Params::new();
        options.insert("span".to_string(), json!(3));
        assert_eq!(
            TrendlineFit::from_options(TrendlineKind::Ewm, &options).unwrap(),
            TrendlineFit::Ewm(Decay::Span(3.0))
        );
        assert_eq!(
            TrendlineFit::from_options(TrendlineKind::Lowess, &Params::new()).unwrap(),
            TrendlineFit::Lowess { frac: 2.0 / 3.0 }
        );
    }
}
