//! Second pass over an express figure: layout and trace styling
//!
//! The express pass only maps data. Everything that is purely presentational
//! (titles, figure size, template, axis type and range, marker and trace
//! styling) is applied here, per plot type.

use super::figure::PlotlyFigure;
use super::template;
use crate::plot::{AxisRange, BarConfig, BoxConfig, LineConfig, ScatterConfig, Template};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Python `str.title`: upper-case the first letter of every alphabetic run,
/// lower-case the rest.
///
/// `"log_p_value"` becomes `"Log_P_Value"`, `"cd4count"` becomes `"Cd4Count"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Axis title: explicit override, then the `labels` entry for the column, then
/// the title-cased column name.
pub fn resolve_axis_title(
    explicit: Option<&str>,
    labels: &HashMap<String, String>,
    column: Option<&str>,
) -> Option<String> {
    if let Some(title) = explicit {
        return Some(title.to_string());
    }
    let column = column?;
    Some(
        labels
            .get(column)
            .cloned()
            .unwrap_or_else(|| title_case(column)),
    )
}

/// Layout settings every plot type shares
#[derive(Debug, Clone)]
pub struct LayoutTheme<'a> {
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub template: Template,
    pub width: u32,
    pub height: u32,
    pub log_x: bool,
    pub log_y: bool,
    pub range_x: Option<AxisRange>,
    pub range_y: Option<AxisRange>,
}

/// Plotly expects ranges of log axes as exponents
fn axis_range(range: AxisRange, log: bool) -> Value {
    if log {
        json!([range[0].log10(), range[1].log10()])
    } else {
        json!(range)
    }
}

/// Apply the shared layout settings
pub fn apply_layout(fig: &mut PlotlyFigure, theme: &LayoutTheme<'_>) {
    let mut title = json!({ "text": theme.title });
    if let Some(subtitle) = theme.subtitle {
        title["subtitle"] = json!({ "text": subtitle });
    }

    fig.update_layout(json!({
        "title": title,
        "width": theme.width,
        "height": theme.height,
        "template": template::template_object(theme.template),
    }));

    if let Some(x_title) = &theme.x_title {
        fig.update_layout(json!({"xaxis": {"title": {"text": x_title}}}));
    }
    if let Some(y_title) = &theme.y_title {
        fig.update_layout(json!({"yaxis": {"title": {"text": y_title}}}));
    }

    let mut xaxis = json!({"type": if theme.log_x { "log" } else { "linear" }});
    if let Some(range) = theme.range_x {
        xaxis["range"] = axis_range(range, theme.log_x);
    }
    let mut yaxis = json!({"type": if theme.log_y { "log" } else { "linear" }});
    if let Some(range) = theme.range_y {
        yaxis["range"] = axis_range(range, theme.log_y);
    }
    fig.update_axes('x', &xaxis);
    fig.update_axes('y', &yaxis);
}

fn mode_has(trace: &Value, part: &str) -> bool {
    trace
        .get("mode")
        .and_then(Value::as_str)
        .is_some_and(|mode| mode.split('+').any(|p| p == part))
}

fn is_type(trace: &Value, kind: &str) -> bool {
    trace.get("type").and_then(Value::as_str) == Some(kind)
}

pub fn apply_scatter_theme(fig: &mut PlotlyFigure, config: &ScatterConfig) {
    fig.update_traces(
        &json!({
            "marker": {
                "opacity": config.opacity,
                "line": {
                    "width": config.marker_line_width,
                    "color": config.marker_line_color,
                },
            }
        }),
        |trace| mode_has(trace, "markers"),
    );

    apply_layout(
        fig,
        &LayoutTheme {
            title: &config.title,
            subtitle: config.subtitle.as_deref(),
            x_title: resolve_axis_title(config.x_title.as_deref(), &config.labels, Some(&config.x)),
            y_title: resolve_axis_title(config.y_title.as_deref(), &config.labels, Some(&config.y)),
            template: config.template,
            width: config.width,
            height: config.height,
            log_x: config.log_x,
            log_y: config.log_y,
            range_x: config.range_x,
            range_y: config.range_y,
        },
    );

    fig.update_layout(json!({
        "legend": {
            "orientation": "h",
            "yanchor": "bottom",
            "y": 1.02,
            "xanchor": "right",
            "x": 1,
        },
        "hovermode": "closest",
    }));
}

pub fn apply_line_theme(fig: &mut PlotlyFigure, config: &LineConfig) {
    if config.markers {
        // "lines" -> "lines+markers", keeping "+text"
        for trace in fig.traces_mut() {
            if mode_has(trace, "lines") && !mode_has(trace, "markers") {
                let mode = trace["mode"].as_str().unwrap_or("lines").replacen("lines", "lines+markers", 1);
                trace["mode"] = json!(mode);
            }
        }
    }
    fig.update_traces(
        &json!({"line": {"shape": config.line_shape.as_str()}}),
        |trace| mode_has(trace, "lines"),
    );

    apply_layout(
        fig,
        &LayoutTheme {
            title: &config.title,
            subtitle: config.subtitle.as_deref(),
            x_title: resolve_axis_title(config.x_title.as_deref(), &config.labels, Some(&config.x)),
            y_title: resolve_axis_title(config.y_title.as_deref(), &config.labels, Some(&config.y)),
            template: config.template,
            width: config.width,
            height: config.height,
            log_x: config.log_x,
            log_y: config.log_y,
            range_x: config.range_x,
            range_y: config.range_y,
        },
    );
}

pub fn apply_bar_theme(fig: &mut PlotlyFigure, config: &BarConfig) {
    fig.update_traces(
        &json!({"marker": {"opacity": config.opacity}}),
        |trace| is_type(trace, "bar"),
    );

    apply_layout(
        fig,
        &LayoutTheme {
            title: &config.title,
            subtitle: config.subtitle.as_deref(),
            x_title: resolve_axis_title(config.x_title.as_deref(), &config.labels, Some(&config.x)),
            y_title: resolve_axis_title(config.y_title.as_deref(), &config.labels, Some(&config.y)),
            template: config.template,
            width: config.width,
            height: config.height,
            log_x: config.log_x,
            log_y: config.log_y,
            range_x: config.range_x,
            range_y: config.range_y,
        },
    );

    fig.update_layout(json!({"barmode": config.barmode.as_str()}));
}

pub fn apply_box_theme(fig: &mut PlotlyFigure, config: &BoxConfig) {
    fig.update_traces(
        &json!({
            "notched": config.notched,
            "boxpoints": config.points.to_value(),
        }),
        |trace| is_type(trace, "box"),
    );

    apply_layout(
        fig,
        &LayoutTheme {
            title: &config.title,
            subtitle: config.subtitle.as_deref(),
            x_title: resolve_axis_title(
                config.x_title.as_deref(),
                &config.labels,
                config.x.as_deref(),
            ),
            y_title: resolve_axis_title(
                config.y_title.as_deref(),
                &config.labels,
                config.y.as_deref(),
            ),
            template: config.template,
            width: config.width,
            height: config.height,
            log_x: config.log_x,
            log_y: config.log_y,
            range_x: config.range_x,
            range_y: config.range_y,
        },
    );

    fig.update_layout(json!({"boxmode": config.boxmode.as_str()}));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::schema::Schema;
    use serde_json::Map;

    #[test]
    fn test_title_case_matches_python() {
        assert_eq!(title_case("gene_expression"), "Gene_Expression");
        assert_eq!(title_case("log p VALUE"), "Log P Value");
        assert_eq!(title_case("cd4count"), "Cd4Count");
        assert_eq!(title_case("-log10_p"), "-Log10_P");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_axis_title_resolution_order() {
        let labels: HashMap<String, String> =
            [("gene_expression".to_string(), "Expression".to_string())].into();

        assert_eq!(
            resolve_axis_title(Some("Log2 FC"), &labels, Some("gene_expression")).as_deref(),
            Some("Log2 FC")
        );
        assert_eq!(
            resolve_axis_title(None, &labels, Some("gene_expression")).as_deref(),
            Some("Expression")
        );
        assert_eq!(
            resolve_axis_title(None, &labels, Some("log_p_value")).as_deref(),
            Some("Log_P_Value")
        );
        assert_eq!(resolve_axis_title(None, &labels, None), None);
    }

    fn figure() -> PlotlyFigure {
        let mut layout = Map::new();
        layout.insert("xaxis".to_string(), json!({"anchor": "y"}));
        layout.insert("xaxis2".to_string(), json!({"anchor": "y2", "matches": "x"}));
        layout.insert("yaxis".to_string(), json!({"anchor": "x"}));
        PlotlyFigure::new(
            vec![
                json!({"type": "scatter", "mode": "markers", "marker": {"color": "#636efa"}}),
                json!({"type": "scatter", "mode": "lines"}),
            ],
            layout,
        )
    }

    #[test]
    fn test_scatter_theme() {
        let config = ScatterConfig::from_params(
            json!({
                "x": "a", "y": "b", "log_x": true, "range_x": [1, 100], "range_y": [0, 5],
                "subtitle": "Sub", "labels": {"b": "Bee"}
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .unwrap();
        let mut fig = figure();
        apply_scatter_theme(&mut fig, &config);

        let markers = &fig.traces()[0]["marker"];
        assert_eq!(markers["opacity"], 0.8);
        assert_eq!(markers["color"], "#636efa");
        assert_eq!(markers["line"]["color"], "DarkSlateGrey");
        assert!(fig.traces()[1].get("marker").is_none());

        let layout = fig.layout();
        assert_eq!(layout["title"]["text"], "Scatter Plot");
        assert_eq!(layout["title"]["subtitle"]["text"], "Sub");
        assert_eq!(layout["xaxis"]["title"]["text"], "A");
        assert_eq!(layout["yaxis"]["title"]["text"], "Bee");
        assert_eq!(layout["xaxis"]["type"], "log");
        assert_eq!(layout["xaxis2"]["type"], "log");
        assert_eq!(layout["xaxis"]["range"], json!([0.0, 2.0]));
        assert_eq!(layout["yaxis"]["range"], json!([0.0, 5.0]));
        assert_eq!(layout["width"], 800);
        assert_eq!(layout["template"]["layout"]["plot_bgcolor"], "white");
        assert_eq!(layout["legend"]["orientation"], "h");
    }

    #[test]
    fn test_line_theme_adds_markers() {
        let config = LineConfig::from_params(
            json!({"x": "a", "y": "b", "markers": true, "line_shape": "hv", "template": "plotly_dark"})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();
        let mut fig = figure();
        apply_line_theme(&mut fig, &config);
        assert_eq!(fig.traces()[1]["mode"], "lines+markers");
        assert_eq!(fig.traces()[1]["line"]["shape"], "hv");
        assert_eq!(fig.traces()[0]["mode"], "markers");
        assert_eq!(fig.layout()["template"]["layout"]["paper_bgcolor"], "rgb(17,17,17)");
    }

    #[test]
    fn test_box_theme_points() {
        let config = BoxConfig::from_params(
            json!({"y": "b", "points": false, "boxmode": "overlay"})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();
        let mut fig = PlotlyFigure::new(vec![json!({"type": "box"})], Map::new());
        apply_box_theme(&mut fig, &config);
        assert_eq!(fig.traces()[0]["boxpoints"], false);
        assert_eq!(fig.traces()[0]["notched"], false);
        assert_eq!(fig.layout()["boxmode"], "overlay");
        assert_eq!(fig.layout()["yaxis"]["title"]["text"], "B");
        assert!(fig.layout()["xaxis"].get("title").is_none());
    }
}
