//! Built-in visual themes
//!
//! Each named template is emitted as a plotly.js template object
//! (`{"layout": {...}}`) embedded in the figure layout, so the figure renders
//! the same wherever it is opened. Only the layout part is modelled.

use crate::plot::Template;
use serde_json::{json, Value};

/// Default discrete colour sequence of the plotly templates
pub const PLOTLY_COLORWAY: &[&str] = &[
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// D3 category colours, used by `simple_white` and by plotly.js without a template
pub const D3_COLORWAY: &[&str] = &[
    "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2", "#7F7F7F",
    "#BCBD22", "#17BECF",
];

const PLASMA: &[&str] = &[
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];

const VIRIDIS: &[&str] = &[
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde725",
];

/// Discrete colour sequence a template assigns to groups
pub fn colorway(template: Template) -> &'static [&'static str] {
    match template {
        Template::Plotly | Template::PlotlyWhite | Template::PlotlyDark => PLOTLY_COLORWAY,
        Template::SimpleWhite | Template::None => D3_COLORWAY,
    }
}

/// Evenly spaced `[[stop, colour], ...]` colour scale
fn colorscale(colors: &[&str]) -> Value {
    let last = colors.len().saturating_sub(1).max(1) as f64;
    Value::Array(
        colors
            .iter()
            .enumerate()
            .map(|(i, c)| json!([i as f64 / last, c]))
            .collect(),
    )
}

/// Axis styling shared by the gridded templates
fn grid_axis(grid: &str) -> Value {
    json!({
        "automargin": true,
        "gridcolor": grid,
        "linecolor": grid,
        "ticks": "",
        "title": {"standoff": 15},
        "zerolinecolor": grid,
        "zerolinewidth": 2,
    })
}

/// plotly.js template object for a named theme
pub fn template_object(template: Template) -> Value {
    let layout = match template {
        Template::Plotly => json!({
            "colorway": PLOTLY_COLORWAY,
            "colorscale": {"sequential": colorscale(PLASMA)},
            "font": {"color": "#2a3f5f"},
            "hovermode": "closest",
            "paper_bgcolor": "white",
            "plot_bgcolor": "#E5ECF6",
            "xaxis": grid_axis("white"),
            "yaxis": grid_axis("white"),
        }),
        Template::PlotlyWhite => json!({
            "colorway": PLOTLY_COLORWAY,
            "colorscale": {"sequential": colorscale(PLASMA)},
            "font": {"color": "#2a3f5f"},
            "hovermode": "closest",
            "paper_bgcolor": "white",
            "plot_bgcolor": "white",
            "xaxis": grid_axis("#EBF0F8"),
            "yaxis": grid_axis("#EBF0F8"),
        }),
        Template::PlotlyDark => json!({
            "colorway": PLOTLY_COLORWAY,
            "colorscale": {"sequential": colorscale(PLASMA)},
            "font": {"color": "#f2f5fa"},
            "hovermode": "closest",
            "paper_bgcolor": "rgb(17,17,17)",
            "plot_bgcolor": "rgb(17,17,17)",
            "xaxis": grid_axis("#283442"),
            "yaxis": grid_axis("#283442"),
        }),
        Template::SimpleWhite => {
            let axis = json!({
                "automargin": true,
                "linecolor": "rgb(36,36,36)",
                "showgrid": false,
                "showline": true,
                "ticks": "outside",
                "title": {"standoff": 15},
                "zeroline": false,
            });
            json!({
                "colorway": D3_COLORWAY,
                "colorscale": {"sequential": colorscale(VIRIDIS)},
                "font": {"color": "rgb(36,36,36)"},
                "hovermode": "closest",
                "paper_bgcolor": "white",
                "plot_bgcolor": "white",
                "xaxis": axis.clone(),
                "yaxis": axis,
            })
        }
        Template::None => return json!({}),
    };
    json!({ "layout": layout })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_objects() {
        let white = template_object(Template::PlotlyWhite);
        assert_eq!(white["layout"]["plot_bgcolor"], "white");
        assert_eq!(white["layout"]["colorway"][0], "#636efa");
        assert_eq!(white["layout"]["colorscale"]["sequential"][9], json!([1.0, "#f0f921"]));

        assert_eq!(template_object(Template::PlotlyDark)["layout"]["paper_bgcolor"], "rgb(17,17,17)");
        assert_eq!(template_object(Template::SimpleWhite)["layout"]["xaxis"]["showgrid"], false);
        assert_eq!(template_object(Template::None), json!({}));
    }

    #[test]
    fn test_colorway_follows_template() {
        assert_eq!(colorway(Template::Plotly)[1], "#EF553B");
        assert_eq!(colorway(Template::SimpleWhite)[0], "#1F77B4");
    }
}
