//! Line plot builder

use super::data;
use super::express::{self, ExpressArgs, TraceKind};
use super::figure::PlotlyFigure;
use super::theming;
use crate::plot::LineConfig;
use crate::{DataFrame, Result};
use tracing::debug;

pub fn build(data: &DataFrame, config: &LineConfig) -> Result<PlotlyFigure> {
    data::check_columns(data, &config.bound_columns())?;

    let args = ExpressArgs {
        kind: TraceKind::Line,
        x: Some(&config.x),
        y: Some(&config.y),
        color: config.color.as_deref(),
        symbol: config.symbol.as_deref(),
        line_dash: config.line_dash.as_deref(),
        line_group: config.line_group.as_deref(),
        text: config.text.as_deref(),
        hover_name: config.hover_name.as_deref(),
        hover_data: &config.hover_data,
        error_x: config.error_x.as_deref(),
        error_y: config.error_y.as_deref(),
        facet_row: config.facet_row.as_deref(),
        facet_col: config.facet_col.as_deref(),
        labels: Some(&config.labels),
        color_discrete_map: Some(&config.color_discrete_map),
        symbol_map: Some(&config.symbol_map),
        line_dash_map: Some(&config.line_dash_map),
        category_orders: Some(&config.category_orders),
        template: config.template,
        extra: Some(&config.extra),
        ..Default::default()
    };
    let mut fig = express::build(data, &args)?.figure;
    theming::apply_line_theme(&mut fig, config);

    debug!(traces = fig.traces().len(), "Built line figure");
    Ok(fig)
}
