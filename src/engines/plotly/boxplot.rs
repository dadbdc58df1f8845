//! Box plot builder

use super::data;
use super::express::{self, ExpressArgs, TraceKind};
use super::figure::PlotlyFigure;
use super::theming;
use crate::plot::BoxConfig;
use crate::{DataFrame, Result};
use tracing::debug;

pub fn build(data: &DataFrame, config: &BoxConfig) -> Result<PlotlyFigure> {
    data::check_columns(data, &config.bound_columns())?;

    let args = ExpressArgs {
        kind: TraceKind::Box,
        x: config.x.as_deref(),
        y: config.y.as_deref(),
        color: config.color.as_deref(),
        hover_name: config.hover_name.as_deref(),
        hover_data: &config.hover_data,
        facet_row: config.facet_row.as_deref(),
        facet_col: config.facet_col.as_deref(),
        labels: Some(&config.labels),
        color_discrete_map: Some(&config.color_discrete_map),
        category_orders: Some(&config.category_orders),
        orientation: config.orientation,
        template: config.template,
        extra: Some(&config.extra),
        ..Default::default()
    };
    let mut fig = express::build(data, &args)?.figure;
    theming::apply_box_theme(&mut fig, config);

    debug!(traces = fig.traces().len(), "Built box figure");
    Ok(fig)
}
