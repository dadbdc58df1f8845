//! High-level trace construction
//!
//! Translates column bindings into Plotly traces the way plotly-express does:
//! rows are split into one trace per combination of the discrete grouping
//! columns, each trace gets its style from the group it represents, and facet
//! columns lay the traces out on a grid of matched subplots.
//!
//! Theming (titles, sizes, axis types, marker styling) is not done here; see
//! [`super::theming`].

use super::data::{self, group_key};
use super::figure::{merge, PlotlyFigure};
use super::template;
use crate::naming;
use crate::plot::{Orientation, Params, Template};
use crate::{DataFrame, Result};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;

/// Default marker symbol sequence
pub const SYMBOL_SEQUENCE: &[&str] = &[
    "circle", "diamond", "square", "x", "cross", "pentagon", "hexagram", "star", "hourglass",
    "bowtie",
];

/// Default line dash sequence
pub const DASH_SEQUENCE: &[&str] = &["solid", "dot", "dash", "longdash", "dashdot", "longdashdot"];

/// Default bar pattern sequence
pub const PATTERN_SEQUENCE: &[&str] = &["", "/", "\\", "x", "-", "|", "+", "."];

/// Gap between facet columns, as a fraction of the plotting area
const FACET_COL_SPACING: f64 = 0.02;

/// Gap between facet rows, as a fraction of the plotting area
const FACET_ROW_SPACING: f64 = 0.03;

/// plotly-express arguments with no trace or layout attribute to land on
pub const EXPRESS_ONLY_ARGS: &[&str] = &[
    "render_mode",
    "animation_frame",
    "animation_group",
    "marginal_x",
    "marginal_y",
    "facet_col_wrap",
    "facet_row_spacing",
    "facet_col_spacing",
    "color_discrete_sequence",
    "color_continuous_scale",
    "color_continuous_midpoint",
    "range_color",
    "symbol_sequence",
    "line_dash_sequence",
    "pattern_shape_sequence",
    "trendline_color_override",
    "trendline_scope",
    "custom_data",
];

/// Extra keys that are layout attributes rather than trace attributes
pub const LAYOUT_ARGS: &[&str] = &[
    "bargap",
    "bargroupgap",
    "barnorm",
    "boxgap",
    "boxgroupgap",
    "dragmode",
    "font",
    "margin",
    "paper_bgcolor",
    "plot_bgcolor",
    "separators",
];

/// Split pass-through parameters into trace and layout attributes.
///
/// plotly-express-only arguments are dropped with a warning.
fn split_extra(extra: Option<&Params>) -> (Map<String, Value>, Map<String, Value>) {
    let mut trace = Map::new();
    let mut layout = Map::new();
    for (key, value) in extra.into_iter().flatten() {
        if EXPRESS_ONLY_ARGS.contains(&key.as_str()) {
            warn!(parameter = %key, "Ignoring plotly-express argument with no figure attribute");
        } else if LAYOUT_ARGS.contains(&key.as_str()) {
            layout.insert(key.clone(), value.clone());
        } else {
            trace.insert(key.clone(), value.clone());
        }
    }
    (trace, layout)
}

/// Kind of trace generated per group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceKind {
    #[default]
    Scatter,
    Line,
    Bar,
    Box,
}

/// Column bindings and discrete style maps for one express call
#[derive(Debug, Clone, Default)]
pub struct ExpressArgs<'a> {
    pub kind: TraceKind,
    pub x: Option<&'a str>,
    pub y: Option<&'a str>,
    pub color: Option<&'a str>,
    pub symbol: Option<&'a str>,
    pub line_dash: Option<&'a str>,
    pub pattern_shape: Option<&'a str>,
    pub line_group: Option<&'a str>,
    pub size: Option<&'a str>,
    pub text: Option<&'a str>,
    pub hover_name: Option<&'a str>,
    pub hover_data: &'a [String],
    pub error_x: Option<&'a str>,
    pub error_y: Option<&'a str>,
    pub facet_row: Option<&'a str>,
    pub facet_col: Option<&'a str>,
    pub labels: Option<&'a HashMap<String, String>>,
    pub color_discrete_map: Option<&'a HashMap<String, String>>,
    pub symbol_map: Option<&'a HashMap<String, String>>,
    pub line_dash_map: Option<&'a HashMap<String, String>>,
    pub pattern_shape_map: Option<&'a HashMap<String, String>>,
    pub category_orders: Option<&'a HashMap<String, Vec<Value>>>,
    /// Per-row colour values replacing the `color` binding (density colouring)
    pub continuous_color: Option<(String, Vec<Option<f64>>)>,
    pub size_max: u32,
    pub orientation: Option<Orientation>,
    pub template: Template,
    pub extra: Option<&'a Params>,
}

impl ExpressArgs<'_> {
    /// Display name of a column: `labels` entry or the column itself
    pub fn label(&self, column: &str) -> String {
        self.labels
            .and_then(|labels| labels.get(column))
            .cloned()
            .unwrap_or_else(|| column.to_string())
    }
}

/// Figure produced by the express pass, with the data rows behind each trace
#[derive(Debug, Clone)]
pub struct Express {
    pub figure: PlotlyFigure,
    pub rows: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Color,
    Symbol,
    Dash,
    Pattern,
    LineGroup,
    FacetRow,
    FacetCol,
}

impl Role {
    /// Whether the role gives traces a distinct look (and therefore a legend entry)
    fn is_style(&self) -> bool {
        matches!(self, Role::Color | Role::Symbol | Role::Dash | Role::Pattern)
    }
}

/// One discrete grouping column
struct Dimension<'a> {
    role: Role,
    column: &'a str,
    /// Group key of every row
    keys: Vec<String>,
    /// Distinct keys in display order
    levels: Vec<String>,
    /// Style value per level (colour, symbol, dash or pattern)
    styles: Vec<String>,
}

impl<'a> Dimension<'a> {
    fn new(
        data: &DataFrame,
        role: Role,
        column: &'a str,
        args: &ExpressArgs<'_>,
    ) -> Result<Self> {
        let keys: Vec<String> = data::column_values(data, column)?
            .iter()
            .map(group_key)
            .collect();

        let present: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let mut levels: Vec<String> = Vec::new();
        if let Some(order) = args.category_orders.and_then(|orders| orders.get(column)) {
            for key in order.iter().map(group_key) {
                if present.contains(key.as_str()) && !levels.contains(&key) {
                    levels.push(key);
                }
            }
        }
        for key in &keys {
            if !levels.contains(key) {
                levels.push(key.clone());
            }
        }

        let (map, sequence): (Option<&HashMap<String, String>>, &[&str]) = match role {
            Role::Color => (args.color_discrete_map, template::colorway(args.template)),
            Role::Symbol => (args.symbol_map, SYMBOL_SEQUENCE),
            Role::Dash => (args.line_dash_map, DASH_SEQUENCE),
            Role::Pattern => (args.pattern_shape_map, PATTERN_SEQUENCE),
            Role::LineGroup | Role::FacetRow | Role::FacetCol => (None, &[]),
        };
        let styles = assign_styles(&levels, map, sequence);

        Ok(Self {
            role,
            column,
            keys,
            levels,
            styles,
        })
    }
}

/// Style for each level: explicit map entries first, then the sequence in turn.
///
/// Entries of the map count towards the sequence position even when their
/// level is absent from the data.
fn assign_styles(
    levels: &[String],
    map: Option<&HashMap<String, String>>,
    sequence: &[&str],
) -> Vec<String> {
    if sequence.is_empty() {
        return vec![String::new(); levels.len()];
    }
    let mut assigned: HashMap<String, String> = map.cloned().unwrap_or_default();
    for level in levels {
        if !assigned.contains_key(level) {
            let style = sequence[assigned.len() % sequence.len()].to_string();
            assigned.insert(level.clone(), style);
        }
    }
    levels
        .iter()
        .map(|level| assigned.get(level).cloned().unwrap_or_default())
        .collect()
}

fn pick(values: &[Value], rows: &[usize]) -> Value {
    Value::Array(rows.iter().map(|&r| values[r].clone()).collect())
}

fn pick_numeric(values: &[Option<f64>], rows: &[usize]) -> Value {
    Value::Array(rows.iter().map(|&r| json!(values[r])).collect())
}

/// Insert `value` at a nested object path, creating intermediate objects
fn set_path(target: &mut Map<String, Value>, path: &[&str], value: Value) {
    let mut patch = value;
    for key in path.iter().skip(1).rev() {
        let mut wrapper = Map::new();
        wrapper.insert(key.to_string(), patch);
        patch = Value::Object(wrapper);
    }
    if let Some(first) = path.first() {
        match target.get_mut(*first) {
            Some(existing) => merge(existing, &patch),
            None => {
                target.insert(first.to_string(), patch);
            }
        }
    }
}

/// Run the express pass
pub fn build(data: &DataFrame, args: &ExpressArgs<'_>) -> Result<Express> {
    let continuous_color = match (&args.continuous_color, args.color) {
        (Some(values), _) => Some(values.clone()),
        (None, Some(column))
            if matches!(args.kind, TraceKind::Scatter | TraceKind::Bar)
                && data::is_numeric(data, column)? =>
        {
            Some((args.label(column), data::numeric_values(data, column, "color")?))
        }
        _ => None,
    };

    // Discrete grouping, in plotly-express order
    let mut dims: Vec<Dimension> = Vec::new();
    let bindings = [
        (Role::Color, args.color.filter(|_| continuous_color.is_none())),
        (Role::Symbol, args.symbol),
        (Role::Dash, args.line_dash),
        (Role::Pattern, args.pattern_shape),
        (Role::LineGroup, args.line_group),
        (Role::FacetRow, args.facet_row),
        (Role::FacetCol, args.facet_col),
    ];
    for (role, column) in bindings {
        if let Some(column) = column {
            dims.push(Dimension::new(data, role, column, args)?);
        }
    }

    let mut groups: BTreeMap<Vec<usize>, Vec<usize>> = BTreeMap::new();
    for row in 0..data.height() {
        let key: Vec<usize> = dims
            .iter()
            .map(|dim| {
                dim.levels
                    .iter()
                    .position(|level| *level == dim.keys[row])
                    .unwrap_or(0)
            })
            .collect();
        groups.entry(key).or_default().push(row);
    }
    if groups.is_empty() {
        groups.insert(vec![0; dims.len()], Vec::new());
    }

    let facet_rows = dims
        .iter()
        .find(|d| d.role == Role::FacetRow)
        .map_or(1, |d| d.levels.len().max(1));
    let facet_cols = dims
        .iter()
        .find(|d| d.role == Role::FacetCol)
        .map_or(1, |d| d.levels.len().max(1));

    // Column values shared by every trace
    let x_values = args.x.map(|c| data::column_values(data, c)).transpose()?;
    let y_values = args.y.map(|c| data::column_values(data, c)).transpose()?;
    let text_values = args.text.map(|c| data::column_values(data, c)).transpose()?;
    let hover_names = args.hover_name.map(|c| data::column_values(data, c)).transpose()?;
    let hover_values = args
        .hover_data
        .iter()
        .map(|c| data::column_values(data, c))
        .collect::<Result<Vec<_>>>()?;
    let error_x = args
        .error_x
        .map(|c| data::numeric_values(data, c, "error_x"))
        .transpose()?;
    let error_y = args
        .error_y
        .map(|c| data::numeric_values(data, c, "error_y"))
        .transpose()?;
    let sizes = args
        .size
        .map(|c| data::numeric_values(data, c, "size"))
        .transpose()?;
    let sizeref = sizes.as_ref().map(|values| {
        let max = values.iter().flatten().fold(0.0_f64, |acc, v| acc.max(*v));
        let size_max = f64::from(args.size_max.max(1));
        if max > 0.0 {
            2.0 * max / (size_max * size_max)
        } else {
            1.0
        }
    });

    let mut traces = Vec::with_capacity(groups.len());
    let mut trace_rows = Vec::with_capacity(groups.len());
    let mut legend_names: HashSet<String> = HashSet::new();
    let (trace_extra, layout_extra) = split_extra(args.extra);
    let trace_extra = Value::Object(trace_extra);

    for (key, rows) in groups {
        let mut trace = Map::new();
        match args.kind {
            TraceKind::Scatter | TraceKind::Line => {
                let base = if args.kind == TraceKind::Scatter { "markers" } else { "lines" };
                let mode = if args.text.is_some() { format!("{}+text", base) } else { base.to_string() };
                trace.insert("type".to_string(), json!("scatter"));
                trace.insert("mode".to_string(), json!(mode));
            }
            TraceKind::Bar => {
                trace.insert("type".to_string(), json!("bar"));
                if args.text.is_some() {
                    trace.insert("textposition".to_string(), json!("auto"));
                }
            }
            TraceKind::Box => {
                trace.insert("type".to_string(), json!("box"));
            }
        }

        // Name, legend and style from the group levels
        let mut name_parts = Vec::new();
        let mut group_lines = Vec::new();
        let (mut facet_r, mut facet_c) = (0, 0);
        for (dim, &level) in dims.iter().zip(&key) {
            let value = dim.levels.get(level).cloned().unwrap_or_default();
            let style = dim.styles.get(level).cloned().unwrap_or_default();
            match dim.role {
                Role::Color => match args.kind {
                    TraceKind::Line => set_path(&mut trace, &["line", "color"], json!(style)),
                    _ => set_path(&mut trace, &["marker", "color"], json!(style)),
                },
                Role::Symbol => set_path(&mut trace, &["marker", "symbol"], json!(style)),
                Role::Dash => set_path(&mut trace, &["line", "dash"], json!(style)),
                Role::Pattern => set_path(&mut trace, &["marker", "pattern", "shape"], json!(style)),
                Role::FacetRow => facet_r = level,
                Role::FacetCol => facet_c = level,
                Role::LineGroup => {}
            }
            if dim.role != Role::LineGroup {
                group_lines.push(format!("{}={}", args.label(dim.column), value));
            }
            if dim.role.is_style() {
                name_parts.push(value);
            }
        }
        let name = naming::trace_name(&name_parts);
        let showlegend = !name.is_empty() && legend_names.insert(name.clone());
        trace.insert("name".to_string(), json!(name));
        trace.insert("legendgroup".to_string(), json!(name));
        trace.insert("showlegend".to_string(), json!(showlegend));

        // Subplot placement: axis 1 is the bottom-left cell
        let cell = (facet_rows - 1 - facet_r) * facet_cols + facet_c + 1;
        trace.insert("xaxis".to_string(), json!(naming::x_axis_id(cell)));
        trace.insert("yaxis".to_string(), json!(naming::y_axis_id(cell)));

        if let Some(values) = &x_values {
            trace.insert("x".to_string(), pick(values, &rows));
        }
        if let Some(values) = &y_values {
            trace.insert("y".to_string(), pick(values, &rows));
        }
        if let Some(values) = &text_values {
            trace.insert("text".to_string(), pick(values, &rows));
        }
        if let Some(values) = &hover_names {
            trace.insert("hovertext".to_string(), pick(values, &rows));
        }
        if !hover_values.is_empty() {
            let customdata: Vec<Value> = rows
                .iter()
                .map(|&r| Value::Array(hover_values.iter().map(|col| col[r].clone()).collect()))
                .collect();
            trace.insert("customdata".to_string(), Value::Array(customdata));
        }
        if let Some(values) = &error_x {
            trace.insert(
                "error_x".to_string(),
                json!({"type": "data", "array": pick_numeric(values, &rows)}),
            );
        }
        if let Some(values) = &error_y {
            trace.insert(
                "error_y".to_string(),
                json!({"type": "data", "array": pick_numeric(values, &rows)}),
            );
        }
        if let (Some(values), Some(sizeref)) = (&sizes, sizeref) {
            set_path(&mut trace, &["marker", "size"], pick_numeric(values, &rows));
            set_path(&mut trace, &["marker", "sizemode"], json!("area"));
            set_path(&mut trace, &["marker", "sizeref"], json!(sizeref));
        }
        if let Some((_, values)) = &continuous_color {
            set_path(&mut trace, &["marker", "color"], pick_numeric(values, &rows));
            set_path(&mut trace, &["marker", "coloraxis"], json!("coloraxis"));
        }
        if let Some(orientation) = args.orientation {
            if matches!(args.kind, TraceKind::Bar | TraceKind::Box) {
                trace.insert("orientation".to_string(), json!(orientation.as_str()));
            }
        }
        trace.insert(
            "hovertemplate".to_string(),
            json!(hover_template(args, &group_lines, continuous_color.as_ref())),
        );

        let mut trace = Value::Object(trace);
        merge(&mut trace, &trace_extra);
        traces.push(trace);
        trace_rows.push(rows);
    }

    let mut layout = build_layout(args, &dims, facet_rows, facet_cols, continuous_color.as_ref());
    for (key, value) in layout_extra {
        match layout.get_mut(&key) {
            Some(existing) => merge(existing, &value),
            None => {
                layout.insert(key, value);
            }
        }
    }

    Ok(Express {
        figure: PlotlyFigure::new(traces, layout),
        rows: trace_rows,
    })
}

/// Hover text listing the group values and every bound column of a point
fn hover_template(
    args: &ExpressArgs<'_>,
    group_lines: &[String],
    continuous_color: Option<&(String, Vec<Option<f64>>)>,
) -> String {
    let mut lines = group_lines.to_vec();
    if let Some(x) = args.x {
        lines.push(format!("{}=%{{x}}", args.label(x)));
    }
    if let Some(y) = args.y {
        lines.push(format!("{}=%{{y}}", args.label(y)));
    }
    if let Some(size) = args.size {
        lines.push(format!("{}=%{{marker.size}}", args.label(size)));
    }
    if let Some((label, _)) = continuous_color {
        lines.push(format!("{}=%{{marker.color}}", label));
    }
    if let Some(text) = args.text {
        lines.push(format!("{}=%{{text}}", args.label(text)));
    }
    for (i, column) in args.hover_data.iter().enumerate() {
        lines.push(format!("{}=%{{customdata[{}]}}", args.label(column), i));
    }

    let body = lines.join("<br>");
    match args.hover_name {
        Some(_) => format!("<b>%{{hovertext}}</b><br><br>{}<extra></extra>", body),
        None => format!("{}<extra></extra>", body),
    }
}

/// Axis grid, legend, colour axis and facet annotations
fn build_layout(
    args: &ExpressArgs<'_>,
    dims: &[Dimension],
    facet_rows: usize,
    facet_cols: usize,
    continuous_color: Option<&(String, Vec<Option<f64>>)>,
) -> Map<String, Value> {
    let mut layout = Map::new();

    let col_width = (1.0 - FACET_COL_SPACING * (facet_cols - 1) as f64) / facet_cols as f64;
    let row_height = (1.0 - FACET_ROW_SPACING * (facet_rows - 1) as f64) / facet_rows as f64;
    let x_domain = |c: usize| {
        let start = c as f64 * (col_width + FACET_COL_SPACING);
        [start, (start + col_width).min(1.0)]
    };
    // Row 0 is the top row
    let y_domain = |r: usize| {
        let start = (facet_rows - 1 - r) as f64 * (row_height + FACET_ROW_SPACING);
        [start, (start + row_height).min(1.0)]
    };

    let x_order = args
        .x
        .and_then(|x| args.category_orders.and_then(|orders| orders.get(x)));
    let y_order = args
        .y
        .and_then(|y| args.category_orders.and_then(|orders| orders.get(y)));

    for r in 0..facet_rows {
        for c in 0..facet_cols {
            let cell = (facet_rows - 1 - r) * facet_cols + c + 1;
            let bottom = r == facet_rows - 1;
            let left = c == 0;

            let mut xaxis = json!({
                "anchor": naming::y_axis_id(cell),
                "domain": x_domain(c),
            });
            let mut yaxis = json!({
                "anchor": naming::x_axis_id(cell),
                "domain": y_domain(r),
            });
            if cell > 1 {
                merge(&mut xaxis, &json!({"matches": naming::x_axis_id(1)}));
                merge(&mut yaxis, &json!({"matches": naming::y_axis_id(1)}));
            }
            match (bottom, args.x) {
                (true, Some(x)) => merge(&mut xaxis, &json!({"title": {"text": args.label(x)}})),
                (false, _) => merge(&mut xaxis, &json!({"showticklabels": false})),
                _ => {}
            }
            match (left, args.y) {
                (true, Some(y)) => merge(&mut yaxis, &json!({"title": {"text": args.label(y)}})),
                (false, _) => merge(&mut yaxis, &json!({"showticklabels": false})),
                _ => {}
            }
            if let Some(order) = x_order {
                merge(&mut xaxis, &json!({"categoryorder": "array", "categoryarray": order}));
            }
            if let Some(order) = y_order {
                merge(&mut yaxis, &json!({"categoryorder": "array", "categoryarray": order}));
            }
            layout.insert(naming::x_axis_key(cell), xaxis);
            layout.insert(naming::y_axis_key(cell), yaxis);
        }
    }

    let mut annotations = Vec::new();
    for dim in dims {
        match dim.role {
            Role::FacetCol => {
                for (c, level) in dim.levels.iter().enumerate() {
                    let [x0, x1] = x_domain(c);
                    annotations.push(json!({
                        "text": naming::facet_label(&args.label(dim.column), level),
                        "x": (x0 + x1) / 2.0,
                        "y": 1.0,
                        "xref": "paper",
                        "yref": "paper",
                        "xanchor": "center",
                        "yanchor": "bottom",
                        "showarrow": false,
                    }));
                }
            }
            Role::FacetRow => {
                for (r, level) in dim.levels.iter().enumerate() {
                    let [y0, y1] = y_domain(r);
                    annotations.push(json!({
                        "text": naming::facet_label(&args.label(dim.column), level),
                        "x": 1.0,
                        "y": (y0 + y1) / 2.0,
                        "xref": "paper",
                        "yref": "paper",
                        "xanchor": "left",
                        "yanchor": "middle",
                        "textangle": 90,
                        "showarrow": false,
                    }));
                }
            }
            _ => {}
        }
    }
    if !annotations.is_empty() {
        layout.insert("annotations".to_string(), Value::Array(annotations));
    }

    let legend_title: Vec<String> = dims
        .iter()
        .filter(|d| d.role.is_style())
        .map(|d| args.label(d.column))
        .collect();
    if !legend_title.is_empty() {
        layout.insert(
            "legend".to_string(),
            json!({"title": {"text": naming::trace_name(&legend_title)}, "tracegroupgap": 0}),
        );
    }

    if let Some((label, _)) = continuous_color {
        layout.insert(
            "coloraxis".to_string(),
            json!({"colorbar": {"title": {"text": label}}}),
        );
    }

    layout.insert("margin".to_string(), json!({"t": 60}));
    layout
}
