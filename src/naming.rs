//! Centralized naming conventions for Plotly identifiers.
//!
//! Plotly addresses axes in two forms: traces reference them by id (`x`, `x2`,
//! `y3`) while the layout stores them under keys (`xaxis`, `xaxis2`, `yaxis3`).
//! The first axis never carries a number. Everything that generates or parses
//! those names goes through this module.
//!
//! # Categories
//!
//! - **Axis ids**: trace-side references (`x`, `x2`, ...)
//! - **Axis layout keys**: layout-side objects (`xaxis`, `xaxis2`, ...)
//! - **Trace names**: legend labels derived from grouping values
//! - **plotly.js bundle**: CDN location embedded in HTML output

use const_format::concatcp;

// ============================================================================
// plotly.js bundle
// ============================================================================

/// plotly.js release referenced by HTML output
pub const PLOTLYJS_VERSION: &str = "2.35.2";

/// CDN location of the minified plotly.js bundle
pub const PLOTLYJS_CDN_URL: &str = concatcp!("https://cdn.plot.ly/plotly-", PLOTLYJS_VERSION, ".min.js");

// ============================================================================
// Axis naming
// ============================================================================

/// Trace-side id of the x axis for a 1-based subplot index: `x`, `x2`, ...
pub fn x_axis_id(index: usize) -> String {
    axis_id('x', index)
}

/// Trace-side id of the y axis for a 1-based subplot index: `y`, `y2`, ...
pub fn y_axis_id(index: usize) -> String {
    axis_id('y', index)
}

/// Layout key of the x axis for a 1-based subplot index: `xaxis`, `xaxis2`, ...
pub fn x_axis_key(index: usize) -> String {
    axis_key('x', index)
}

/// Layout key of the y axis for a 1-based subplot index: `yaxis`, `yaxis2`, ...
pub fn y_axis_key(index: usize) -> String {
    axis_key('y', index)
}

fn axis_id(letter: char, index: usize) -> String {
    if index <= 1 {
        letter.to_string()
    } else {
        format!("{}{}", letter, index)
    }
}

fn axis_key(letter: char, index: usize) -> String {
    if index <= 1 {
        format!("{}axis", letter)
    } else {
        format!("{}axis{}", letter, index)
    }
}

/// Check whether a layout key names an axis of the given letter.
///
/// Matches `xaxis`, `xaxis2`, `xaxis10` but not `xaxis_extra` or `x`.
pub fn is_axis_key(key: &str, letter: char) -> bool {
    let prefix = format!("{}axis", letter);
    match key.strip_prefix(&prefix) {
        Some("") => true,
        Some(rest) => rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

// ============================================================================
// Trace naming
// ============================================================================

/// Separator between grouping values in a trace name (`Up, circle`)
pub const TRACE_NAME_SEPARATOR: &str = ", ";

/// Build a legend name from the grouping values of a trace.
pub fn trace_name(values: &[String]) -> String {
    values.join(TRACE_NAME_SEPARATOR)
}

/// Facet annotation text: `column=value`
pub fn facet_label(column: &str, value: &str) -> String {
    format!("{}={}", column, value)
}
