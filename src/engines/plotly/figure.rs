//! Plotly figure document
//!
//! A figure is the `{"data": [...], "layout": {...}}` object plotly.js renders.
//! Traces and layout are kept as JSON so that pass-through parameters and
//! attributes this crate does not model survive untouched.

use crate::naming;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Trace list plus layout of a Plotly figure
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlotlyFigure {
    traces: Vec<Value>,
    layout: Map<String, Value>,
}

impl PlotlyFigure {
    pub fn new(traces: Vec<Value>, layout: Map<String, Value>) -> Self {
        Self { traces, layout }
    }

    pub fn traces(&self) -> &[Value] {
        &self.traces
    }

    pub fn traces_mut(&mut self) -> &mut [Value] {
        &mut self.traces
    }

    pub fn layout(&self) -> &Map<String, Value> {
        &self.layout
    }

    pub fn add_trace(&mut self, trace: Value) {
        self.traces.push(trace);
    }

    /// Insert a trace before position `index`, appending when past the end
    pub fn insert_trace(&mut self, index: usize, trace: Value) {
        let index = index.min(self.traces.len());
        self.traces.insert(index, trace);
    }

    /// Merge `patch` into every trace accepted by `selector`
    pub fn update_traces<F>(&mut self, patch: &Value, selector: F)
    where
        F: Fn(&Value) -> bool,
    {
        for trace in self.traces.iter_mut().filter(|t| selector(t)) {
            merge(trace, patch);
        }
    }

    /// Merge `patch` into the layout
    pub fn update_layout(&mut self, patch: Value) {
        if let Value::Object(patch) = patch {
            for (key, value) in patch {
                match self.layout.get_mut(&key) {
                    Some(existing) => merge(existing, &value),
                    None => {
                        self.layout.insert(key, value);
                    }
                }
            }
        }
    }

    /// Merge `patch` into every axis of the given letter (`xaxis`, `xaxis2`, ...)
    ///
    /// The first axis is created if the layout has none yet.
    pub fn update_axes(&mut self, letter: char, patch: &Value) {
        let first = if letter == 'x' {
            naming::x_axis_key(1)
        } else {
            naming::y_axis_key(1)
        };
        self.layout.entry(first).or_insert_with(|| json!({}));

        for (key, axis) in self.layout.iter_mut() {
            if naming::is_axis_key(key, letter) {
                merge(axis, patch);
            }
        }
    }

    /// Axis layout keys of the given letter, in key order
    pub fn axis_keys(&self, letter: char) -> Vec<String> {
        self.layout
            .keys()
            .filter(|key| naming::is_axis_key(key, letter))
            .cloned()
            .collect()
    }

    pub fn to_value(&self) -> Value {
        json!({
            "data": self.traces,
            "layout": self.layout,
        })
    }
}

impl Serialize for PlotlyFigure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PlotlyFigure", 2)?;
        state.serialize_field("data", &self.traces)?;
        state.serialize_field("layout", &self.layout)?;
        state.end()
    }
}

/// Recursively merge `patch` into `target`: objects merge key by key,
/// anything else replaces the target value.
pub fn merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_recursive() {
        let mut target = json!({"marker": {"size": 4, "line": {"width": 1}}, "mode": "markers"});
        merge(&mut target, &json!({"marker": {"line": {"color": "black"}}, "mode": "lines"}));
        assert_eq!(
            target,
            json!({"marker": {"size": 4, "line": {"width": 1, "color": "black"}}, "mode": "lines"})
        );
    }

    #[test]
    fn test_update_traces_respects_selector() {
        let mut fig = PlotlyFigure::new(
            vec![json!({"mode": "markers"}), json!({"mode": "lines"})],
            Map::new(),
        );
        fig.update_traces(&json!({"marker": {"opacity": 0.5}}), |t| t["mode"] == "markers");
        assert_eq!(fig.traces()[0]["marker"]["opacity"], 0.5);
        assert!(fig.traces()[1].get("marker").is_none());
    }

    #[test]
    fn test_insert_trace() {
        let mut fig = PlotlyFigure::new(vec![json!({"name": "a"}), json!({"name": "c"})], Map::new());
        fig.insert_trace(1, json!({"name": "b"}));
        fig.insert_trace(10, json!({"name": "d"}));
        let names: Vec<&Value> = fig.traces().iter().map(|t| &t["name"]).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_update_axes_touches_every_axis() {
        let mut layout = Map::new();
        layout.insert("xaxis2".to_string(), json!({"matches": "x"}));
        layout.insert("yaxis".to_string(), json!({}));
        let mut fig = PlotlyFigure::new(Vec::new(), layout);

        fig.update_axes('x', &json!({"type": "log"}));
        assert_eq!(fig.layout()["xaxis"]["type"], "log");
        assert_eq!(fig.layout()["xaxis2"]["type"], "log");
        assert_eq!(fig.layout()["xaxis2"]["matches"], "x");
        assert!(fig.layout()["yaxis"].get("type").is_none());
        assert_eq!(fig.axis_keys('x'), vec!["xaxis", "xaxis2"]);
    }

    #[test]
    fn test_serializes_as_plotly_document() {
        let fig = PlotlyFigure::new(vec![json!({"type": "bar"})], Map::new());
        let value = serde_json::to_value(&fig).unwrap();
        assert_eq!(value, json!({"data": [{"type": "bar"}], "layout": {}}));
        assert_eq!(value, fig.to_value());
    }
}
