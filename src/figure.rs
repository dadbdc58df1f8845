//! Engine-neutral figure handle

use crate::engines::plotly::PlotlyFigure;
use crate::plot::Engine;
use serde_json::Value;

/// Figure produced by a builder, owned by the engine that built it
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Figure {
    Plotly(PlotlyFigure),
}

impl Figure {
    pub fn engine(&self) -> Engine {
        match self {
            Figure::Plotly(_) => Engine::Plotly,
        }
    }

    pub fn as_plotly(&self) -> Option<&PlotlyFigure> {
        match self {
            Figure::Plotly(figure) => Some(figure),
        }
    }

    pub fn as_plotly_mut(&mut self) -> Option<&mut PlotlyFigure> {
        match self {
            Figure::Plotly(figure) => Some(figure),
        }
    }

    /// Serialized figure document
    pub fn to_json(&self) -> Value {
        match self {
            Figure::Plotly(figure) => figure.to_value(),
        }
    }
}

impl From<PlotlyFigure> for Figure {
    fn from(figure: PlotlyFigure) -> Self {
        Figure::Plotly(figure)
    }
}
