//! Engine registry
//!
//! Builders turn a DataFrame plus a validated configuration into a figure and
//! are keyed by `(PlotType, Engine)`; savers write a figure to disk and are
//! keyed by `Engine`. Re-registering a key replaces the previous entry and
//! there is no removal.
//!
//! A process-wide registry, pre-populated with every engine in this crate,
//! backs the free functions of this module. Independent `Registry` values can
//! be created for tests or custom dispatch.
//!
//! # Example
//!
//! ```rust,ignore
//! use vuecore::engines::{get_builder, register_builder};
//! use vuecore::{Engine, PlotType};
//!
//! let build = get_builder(PlotType::Scatter, Engine::Plotly)?;
//! let figure = build(&data, &config)?;
//! ```

pub mod plotly;

use crate::figure::Figure;
use crate::plot::{Engine, PlotConfig, PlotType};
use crate::{DataFrame, Result, VueError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Builds a figure from data and a validated configuration
pub type BuilderFn = Arc<dyn Fn(&DataFrame, &PlotConfig) -> Result<Figure> + Send + Sync>;

/// Writes a figure to a path, choosing the format from the extension
pub type SaverFn = Arc<dyn Fn(&Figure, &Path) -> Result<()> + Send + Sync>;

/// Lookup tables from plot type and engine to builder and saver functions
#[derive(Clone, Default)]
pub struct Registry {
    builders: HashMap<(PlotType, Engine), BuilderFn>,
    savers: HashMap<Engine, SaverFn>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every engine shipped with the crate
    pub fn with_default_engines() -> Self {
        let mut registry = Self::new();
        plotly::register(&mut registry);
        registry
    }

    pub fn register_builder<F>(&mut self, plot_type: PlotType, engine: Engine, builder: F)
    where
        F: Fn(&DataFrame, &PlotConfig) -> Result<Figure> + Send + Sync + 'static,
    {
        debug!(%plot_type, %engine, "Registering builder");
        self.builders.insert((plot_type, engine), Arc::new(builder));
    }

    pub fn register_saver<F>(&mut self, engine: Engine, saver: F)
    where
        F: Fn(&Figure, &Path) -> Result<()> + Send + Sync + 'static,
    {
        debug!(%engine, "Registering saver");
        self.savers.insert(engine, Arc::new(saver));
    }

    pub fn get_builder(&self, plot_type: PlotType, engine: Engine) -> Result<BuilderFn> {
        self.builders
            .get(&(plot_type, engine))
            .cloned()
            .ok_or(VueError::BuilderNotFound { plot_type, engine })
    }

    pub fn get_saver(&self, engine: Engine) -> Result<SaverFn> {
        self.savers
            .get(&engine)
            .cloned()
            .ok_or(VueError::SaverNotFound { engine })
    }

    /// Registered builder keys, sorted
    pub fn builder_keys(&self) -> Vec<(PlotType, Engine)> {
        let mut keys: Vec<_> = self.builders.keys().copied().collect();
        keys.sort();
        keys
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut savers: Vec<_> = self.savers.keys().collect();
        savers.sort();
        f.debug_struct("Registry")
            .field("builders", &self.builder_keys())
            .field("savers", &savers)
            .finish()
    }
}

static REGISTRY: LazyLock<RwLock<Registry>> =
    LazyLock::new(|| RwLock::new(Registry::with_default_engines()));

/// Register a builder in the process-wide registry
pub fn register_builder<F>(plot_type: PlotType, engine: Engine, builder: F)
where
    F: Fn(&DataFrame, &PlotConfig) -> Result<Figure> + Send + Sync + 'static,
{
    REGISTRY.write().register_builder(plot_type, engine, builder);
}

/// Register a saver in the process-wide registry
pub fn register_saver<F>(engine: Engine, saver: F)
where
    F: Fn(&Figure, &Path) -> Result<()> + Send + Sync + 'static,
{
    REGISTRY.write().register_saver(engine, saver);
}

/// Look up a builder in the process-wide registry
pub fn get_builder(plot_type: PlotType, engine: Engine) -> Result<BuilderFn> {
    REGISTRY.read().get_builder(plot_type, engine)
}

/// Look up a saver in the process-wide registry
pub fn get_saver(engine: Engine) -> Result<SaverFn> {
    REGISTRY.read().get_saver(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::plotly::PlotlyFigure;

    fn empty_figure(_: &DataFrame, _: &PlotConfig) -> Result<Figure> {
        Ok(Figure::Plotly(PlotlyFigure::default()))
    }

    #[test]
    fn test_empty_registry_lookups_fail() {
        let registry = Registry::new();

        let err = registry.get_builder(PlotType::Bar, Engine::Plotly).err().unwrap();
        assert_eq!(err.to_string(), "No 'bar' builder found for engine 'plotly'");

        let err = registry.get_saver(Engine::Plotly).err().unwrap();
        assert_eq!(err.to_string(), "No saver found for engine 'plotly'");
    }

    #[test]
    fn test_register_and_overwrite() {
        let mut registry = Registry::new();
        registry.register_builder(PlotType::Line, Engine::Plotly, empty_figure);
        assert!(registry.get_builder(PlotType::Line, Engine::Plotly).is_ok());
        assert!(registry.get_builder(PlotType::Scatter, Engine::Plotly).is_err());

        registry.register_builder(PlotType::Line, Engine::Plotly, |_, _| {
            Err(VueError::InternalError("replaced".to_string()))
        });
        let build = registry.get_builder(PlotType::Line, Engine::Plotly).unwrap();
        let config = PlotConfig::from_params(
            PlotType::Line,
            serde_json::json!({"x": "a", "y": "b"}),
        )
        .unwrap();
        let err = build(&DataFrame::empty(), &config).unwrap_err();
        assert!(err.to_string().contains("replaced"));
        assert_eq!(registry.builder_keys(), vec![(PlotType::Line, Engine::Plotly)]);
    }

    #[test]
    fn test_default_engines_cover_every_plot_type() {
        let registry = Registry::with_default_engines();
        for plot_type in PlotType::ALL {
            assert!(registry.get_builder(plot_type, Engine::Plotly).is_ok());
        }
        assert!(registry.get_saver(Engine::Plotly).is_ok());
    }

    #[test]
    fn test_global_registry_is_prepopulated() {
        assert!(get_builder(PlotType::Box, Engine::Plotly).is_ok());
        assert!(get_saver(Engine::Plotly).is_ok());
    }
}
