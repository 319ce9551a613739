//! Caching weight document loader with fallback.
//!
//! A [`WeightStore`] is created explicitly and handed to whoever needs
//! weights; there is no process-wide instance. Every load attempt returns a
//! usable configuration:
//!
//! 1. the freshly loaded document, which then replaces the cache;
//! 2. otherwise the last document that loaded successfully;
//! 3. otherwise the built-in default.
//!
//! The error that caused a fallback travels alongside the configuration in
//! [`LoadOutcome`]. The cache is only ever dropped by [`WeightStore::invalidate`].

use std::{path::Path, sync::Arc};

use log::{info, warn};
use serde::Serialize;

use crate::{error::WeightConfigError, weight_config::WeightConfiguration};

/// Where the configuration in a [`LoadOutcome`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    Loaded,
    CachedFallback,
    BuiltinDefault,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub config: Arc<WeightConfiguration>,
    pub source: WeightSource,
    /// Why the requested document was not used, if it was not.
    pub error: Option<WeightConfigError>,
}

#[derive(Debug, Clone)]
pub struct WeightStore {
    cached: Option<Arc<WeightConfiguration>>,
    builtin: Arc<WeightConfiguration>,
}

impl Default for WeightStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cached: None,
            builtin: Arc::new(WeightConfiguration::builtin()),
        }
    }

    /// The cached document, or the built-in default if nothing is cached.
    #[must_use]
    pub fn current(&self) -> Arc<WeightConfiguration> {
        self.cached.as_ref().unwrap_or(&self.builtin).clone()
    }

    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Drops the cached document; later fallbacks use the built-in default.
    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            info!("weight cache invalidated");
        }
    }

    pub fn load_path(&mut self, path: &Path) -> LoadOutcome {
        self.accept(WeightConfiguration::from_path(path))
    }

    pub fn load_str(&mut self, json: &str) -> LoadOutcome {
        self.accept(WeightConfiguration::from_json_str(json))
    }

    pub fn load_value(&mut self, value: serde_json::Value) -> LoadOutcome {
        self.accept(WeightConfiguration::from_value(value))
    }

    fn accept(&mut self, loaded: Result<WeightConfiguration, WeightConfigError>) -> LoadOutcome {
        match loaded {
            Ok(config) => {
                info!("loaded weight configuration {:?}", config.name);
                let config = Arc::new(config);
                self.cached = Some(Arc::clone(&config));
                LoadOutcome {
                    config,
                    source: WeightSource::Loaded,
                    error: None,
                }
            }
            Err(error) => {
                let source = if self.cached.is_some() {
                    WeightSource::CachedFallback
                } else {
                    WeightSource::BuiltinDefault
                };
                warn!("weight configuration rejected ({error}); using {source:?}");
                for issue in error.issues() {
                    warn!("  {issue}");
                }
                LoadOutcome {
                    config: self.current(),
                    source,
                    error: Some(error),
                }
            }
        }
    }
}
