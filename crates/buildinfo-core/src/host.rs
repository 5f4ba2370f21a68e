//! Collaborators provided by the CI server.
//!
//! These traits are the only way the extractor reaches into the host:
//! - `BaseUrlResolver`: externally reachable server URL
//! - `GlobalVariableSource`: server-wide configuration variables
//! - `BuildNameLookup`: human-readable name for a build key
//!
//! `StaticHost` answers all three from fixed data (configuration files, tests).

use std::collections::BTreeMap;

use crate::config::ExtractorConfig;

/// Resolves the CI server's base URL, e.g. `https://ci.example.com/`.
pub trait BaseUrlResolver: Send + Sync {
    fn base_url(&self) -> String;
}

/// Server-wide variables applicable to every build.
pub trait GlobalVariableSource: Send + Sync {
    fn global_variables(&self) -> BTreeMap<String, String>;
}

/// Looks up the display name of a build key such as `PROJ-PLAN`.
///
/// Returns `None` (or a blank name) when the key is unknown.
pub trait BuildNameLookup: Send + Sync {
    fn build_name(&self, build_key: &str) -> Option<String>;
}

/// Host backed by in-memory data.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    base_url: String,
    global_variables: BTreeMap<String, String>,
    build_names: BTreeMap<String, String>,
}

impl StaticHost {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Build a host from the `base_url`, `global_variables` and
    /// `build_names` sections of a configuration.
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            global_variables: config.global_variables.clone(),
            build_names: config.build_names.clone(),
        }
    }

    pub fn with_global_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.global_variables.insert(key.into(), value.into());
        self
    }

    pub fn with_build_name(mut self, build_key: impl Into<String>, name: impl Into<String>) -> Self {
        self.build_names.insert(build_key.into(), name.into());
        self
    }
}

impl BaseUrlResolver for StaticHost {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }
}

impl GlobalVariableSource for StaticHost {
    fn global_variables(&self) -> BTreeMap<String, String> {
        self.global_variables.clone()
    }
}

impl BuildNameLookup for StaticHost {
    fn build_name(&self, build_key: &str) -> Option<String> {
        self.build_names.get(build_key).cloned()
    }
}
