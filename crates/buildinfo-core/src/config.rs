//! Extractor configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) is a valid configuration.
//!
//! ```toml
//! base_url = "https://ci.example.com/"
//! agent_name = "Bamboo"
//! agent_version = "9.2.1 build 90211"
//! include_env_vars = true
//!
//! [global_patterns]
//! include = ["*"]
//! exclude = ["*password*", "*secret*"]
//!
//! [global_variables]
//! region = "eu-west-1"
//!
//! [build_names]
//! "PROJ-PLAN" = "Project - Plan"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::domain::BuildAgent;
use crate::patterns::IncludeExcludePatterns;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractorConfig {
    /// CI server base URL used for build links.
    pub base_url: String,

    /// Build agent reported in build info.
    pub agent_name: String,
    pub agent_version: String,

    /// Overlay the build environment on the global variables.
    pub include_env_vars: bool,

    /// Filter applied to global variable names; the environment is never filtered.
    pub global_patterns: IncludeExcludePatterns,

    /// Server-wide variables served by [`crate::StaticHost`].
    pub global_variables: BTreeMap<String, String>,

    /// Build key to display name, served by [`crate::StaticHost`].
    pub build_names: BTreeMap<String, String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            base_url: "http://localhost:8085/".to_string(),
            agent_name: "Bamboo".to_string(),
            agent_version: crate::VERSION.to_string(),
            include_env_vars: true,
            global_patterns: IncludeExcludePatterns::default(),
            global_variables: BTreeMap::new(),
            build_names: BTreeMap::new(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading extractor config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn build_agent(&self) -> BuildAgent {
        BuildAgent::new(self.agent_name.clone(), self.agent_version.clone())
    }
}
