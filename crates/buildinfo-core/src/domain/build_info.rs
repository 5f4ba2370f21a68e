//! Build-info record in the artifact repository's JSON shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::deploy::DeployDetails;

/// Schema version written into every record.
pub const BUILD_INFO_VERSION: &str = "1.0.1";

/// `strftime` format of [`BuildInfo::started`], e.g. `2024-03-01T12:00:00.000+0000`.
pub const STARTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Properties to attach to a single deployed artifact.
pub type DeployProperties = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildType {
    Generic,
}

/// The tool that produced the build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildAgent {
    pub name: String,
    pub version: String,
}

impl BuildAgent {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub sha1: String,
    pub md5: String,
    pub name: String,
}

impl From<&DeployDetails> for Artifact {
    fn from(details: &DeployDetails) -> Self {
        Artifact {
            artifact_type: details.extension(),
            sha1: details.sha1.clone(),
            md5: details.md5.clone(),
            name: details.file_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Module {
    pub id: String,
    pub artifacts: Vec<Artifact>,
}

/// Provenance record for one build, uploaded after its artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: String,
    pub name: String,
    pub number: String,
    #[serde(rename = "type")]
    pub build_type: BuildType,
    pub build_agent: BuildAgent,
    pub started: String,
    pub duration_millis: u64,

    /// User who caused the build, or `auto`.
    pub principal: String,

    /// Repository user the artifacts were deployed as.
    pub artifactory_principal: String,

    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_revision: Option<String>,
    pub modules: Vec<Module>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl BuildInfo {
    /// All artifacts across modules, in module order.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.modules.iter().flat_map(|m| m.artifacts.iter())
    }

    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
