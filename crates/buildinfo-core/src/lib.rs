//! Build-info extraction for CI builds
//!
//! Turns a CI server's in-memory build context into the records an artifact
//! repository expects once a build's artifacts have been deployed:
//! - `BuildInfo`: plan identity, principal, timing, VCS revision, artifacts, properties
//! - `DeployProperties`: per-artifact properties linking a file to its build
//!
//! The CI host is reached only through the collaborator traits in [`host`];
//! everything else is synchronous, in-memory record shaping.

pub mod config;
pub mod domain;
pub mod error;
pub mod escape;
pub mod fields;
pub mod helper;
pub mod host;
pub mod obs;
pub mod patterns;
pub mod telemetry;

pub use config::ExtractorConfig;
pub use domain::{
    Artifact, BuildAgent, BuildContext, BuildInfo, BuildType, DeployDetails, DeployProperties,
    Module, TriggerReason, BUILD_TIMESTAMP_KEY,
};
pub use error::{ExtractError, Result};
pub use helper::{resolve_triggering_user, BuildInfoHelper, AUTO_PRINCIPAL, MAX_ANCESTRY_DEPTH};
pub use host::{BaseUrlResolver, BuildNameLookup, GlobalVariableSource, StaticHost};
pub use patterns::IncludeExcludePatterns;
pub use telemetry::init_tracing;

/// Crate version, also used as the default build-agent version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
