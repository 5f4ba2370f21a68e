//! Domain model: what the CI server hands us and what the repository receives.

pub mod build_info;
pub mod context;
pub mod deploy;

pub use build_info::{
    Artifact, BuildAgent, BuildInfo, BuildType, DeployProperties, Module, BUILD_INFO_VERSION,
    STARTED_FORMAT,
};
pub use context::{Ancestry, BuildContext, TriggerReason, BUILD_TIMESTAMP_KEY};
pub use deploy::DeployDetails;
