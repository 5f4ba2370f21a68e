//! Build context and trigger reasons, as exposed by the CI server.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Custom build data key holding the build start timestamp.
pub const BUILD_TIMESTAMP_KEY: &str = "buildTimeStamp";

/// Why a build was started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerReason {
    /// A user started the build by hand. The username may be blank when the
    /// run was re-queued on behalf of an upstream build.
    Manual {
        #[serde(default)]
        username: String,
    },

    /// Another build finished and triggered this one.
    Dependency {
        /// Result key of the upstream build, e.g. `PROJ-PLAN-42`.
        triggering_build_result_key: String,
    },

    /// Cron or periodic trigger.
    Scheduled,

    /// Repository polling or a commit hook.
    CodeChange,

    /// Any trigger kind this crate does not interpret.
    Other { kind: String },
}

impl TriggerReason {
    /// Short name of the trigger kind, used in log fields.
    pub fn kind(&self) -> &str {
        match self {
            TriggerReason::Manual { .. } => "manual",
            TriggerReason::Dependency { .. } => "dependency",
            TriggerReason::Scheduled => "scheduled",
            TriggerReason::CodeChange => "code_change",
            TriggerReason::Other { kind } => kind,
        }
    }
}

/// One build execution on the CI server.
///
/// A build has at most one parent: the build it was spawned from. The parent
/// is owned, so the chain is always finite and acyclic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildContext {
    pub plan_name: String,
    pub build_number: u64,

    /// Result key, e.g. `PROJ-PLAN-JOB1-42`.
    pub build_result_key: String,

    pub trigger_reason: TriggerReason,

    /// Free-form data the server attaches to the build result.
    #[serde(default)]
    pub custom_build_data: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<BuildContext>>,
}

impl BuildContext {
    pub fn new(
        plan_name: impl Into<String>,
        build_number: u64,
        build_result_key: impl Into<String>,
        trigger_reason: TriggerReason,
    ) -> Self {
        Self {
            plan_name: plan_name.into(),
            build_number,
            build_result_key: build_result_key.into(),
            trigger_reason,
            custom_build_data: HashMap::new(),
            parent: None,
        }
    }

    /// Attach the build this one was spawned from.
    pub fn with_parent(mut self, parent: BuildContext) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Add one custom build data entry.
    pub fn with_custom_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_build_data.insert(key.into(), value.into());
        self
    }

    /// Record the build start time under [`BUILD_TIMESTAMP_KEY`].
    pub fn with_build_timestamp(self, started: DateTime<Utc>) -> Self {
        self.with_custom_data(
            BUILD_TIMESTAMP_KEY,
            started.to_rfc3339_opts(SecondsFormat::Millis, false),
        )
    }

    pub fn parent(&self) -> Option<&BuildContext> {
        self.parent.as_deref()
    }

    /// Iterate over this build followed by each of its ancestors.
    pub fn ancestry(&self) -> Ancestry<'_> {
        Ancestry { next: Some(self) }
    }

    /// Module identifier used for this build's artifacts: `<plan>:<number>`.
    pub fn module_id(&self) -> String {
        format!("{}:{}", self.plan_name, self.build_number)
    }
}

/// Borrowing iterator over a build and its ancestors.
pub struct Ancestry<'a> {
    next: Option<&'a BuildContext>,
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = &'a BuildContext;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
