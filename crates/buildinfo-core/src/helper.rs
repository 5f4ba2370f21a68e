//! Build-info extraction.
//!
//! [`BuildInfoHelper`] is created once per build with the environment that
//! was visible to the build and its VCS revision. It then answers two
//! questions after the artifacts have been deployed:
//! - which properties should be attached to each deployed file
//!   ([`BuildInfoHelper::add_common_properties`])
//! - what the build-info record looks like ([`BuildInfoHelper::extract_build_info`])

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::config::ExtractorConfig;
use crate::domain::{
    Artifact, BuildContext, BuildInfo, BuildType, DeployDetails, DeployProperties, Module,
    TriggerReason, BUILD_INFO_VERSION, BUILD_TIMESTAMP_KEY, STARTED_FORMAT,
};
use crate::error::{ExtractError, Result};
use crate::escape::{escape_property_values, form_url_encode, join_url};
use crate::fields;
use crate::host::{BaseUrlResolver, BuildNameLookup, GlobalVariableSource, StaticHost};
use crate::obs;

/// Principal recorded when no user can be found in the trigger chain.
pub const AUTO_PRINCIPAL: &str = "auto";

/// Maximum number of builds inspected when walking trigger ancestry.
pub const MAX_ANCESTRY_DEPTH: usize = 64;

fn non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Assembles deploy properties and build-info records for one build.
pub struct BuildInfoHelper<H> {
    env: BTreeMap<String, String>,
    vcs_revision: Option<String>,
    host: H,
    config: ExtractorConfig,
}

impl BuildInfoHelper<StaticHost> {
    /// Helper whose host data comes entirely from `config`.
    pub fn from_config(
        env: BTreeMap<String, String>,
        vcs_revision: Option<String>,
        config: ExtractorConfig,
    ) -> Self {
        let host = StaticHost::from_config(&config);
        Self::new(env, vcs_revision, host, config)
    }
}

impl<H> BuildInfoHelper<H>
where
    H: BaseUrlResolver + GlobalVariableSource + BuildNameLookup,
{
    /// A blank `vcs_revision` is treated as absent.
    pub fn new(
        env: BTreeMap<String, String>,
        vcs_revision: Option<String>,
        host: H,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            env,
            vcs_revision: vcs_revision.filter(|r| non_blank(r)),
            host,
            config,
        }
    }

    pub fn vcs_revision(&self) -> Option<&str> {
        self.vcs_revision.as_deref()
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Properties linking a deployed file to `context`.
    ///
    /// Always contains the build name and number; the VCS revision and the
    /// parent build are added when known.
    pub fn add_common_properties(&self, context: &BuildContext) -> DeployProperties {
        let mut props = DeployProperties::new();
        props.insert(fields::BUILD_NAME.to_string(), context.plan_name.clone());
        props.insert(
            fields::BUILD_NUMBER.to_string(),
            context.build_number.to_string(),
        );
        if let Some(revision) = &self.vcs_revision {
            props.insert(fields::VCS_REVISION.to_string(), revision.clone());
        }

        let parent = self.build_parent_properties(&context.trigger_reason);
        let has_parent = !parent.is_empty();
        props.extend(parent);

        obs::emit_properties_stamped(&context.build_result_key, props.len(), has_parent);
        props
    }

    /// Assemble the build-info record for `context`, timed against the current instant.
    pub fn extract_build_info(
        &self,
        context: &BuildContext,
        details: &[DeployDetails],
        username: &str,
    ) -> Result<BuildInfo> {
        self.extract_build_info_at(context, details, username, Utc::now())
    }

    /// Same as [`extract_build_info`](Self::extract_build_info) with an explicit `now`.
    ///
    /// `started` is `now` and the duration runs from the build's recorded
    /// start timestamp to `now`, not to a canonical build end.
    pub fn extract_build_info_at(
        &self,
        context: &BuildContext,
        details: &[DeployDetails],
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<BuildInfo> {
        let _span = obs::BuildSpan::enter(&context.build_result_key);

        let url = self.build_url(context);
        let duration_millis = build_duration_millis(context, now)?;

        let module = Module {
            id: context.module_id(),
            artifacts: convert_deploy_details(details),
        };

        let principal = resolve_triggering_user(context)
            .unwrap_or_else(|| AUTO_PRINCIPAL.to_string());

        let properties = self.build_properties();

        obs::emit_extracted(
            &context.build_result_key,
            module.artifacts.len(),
            properties.len(),
            duration_millis,
            &principal,
        );

        Ok(BuildInfo {
            version: BUILD_INFO_VERSION.to_string(),
            name: context.plan_name.clone(),
            number: context.build_number.to_string(),
            build_type: BuildType::Generic,
            build_agent: self.config.build_agent(),
            started: now.format(STARTED_FORMAT).to_string(),
            duration_millis,
            principal,
            artifactory_principal: username.to_string(),
            url,
            vcs_revision: self.vcs_revision.clone(),
            modules: vec![module],
            properties,
        })
    }

    /// `<base>/browse/<escaped result key>` with a single slash after the base.
    fn build_url(&self, context: &BuildContext) -> String {
        let path = format!("browse/{}", form_url_encode(&context.build_result_key));
        join_url(&self.host.base_url(), &path)
    }

    /// Global variables overlaid by the environment, then escaped.
    ///
    /// Only the globals pass through `global_patterns`; environment entries
    /// always win and are never dropped.
    fn build_properties(&self) -> BTreeMap<String, String> {
        let mut props = self
            .config
            .global_patterns
            .filter(self.host.global_variables());
        if self.config.include_env_vars {
            props.extend(self.env.clone());
        }
        escape_property_values(props)
    }

    fn build_parent_properties(&self, trigger: &TriggerReason) -> DeployProperties {
        let mut props = DeployProperties::new();

        let TriggerReason::Dependency {
            triggering_build_result_key,
        } = trigger
        else {
            return props;
        };
        let Some((build_key, build_number)) = split_result_key(triggering_build_result_key) else {
            return props;
        };

        let parent_name = self.host.build_name(build_key).unwrap_or_default();
        if !non_blank(&parent_name) {
            obs::emit_parent_name_missing(build_key);
        }
        props.insert(fields::BUILD_PARENT_NAME.to_string(), parent_name);
        props.insert(
            fields::BUILD_PARENT_NUMBER.to_string(),
            build_number.to_string(),
        );
        props
    }
}

/// Username of the person who started `context` or, for builds re-queued
/// without a user, of the nearest manually started ancestor.
///
/// Only manual triggers contribute a name; any other trigger kind ends the
/// walk with `None`.
pub fn resolve_triggering_user(context: &BuildContext) -> Option<String> {
    for (depth, build) in context.ancestry().enumerate() {
        if depth >= MAX_ANCESTRY_DEPTH {
            obs::emit_ancestry_truncated(&context.build_result_key, depth);
            return None;
        }
        match &build.trigger_reason {
            TriggerReason::Manual { username } if non_blank(username) => {
                return Some(username.clone())
            }
            TriggerReason::Manual { .. } => continue,
            _ => return None,
        }
    }
    None
}

fn convert_deploy_details(details: &[DeployDetails]) -> Vec<Artifact> {
    details.iter().map(Artifact::from).collect()
}

/// Milliseconds from the recorded build start to `now`, clamped at zero.
fn build_duration_millis(context: &BuildContext, now: DateTime<Utc>) -> Result<u64> {
    let raw = context
        .custom_build_data
        .get(BUILD_TIMESTAMP_KEY)
        .ok_or_else(|| ExtractError::MissingBuildTimestamp {
            build_result_key: context.build_result_key.clone(),
            key: BUILD_TIMESTAMP_KEY.to_string(),
        })?;
    let started = DateTime::parse_from_rfc3339(raw.trim()).map_err(|source| {
        ExtractError::InvalidBuildTimestamp {
            value: raw.clone(),
            source,
        }
    })?;
    let elapsed = now.signed_duration_since(started.with_timezone(&Utc));
    Ok(u64::try_from(elapsed.num_milliseconds()).unwrap_or(0))
}

/// Split a three-segment result key (`PROJ-PLAN-42`) into build key and number.
///
/// Empty segments between consecutive dashes are not counted.
fn split_result_key(result_key: &str) -> Option<(&str, &str)> {
    if !non_blank(result_key) {
        return None;
    }
    if result_key.split('-').filter(|s| !s.is_empty()).count() != 3 {
        return None;
    }
    let idx = result_key.rfind('-')?;
    Some((&result_key[..idx], &result_key[idx + 1..]))
}
