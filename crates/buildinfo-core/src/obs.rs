//! Structured log events for the extraction lifecycle.
//!
//! All events carry an `event` field so they can be filtered in aggregated
//! JSON logs (`buildinfo.*`).

use tracing::{error, info, warn};

/// RAII guard that enters a build-scoped span while extraction runs.
pub struct BuildSpan {
    _span: tracing::span::EnteredSpan,
}

impl BuildSpan {
    pub fn enter(build_result_key: &str) -> Self {
        let span = tracing::info_span!("buildinfo.build", build_result_key = %build_result_key);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: deploy properties computed for a build.
pub fn emit_properties_stamped(build_result_key: &str, count: usize, has_parent: bool) {
    info!(
        event = "buildinfo.properties_stamped",
        build_result_key = %build_result_key,
        count = count,
        has_parent = has_parent,
    );
}

/// Emit event: build-info record assembled.
pub fn emit_extracted(
    build_result_key: &str,
    artifacts: usize,
    properties: usize,
    duration_ms: u64,
    principal: &str,
) {
    info!(
        event = "buildinfo.extracted",
        build_result_key = %build_result_key,
        artifacts = artifacts,
        properties = properties,
        duration_ms = duration_ms,
        principal = %principal,
    );
}

/// Emit event: the upstream build's display name could not be resolved.
pub fn emit_parent_name_missing(build_key: &str) {
    error!(
        event = "buildinfo.parent_name_missing",
        build_key = %build_key,
        "Received a blank build parent name"
    );
}

/// Emit event: trigger ancestry walk stopped at the depth limit.
pub fn emit_ancestry_truncated(build_result_key: &str, depth: usize) {
    warn!(
        event = "buildinfo.ancestry_truncated",
        build_result_key = %build_result_key,
        depth = depth,
    );
}
