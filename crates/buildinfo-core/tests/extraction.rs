//! End-to-end extraction against a static host.

use buildinfo_core::fields::{
    BUILD_NAME, BUILD_NUMBER, BUILD_PARENT_NAME, BUILD_PARENT_NUMBER, VCS_REVISION,
};
use buildinfo_core::{
    resolve_triggering_user, BuildContext, BuildInfoHelper, BuildType, DeployDetails,
    ExtractorConfig, IncludeExcludePatterns, StaticHost, TriggerReason, AUTO_PRINCIPAL,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

fn started_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap()
}

fn manual(user: &str) -> TriggerReason {
    TriggerReason::Manual {
        username: user.to_string(),
    }
}

fn context(trigger: TriggerReason) -> BuildContext {
    BuildContext::new("Widget - Release", 42, "WID-REL-JOB1-42", trigger)
        .with_build_timestamp(started_at())
}

fn deployed() -> Vec<DeployDetails> {
    vec![
        DeployDetails::new("target/widget-1.4.0.jar", "md5-jar", "sha1-jar")
            .with_target_path("libs-release/widget/1.4.0/widget-1.4.0.jar"),
        DeployDetails::new("target/widget-1.4.0.POM", "md5-pom", "sha1-pom"),
        DeployDetails::new("LICENSE", "md5-lic", "sha1-lic"),
    ]
}

fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn helper_with(
    base_url: &str,
    env_vars: BTreeMap<String, String>,
    vcs_revision: Option<&str>,
) -> BuildInfoHelper<StaticHost> {
    let host = StaticHost::new(base_url)
        .with_global_variable("a", "1")
        .with_global_variable("b", "2")
        .with_build_name("UP-PLAN", "Upstream - Plan");
    BuildInfoHelper::new(
        env_vars,
        vcs_revision.map(str::to_string),
        host,
        ExtractorConfig::default(),
    )
}

// ── extract_build_info ────────────────────────────────────────────────────

#[test]
fn extract_populates_record() {
    let helper = helper_with("https://ci.example.com", BTreeMap::new(), Some("9f2c1e"));
    let now = started_at() + Duration::seconds(75);
    let info = helper
        .extract_build_info_at(&context(manual("alice")), &deployed(), "deployer", now)
        .expect("extract");

    assert_eq!(info.name, "Widget - Release");
    assert_eq!(info.number, "42");
    assert_eq!(info.build_type, BuildType::Generic);
    assert_eq!(info.build_agent.name, "Bamboo");
    assert_eq!(info.principal, "alice");
    assert_eq!(info.artifactory_principal, "deployer");
    assert_eq!(info.duration_millis, 75_000);
    assert_eq!(info.started, "2024-05-14T09:31:15.000+0000");
    assert_eq!(info.url, "https://ci.example.com/browse/WID-REL-JOB1-42");
    assert_eq!(info.vcs_revision.as_deref(), Some("9f2c1e"));

    assert_eq!(info.modules.len(), 1);
    assert_eq!(info.modules[0].id, "Widget - Release:42");
}

#[test]
fn artifacts_match_deploy_details() {
    let helper = helper_with("http://ci", BTreeMap::new(), None);
    let details = deployed();
    let info = helper
        .extract_build_info(&context(manual("alice")), &details, "deployer")
        .expect("extract");

    let artifacts: Vec<_> = info.artifacts().collect();
    assert_eq!(artifacts.len(), details.len());

    assert_eq!(artifacts[0].name, "widget-1.4.0.jar");
    assert_eq!(artifacts[0].artifact_type, "jar");
    assert_eq!(artifacts[0].md5, "md5-jar");
    assert_eq!(artifacts[0].sha1, "sha1-jar");

    assert_eq!(artifacts[1].artifact_type, "pom");
    assert_eq!(artifacts[2].name, "LICENSE");
    assert_eq!(artifacts[2].artifact_type, "");
}

#[test]
fn empty_deploy_details_yield_empty_module() {
    let helper = helper_with("http://ci", BTreeMap::new(), None);
    let info = helper
        .extract_build_info(&context(manual("alice")), &[], "deployer")
        .expect("extract");
    assert_eq!(info.modules.len(), 1);
    assert!(info.modules[0].artifacts.is_empty());
}

#[test]
fn url_has_single_slash_with_or_without_trailing_slash() {
    let ctx = context(manual("alice"));
    for base in ["http://ci.example.com:8085", "http://ci.example.com:8085/"] {
        let info = helper_with(base, BTreeMap::new(), None)
            .extract_build_info(&ctx, &[], "deployer")
            .expect("extract");
        assert_eq!(
            info.url,
            "http://ci.example.com:8085/browse/WID-REL-JOB1-42",
            "base {}",
            base
        );
        assert!(!info.url.contains("8085//"));
    }
}

#[test]
fn blank_vcs_revision_is_omitted() {
    let helper = helper_with("http://ci", BTreeMap::new(), Some(""));
    let info = helper
        .extract_build_info(&context(manual("alice")), &[], "deployer")
        .expect("extract");
    assert!(info.vcs_revision.is_none());

    let json: Value = serde_json::to_value(&info).expect("to_value");
    assert!(json.get("vcsRevision").is_none());
}

#[test]
fn missing_build_timestamp_is_an_error() {
    let helper = helper_with("http://ci", BTreeMap::new(), None);
    let ctx = BuildContext::new("Widget", 1, "WID-REL-1", manual("alice"));
    let err = helper
        .extract_build_info(&ctx, &[], "deployer")
        .unwrap_err();
    assert!(err.to_string().contains("buildTimeStamp"));
}

// ── principal resolution ──────────────────────────────────────────────────

#[test]
fn principal_found_at_root_of_manual_chain() {
    let mut ctx = BuildContext::new("root", 1, "A-ROOT-1", manual("root-user"));
    for n in 2..=6 {
        ctx = BuildContext::new(format!("child{}", n), n, format!("A-C{}-{}", n, n), manual(""))
            .with_parent(ctx);
    }
    assert_eq!(resolve_triggering_user(&ctx).as_deref(), Some("root-user"));
}

#[test]
fn principal_blank_everywhere_becomes_auto() {
    let root = BuildContext::new("root", 1, "A-ROOT-1", manual("  "));
    let ctx = context(manual("")).with_parent(root);
    assert!(resolve_triggering_user(&ctx).is_none());

    let info = helper_with("http://ci", BTreeMap::new(), None)
        .extract_build_info(&ctx, &[], "deployer")
        .expect("extract");
    assert_eq!(info.principal, AUTO_PRINCIPAL);
}

#[test]
fn non_manual_trigger_never_contributes_principal() {
    let root = BuildContext::new("root", 1, "A-ROOT-1", manual("alice"));
    let scheduled = context(TriggerReason::Scheduled).with_parent(root.clone());
    assert!(resolve_triggering_user(&scheduled).is_none());

    // the walk stops at the first non-manual hop
    let mid = BuildContext::new("mid", 2, "A-MID-2", TriggerReason::CodeChange).with_parent(root);
    let leaf = context(manual("")).with_parent(mid);
    assert!(resolve_triggering_user(&leaf).is_none());
}

#[test]
fn nearest_manual_user_wins() {
    let root = BuildContext::new("root", 1, "A-ROOT-1", manual("root-user"));
    let mid = BuildContext::new("mid", 2, "A-MID-2", manual("mid-user")).with_parent(root);
    let leaf = context(manual("")).with_parent(mid);
    assert_eq!(resolve_triggering_user(&leaf).as_deref(), Some("mid-user"));
}

#[test]
fn very_deep_chain_is_bounded() {
    let mut ctx = BuildContext::new("root", 0, "A-ROOT-0", manual("root-user"));
    for n in 1..200u64 {
        ctx = BuildContext::new("c", n, format!("A-C-{}", n), manual("")).with_parent(ctx);
    }
    assert!(resolve_triggering_user(&ctx).is_none());
}

// ── add_common_properties ─────────────────────────────────────────────────

#[test]
fn common_properties_for_manual_build() {
    let helper = helper_with("http://ci", BTreeMap::new(), Some("9f2c1e"));
    let props = helper.add_common_properties(&context(manual("alice")));

    assert_eq!(props.len(), 3);
    assert_eq!(props[BUILD_NAME], "Widget - Release");
    assert_eq!(props[BUILD_NUMBER], "42");
    assert_eq!(props[VCS_REVISION], "9f2c1e");
}

#[test]
fn common_properties_without_vcs_revision() {
    let helper = helper_with("http://ci", BTreeMap::new(), None);
    let props = helper.add_common_properties(&context(manual("alice")));
    assert_eq!(props.len(), 2);
    assert!(!props.contains_key(VCS_REVISION));
}

#[test]
fn dependency_trigger_with_three_segments_adds_parent() {
    let helper = helper_with("http://ci", BTreeMap::new(), None);
    let ctx = context(TriggerReason::Dependency {
        triggering_build_result_key: "UP-PLAN-17".to_string(),
    });
    let props = helper.add_common_properties(&ctx);

    assert_eq!(props[BUILD_PARENT_NAME], "Upstream - Plan");
    assert_eq!(props[BUILD_PARENT_NUMBER], "17");
}

#[test]
fn dependency_trigger_with_two_segments_adds_nothing() {
    let helper = helper_with("http://ci", BTreeMap::new(), None);
    let ctx = context(TriggerReason::Dependency {
        triggering_build_result_key: "PLAN-42".to_string(),
    });
    let props = helper.add_common_properties(&ctx);

    assert!(!props.contains_key(BUILD_PARENT_NAME));
    assert!(!props.contains_key(BUILD_PARENT_NUMBER));
}

#[test]
fn unknown_parent_name_degrades_to_blank() {
    let helper = helper_with("http://ci", BTreeMap::new(), None);
    let ctx = context(TriggerReason::Dependency {
        triggering_build_result_key: "GONE-PLAN-3".to_string(),
    });
    let props = helper.add_common_properties(&ctx);

    assert_eq!(props[BUILD_PARENT_NAME], "");
    assert_eq!(props[BUILD_PARENT_NUMBER], "3");
}

// ── properties ────────────────────────────────────────────────────────────

#[test]
fn environment_overrides_global_variables() {
    let helper = helper_with("http://ci", env(&[("b", "3"), ("c", "4")]), None);
    let info = helper
        .extract_build_info(&context(manual("alice")), &[], "deployer")
        .expect("extract");

    let expected = env(&[("a", "1"), ("b", "3"), ("c", "4")]);
    assert_eq!(info.properties, expected);
}

#[test]
fn property_values_are_escaped_after_merge() {
    let helper = helper_with(
        "http://ci",
        env(&[
            ("b", "3"),
            ("c", "4"),
            ("JAVA_HOME", r"C:\jdk17"),
            ("GREETING", "line1\nline2"),
            ("CITY", "Zürich"),
        ]),
        None,
    );
    let info = helper
        .extract_build_info(&context(manual("alice")), &[], "deployer")
        .expect("extract");

    let expected = env(&[
        ("a", "1"),
        ("b", "3"),
        ("c", "4"),
        ("JAVA_HOME", r"C:\\jdk17"),
        ("GREETING", "line1\\nline2"),
        ("CITY", "Z\\u00FCrich"),
    ]);
    assert_eq!(info.properties, expected);
}

#[test]
fn default_config_publishes_every_environment_variable() {
    let helper = BuildInfoHelper::new(
        env(&[
            ("bamboo_planKey", "WID-REL"),
            ("MONKEY", "banana"),
            ("HOME", "/home/ci"),
            ("DEPLOY_PASSWORD", "hunter2"),
        ]),
        None,
        StaticHost::new("http://ci").with_global_variable("bamboo_buildResultKey", "WID-REL-42"),
        ExtractorConfig::default(),
    );
    let info = helper
        .extract_build_info(&context(manual("alice")), &[], "deployer")
        .expect("extract");

    assert_eq!(
        info.properties,
        env(&[
            ("bamboo_buildResultKey", "WID-REL-42"),
            ("bamboo_planKey", "WID-REL"),
            ("DEPLOY_PASSWORD", "hunter2"),
            ("HOME", "/home/ci"),
            ("MONKEY", "banana"),
        ])
    );
}

#[test]
fn global_patterns_restrict_only_global_variables() {
    let mut config = ExtractorConfig::default();
    config.global_patterns = IncludeExcludePatterns {
        include: vec!["bamboo_*".to_string()],
        exclude: vec![],
    };
    let helper = BuildInfoHelper::new(
        env(&[("bamboo_planKey", "WID-REL"), ("HOME", "/home/ci")]),
        None,
        StaticHost::new("http://ci")
            .with_global_variable("bamboo_region", "eu")
            .with_global_variable("proxy", "squid:3128"),
        config,
    );
    let info = helper
        .extract_build_info(&context(manual("alice")), &[], "deployer")
        .expect("extract");

    assert_eq!(
        info.properties,
        env(&[
            ("bamboo_planKey", "WID-REL"),
            ("bamboo_region", "eu"),
            ("HOME", "/home/ci"),
        ])
    );
}

// ── idempotence ───────────────────────────────────────────────────────────

#[test]
fn repeated_extraction_is_stable_apart_from_time() {
    let helper = helper_with("http://ci", env(&[("c", "4")]), Some("9f2c1e"));
    let ctx = context(manual("alice"));
    let details = deployed();

    let first = helper
        .extract_build_info_at(&ctx, &details, "deployer", started_at() + Duration::seconds(1))
        .expect("first");
    let second = helper
        .extract_build_info_at(&ctx, &details, "deployer", started_at() + Duration::seconds(9))
        .expect("second");

    assert_eq!(first.modules, second.modules);
    assert_eq!(first.properties, second.properties);
    assert_eq!(first.principal, second.principal);
    assert_ne!(first.duration_millis, second.duration_millis);
}

#[test]
fn config_driven_helper_serializes_to_repository_json() {
    let config = ExtractorConfig::from_toml_str(
        r#"
        base_url = "https://ci.example.com/"
        agent_version = "9.2.1 build 90211"

        [global_variables]
        region = "eu-west-1"
        "#,
    )
    .expect("config");
    let helper = BuildInfoHelper::from_config(BTreeMap::new(), None, config);
    let info = helper
        .extract_build_info(&context(manual("alice")), &deployed(), "deployer")
        .expect("extract");

    let json: Value = serde_json::from_str(&info.to_json_pretty().expect("json")).expect("parse");
    assert_eq!(json["buildAgent"]["version"], "9.2.1 build 90211");
    assert_eq!(json["properties"]["region"], "eu-west-1");
    assert_eq!(json["modules"][0]["artifacts"].as_array().map(Vec::len), Some(3));
}
