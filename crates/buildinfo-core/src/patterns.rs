//! Include/exclude wildcard filtering for server-wide variables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wildcard patterns deciding which global variables end up in build info.
///
/// The default keeps every name. A name is kept when it matches at least one include pattern and no
/// exclude pattern. Matching is case-insensitive; `*` matches any run of
/// characters and `?` exactly one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncludeExcludePatterns {
    #[serde(default = "default_includes")]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_includes() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for IncludeExcludePatterns {
    fn default() -> Self {
        Self {
            include: default_includes(),
            exclude: Vec::new(),
        }
    }
}

impl IncludeExcludePatterns {
    pub fn is_included(&self, name: &str) -> bool {
        self.include.iter().any(|p| wildcard_match(p, name))
            && !self.exclude.iter().any(|p| wildcard_match(p, name))
    }

    /// Drop entries whose key is not included.
    pub fn filter(&self, vars: BTreeMap<String, String>) -> BTreeMap<String, String> {
        vars.into_iter()
            .filter(|(k, _)| self.is_included(k))
            .collect()
    }
}

/// Case-insensitive wildcard match with backtracking over the last `*`.
fn wildcard_match(pattern: &str, value: &str) -> bool {
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let v: Vec<char> = value.to_lowercase().chars().collect();

    let mut pi = 0usize;
    let mut vi = 0usize;
    let mut last_star: Option<usize> = None;
    let mut last_match_vi = 0usize;

    while vi < v.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == v[vi]) {
            pi += 1;
            vi += 1;
            continue;
        }

        if pi < p.len() && p[pi] == '*' {
            last_star = Some(pi);
            pi += 1;
            last_match_vi = vi;
            continue;
        }

        if let Some(star_idx) = last_star {
            last_match_vi += 1;
            vi = last_match_vi;
            pi = star_idx + 1;
            continue;
        }

        return false;
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }

    pi == p.len()
}
