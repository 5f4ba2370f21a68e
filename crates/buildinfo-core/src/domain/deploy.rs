//! Deploy details reported by the artifact upload step.

use serde::{Deserialize, Serialize};

/// One file already uploaded to the artifact repository.
///
/// Checksums are computed by the uploader; they are carried, never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DeployDetails {
    /// Local file name or path of the uploaded file.
    pub file: String,
    pub md5: String,
    pub sha1: String,

    /// Repository path the file was deployed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
}

impl DeployDetails {
    pub fn new(file: impl Into<String>, md5: impl Into<String>, sha1: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            md5: md5.into(),
            sha1: sha1.into(),
            target_path: None,
        }
    }

    pub fn with_target_path(mut self, target_path: impl Into<String>) -> Self {
        self.target_path = Some(target_path.into());
        self
    }

    /// Final path component of [`DeployDetails::file`].
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.file.as_str())
    }

    /// Lowercased text after the last `.` of the file name, or empty.
    pub fn extension(&self) -> String {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) => name[idx + 1..].to_lowercase(),
            None => String::new(),
        }
    }
}
