//! Property keys understood by the artifact repository.
//!
//! These strings are matched verbatim downstream (property search, build
//! promotion), so they must never change.

pub const BUILD_NAME: &str = "build.name";
pub const BUILD_NUMBER: &str = "build.number";
pub const BUILD_PARENT_NAME: &str = "build.parentName";
pub const BUILD_PARENT_NUMBER: &str = "build.parentNumber";
pub const VCS_REVISION: &str = "vcs.revision";
