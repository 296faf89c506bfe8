//! Monitor response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utility::SERVER_VERSION;

/// Version of the running server.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VersionInfo {
    /// Semantic version of the server.
    pub version: String,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            version: SERVER_VERSION.to_owned(),
        }
    }
}
