use serde::{Deserialize, Serialize};
use std::fmt;

/// A release identifier such as `1.21.4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedVersion(String);

impl SupportedVersion {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Output directory name: `1.21.4` becomes `V1_21_4`.
    pub fn normalized(&self) -> String {
        format!("V{}", self.0.replace('.', "_"))
    }

    pub fn artifact_file_name(&self) -> String {
        format!("{}.jar", self.0)
    }
}

impl fmt::Display for SupportedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SupportedVersion {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
