use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Build mode selected by FNSTACK_BUILD_MODE, falling back to NODE_ENV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }

    pub fn release_builds(&self) -> bool {
        matches!(self, BuildMode::Production)
    }

    /// Only `NODE_ENV=production` selects release builds; any other value
    /// (`test`, `staging`, ...) is a development build
    pub fn from_node_env(value: &str) -> Self {
        if value == "production" {
            BuildMode::Production
        } else {
            BuildMode::Development
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" | "release" => Ok(BuildMode::Production),
            other => bail!(
                "Unsupported build mode '{}'. Supported: development, production",
                other
            ),
        }
    }
}
