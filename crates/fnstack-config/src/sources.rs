// Configuration source loading.
//
// Priority order:
// 1. Environment variables (FNSTACK_* prefix, NODE_ENV, APP_PUBLIC_KEY)
// 2. Config file path from FNSTACK_CONFIG
// 3. Inline config content from FNSTACK_CONFIG_CONTENT
// 4. Default config file (./fnstack.toml)
// 5. Built-in defaults

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::StackConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "./fnstack.toml";

/// Load configuration from the standard locations plus environment overrides.
pub fn load_config() -> Result<StackConfig> {
    let config = load_from_file()?.unwrap_or_default();
    finish(config)
}

fn load_from_file() -> Result<Option<StackConfig>> {
    if let Ok(path) = env::var("FNSTACK_CONFIG") {
        return read_file(Path::new(&path)).map(Some);
    }

    if let Ok(content) = env::var("FNSTACK_CONFIG_CONTENT") {
        let config: StackConfig = toml::from_str(&content)
            .context("Failed to parse inline config from FNSTACK_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return read_file(default_path).map(Some);
    }

    Ok(None)
}

fn read_file(path: &Path) -> Result<StackConfig> {
    debug!(path = %path.display(), "loading config file");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: StackConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Load configuration from a specific file path (for CLI --config flag).
/// Returns error if file doesn't exist or can't be parsed.
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<StackConfig> {
    let config = read_file(path.as_ref())?;
    finish(config)
}

fn finish(mut config: StackConfig) -> Result<StackConfig> {
    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    config.validate()?;
    Ok(config)
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_path_is_parsed_and_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stack]\napp = \"FromFile\"\n\n[logs]\nretention_days = 7").unwrap();

        let config = load_from_file_path(file.path()).unwrap();
        assert_eq!(config.stack.app, "FromFile");
        assert_eq!(config.logs.retention_days, 7);
    }

    #[test]
    fn invalid_file_values_fail_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logs]\nretention_days = 2").unwrap();
        assert!(load_from_file_path(file.path()).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_from_file_path("/nonexistent/fnstack.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fnstack.toml"));
    }
}
