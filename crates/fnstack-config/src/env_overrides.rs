use crate::{BuildMode, LogFormat, StackConfig};
use anyhow::{anyhow, Context, Result};
use fnstack_core::{Architecture, RemovalPolicy, Runtime, Tracing};
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "FNSTACK_";

/// Abstraction over environment-variable lookups so tests can supply their own
/// source of overrides.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the FNSTACK_ prefix
    /// Used for conventional variables (NODE_ENV, APP_PUBLIC_KEY)
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut StackConfig, env: &E) -> Result<()> {
    // Stack identity
    if let Some(name) = get_env_string(env, "STACK_NAME")? {
        config.stack.name = name;
    }
    if let Some(app) = get_env_string(env, "APP")? {
        config.stack.app = app;
    }
    if let Some(region) = get_env_string(env, "REGION")? {
        config.stack.region = region;
    }
    if let Some(account) = get_env_string(env, "ACCOUNT")? {
        config.stack.account = Some(account);
    }
    if let Some(key) = get_raw_env_string(env, "APP_PUBLIC_KEY")? {
        config.stack.public_key = Some(key);
    }

    // FNSTACK_BUILD_MODE wins over the conventional NODE_ENV
    if let Some(mode) = get_env_string(env, "BUILD_MODE")? {
        config.build_mode = mode
            .parse::<BuildMode>()
            .context("Invalid FNSTACK_BUILD_MODE value")?;
    } else if let Some(mode) = get_raw_env_string(env, "NODE_ENV")? {
        config.build_mode = BuildMode::from_node_env(&mode);
    }

    // Function baseline
    if let Some(val) = get_env_u32(env, "MEMORY_SIZE")? {
        config.functions.memory_size = val;
    }
    if let Some(val) = get_env_u32(env, "TIMEOUT_SECS")? {
        config.functions.timeout_secs = val;
    }
    if let Some(val) = get_env_u32(env, "RETRY_ATTEMPTS")? {
        config.functions.retry_attempts = val;
    }
    if let Some(arch) = get_env_string(env, "ARCHITECTURE")? {
        config.functions.architecture = arch
            .parse::<Architecture>()
            .context("Invalid FNSTACK_ARCHITECTURE value")?;
    }
    if let Some(runtime) = get_env_string(env, "RUNTIME")? {
        config.functions.runtime = runtime
            .parse::<Runtime>()
            .context("Invalid FNSTACK_RUNTIME value")?;
    }
    if let Some(tracing) = get_env_string(env, "TRACING")? {
        config.functions.tracing = tracing
            .parse::<Tracing>()
            .context("Invalid FNSTACK_TRACING value")?;
    }
    if let Some(val) = get_env_bool(env, "RELEASE")? {
        config.functions.bundling.release = Some(val);
    }

    // Parameters and logs
    if let Some(prefix) = get_env_string(env, "PARAM_PREFIX")? {
        config.parameters.prefix = prefix;
    }
    if let Some(val) = get_env_u32(env, "LOG_RETENTION_DAYS")? {
        config.logs.retention_days = val;
    }

    // Layers
    if let Some(dir) = get_env_string(env, "LAYERS_DIR")? {
        config.layers.source_dir = PathBuf::from(dir);
    }
    if let Some(dir) = get_env_string(env, "LAYERS_OUT_DIR")? {
        config.layers.out_dir = PathBuf::from(dir);
    }
    if let Some(esbuild) = get_env_string(env, "ESBUILD")? {
        config.layers.esbuild = PathBuf::from(esbuild);
    }

    // Aspect
    if let Some(policy) = get_env_string(env, "REMOVAL_POLICY")? {
        config.aspect.removal_policy = policy
            .parse::<RemovalPolicy>()
            .context("Invalid FNSTACK_REMOVAL_POLICY value")?;
    }

    // Logging and output
    if let Some(level) = get_env_string(env, "LOG_LEVEL")? {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT")? {
        config.logging.format = match format.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };
    }
    if let Some(dir) = get_env_string(env, "OUTPUT_DIR")? {
        config.output.dir = PathBuf::from(dir);
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Result<Option<String>> {
    Ok(env.get(key).filter(|v| !v.is_empty()))
}

/// Get a raw environment variable without the FNSTACK_ prefix
fn get_raw_env_string<E: EnvSource>(env: &E, key: &str) -> Result<Option<String>> {
    Ok(env.get_raw(key).filter(|v| !v.is_empty()))
}

fn get_env_u32<E: EnvSource>(env: &E, key: &str) -> Result<Option<u32>> {
    match get_env_string(env, key)? {
        Some(val) => {
            let parsed = val
                .parse::<u32>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key)? {
        Some(val) => {
            let parsed = val.parse::<bool>().map_err(|e| {
                anyhow!(
                    "Failed to parse {}{} (expected bool): {}",
                    ENV_PREFIX,
                    key,
                    e
                )
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
