// Configuration validation
//
// Rejects values the deployment target would refuse at deploy time

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

/// Retention periods accepted by CloudWatch Logs
pub const LOG_RETENTION_DAYS: &[u32] = &[
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];

pub fn validate_config(config: &StackConfig) -> Result<()> {
    validate_stack_settings(&config.stack)?;
    validate_function_defaults(&config.functions)?;
    validate_parameter_config(&config.parameters)?;

    if !LOG_RETENTION_DAYS.contains(&config.logs.retention_days) {
        bail!(
            "logs.retention_days must be one of {:?}, got {}",
            LOG_RETENTION_DAYS,
            config.logs.retention_days
        );
    }

    validate_layer_config(&config.layers)?;

    if config.network.interface_policy_resources.is_empty() {
        bail!("network.interface_policy_resources must not be empty");
    }
    if config
        .network
        .interface_policy_resources
        .iter()
        .any(|r| r == "*")
    {
        warn!("network.interface_policy_resources grants ec2 interface actions on all resources");
    }

    Ok(())
}

fn validate_stack_settings(stack: &StackSettings) -> Result<()> {
    if stack.name.trim().is_empty() {
        bail!("stack.name must not be empty");
    }
    if stack.app.trim().is_empty() {
        bail!("stack.app must not be empty");
    }
    if stack.region.trim().is_empty() {
        bail!("stack.region must not be empty");
    }
    Ok(())
}

fn validate_function_defaults(functions: &FunctionDefaults) -> Result<()> {
    if !(128..=10_240).contains(&functions.memory_size) {
        bail!(
            "functions.memory_size must be between 128 and 10240 MB, got {}",
            functions.memory_size
        );
    }
    if !(1..=900).contains(&functions.timeout_secs) {
        bail!(
            "functions.timeout_secs must be between 1 and 900, got {}",
            functions.timeout_secs
        );
    }
    if functions.retry_attempts > 2 {
        bail!(
            "functions.retry_attempts must be 0, 1 or 2, got {}",
            functions.retry_attempts
        );
    }
    if functions.handler.trim().is_empty() {
        bail!("functions.handler must not be empty");
    }
    if functions.runtime.is_custom() && functions.handler != "bootstrap" {
        warn!(
            handler = %functions.handler,
            "custom runtimes ignore the handler name; expected 'bootstrap'"
        );
    }
    Ok(())
}

fn validate_parameter_config(parameters: &ParameterConfig) -> Result<()> {
    if parameters.env_prefix.trim().is_empty() {
        bail!("parameters.env_prefix must not be empty");
    }
    Ok(())
}

fn validate_layer_config(layers: &LayerConfig) -> Result<()> {
    if layers.compatible_runtimes.is_empty() {
        bail!("layers.compatible_runtimes must not be empty");
    }
    if let Some(runtime) = layers.compatible_runtimes.iter().find(|r| r.is_custom()) {
        bail!(
            "layers.compatible_runtimes must be Node runtimes, got {}",
            runtime.as_str()
        );
    }
    Ok(())
}
