// fnstack-config - Stack synthesis configuration
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority, FNSTACK_* plus NODE_ENV and
//    APP_PUBLIC_KEY)
// 2. Config file path from --config or FNSTACK_CONFIG
// 3. Config file contents from FNSTACK_CONFIG_CONTENT
// 4. Default config file location (./fnstack.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::Result;
use fnstack_core::{Architecture, BundlingOptions, RemovalPolicy, Runtime, Tracing};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod build_mode;
mod env_overrides;
mod sources;
mod validation;

pub use build_mode::BuildMode;
pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};

/// Main synthesis configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub stack: StackSettings,

    #[serde(default)]
    pub build_mode: BuildMode,

    #[serde(default)]
    pub functions: FunctionDefaults,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub parameters: ParameterConfig,

    #[serde(default)]
    pub logs: LogConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub layers: LayerConfig,

    #[serde(default)]
    pub aspect: AspectConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Identity of the synthesized stack
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSettings {
    pub name: String,
    pub app: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Hex Ed25519 key handed to the interaction handler as APP_PUBLIC_KEY
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            name: "example-fnstack".to_string(),
            app: "SampleApp".to_string(),
            region: "us-east-1".to_string(),
            account: None,
            description: None,
            public_key: None,
        }
    }
}

/// Baseline every function starts from before derived values and overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDefaults {
    pub architecture: Architecture,
    pub runtime: Runtime,
    pub memory_size: u32,
    pub timeout_secs: u32,
    pub handler: String,
    pub retry_attempts: u32,
    pub tracing: Tracing,
    pub environment: BTreeMap<String, String>,
    pub bundling: BundlingOptions,
    /// Files and directories whose contents key the function code asset,
    /// relative to the directory synth runs in
    pub sources: Vec<PathBuf>,
}

impl Default for FunctionDefaults {
    fn default() -> Self {
        let mut environment = BTreeMap::new();
        environment.insert("RUST_BACKTRACE".to_string(), "1".to_string());
        Self {
            architecture: Architecture::Arm64,
            runtime: Runtime::ProvidedAl2023,
            memory_size: 128,
            timeout_secs: 30,
            handler: "bootstrap".to_string(),
            retry_attempts: 0,
            tracing: Tracing::Active,
            environment,
            bundling: BundlingOptions {
                package: Some("fnstack-lambda".to_string()),
                ..Default::default()
            },
            sources: vec![
                PathBuf::from("Cargo.lock"),
                PathBuf::from("crates/fnstack-lambda"),
                PathBuf::from("crates/fnstack-handlers"),
            ],
        }
    }
}

/// Version-pinned observability layer attached to functions by default
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub account: String,
    pub layer_name: String,
    pub version: u32,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            account: "094274105915".to_string(),
            layer_name: "AWSLambdaPowertoolsTypeScript".to_string(),
            version: 18,
        }
    }
}

impl ObservabilityConfig {
    pub fn layer_arn(&self, region: &str) -> String {
        format!(
            "arn:aws:lambda:{}:{}:layer:{}:{}",
            region, self.account, self.layer_name, self.version
        )
    }
}

/// Naming convention of stored parameters and their environment keys
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterConfig {
    pub prefix: String,
    pub env_prefix: String,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        Self {
            prefix: "fn-".to_string(),
            env_prefix: "PARAM_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub retention_days: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { retention_days: 1 }
    }
}

/// Resources granted to the VPC network-interface statement
///
/// The default `*` is over-broad; it is kept as-is until a scoped policy is
/// designed, and can be narrowed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub interface_policy_resources: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface_policy_resources: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub source_dir: PathBuf,
    pub out_dir: PathBuf,
    pub compatible_runtimes: Vec<Runtime>,
    pub compatible_architectures: Vec<Architecture>,
    /// esbuild executable used by the default bundler
    pub esbuild: PathBuf,
    pub node_target: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("layers"),
            out_dir: PathBuf::from("out"),
            compatible_runtimes: vec![Runtime::Nodejs16x, Runtime::Nodejs18x],
            compatible_architectures: vec![Architecture::Arm64, Architecture::X86_64],
            esbuild: PathBuf::from("esbuild"),
            node_target: "node18".to_string(),
        }
    }
}

/// Removal policy and tags applied to every resource after construction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectConfig {
    pub removal_policy: RemovalPolicy,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cdk.out"),
        }
    }
}

impl StackConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration starting from an explicit file (CLI --config)
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Parse a TOML document on top of the defaults, without env overrides
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: StackConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Whether function binaries are built with `--release`
    pub fn release_builds(&self) -> bool {
        self.functions
            .bundling
            .release
            .unwrap_or_else(|| self.build_mode.release_builds())
    }
}
