// Function properties and their layered merge
//
// A function's final properties are built from three layers: the config
// baseline, values derived while building (parameter env vars, the
// observability layer) and the caller's overrides. `overlay` is the single
// place the per-field strategy lives:
//
//   environment, bundling  merged key by key, upper wins
//   layers                 appended, lower first
//   everything else        replaced by the upper layer when set

use fnstack_config::FunctionDefaults;
use fnstack_core::{Architecture, BundlingOptions, Runtime, Tracing};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Subnets and security groups a function is attached to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcPlacement {
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
}

impl VpcPlacement {
    pub fn render(&self) -> Value {
        serde_json::json!({
            "SubnetIds": self.subnet_ids,
            "SecurityGroupIds": self.security_group_ids,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionProps {
    pub description: Option<String>,
    pub function_name: Option<String>,
    pub vpc: Option<VpcPlacement>,
    /// Values are strings or intrinsics (parameter references)
    pub environment: Option<BTreeMap<String, Value>>,
    pub memory_size: Option<u32>,
    pub timeout_secs: Option<u32>,
    /// Layer version ARNs or references
    pub layers: Option<Vec<Value>>,
    pub tracing: Option<Tracing>,
    pub bundling: Option<BundlingOptions>,
    pub architecture: Option<Architecture>,
    pub runtime: Option<Runtime>,
    pub handler: Option<String>,
    pub retry_attempts: Option<u32>,
    /// Caller-supplied execution role; never used, every function gets its own
    pub role: Option<String>,
}

impl FunctionProps {
    /// Baseline layer taken from config
    pub fn baseline(defaults: &FunctionDefaults) -> Self {
        Self {
            environment: Some(
                defaults
                    .environment
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            memory_size: Some(defaults.memory_size),
            timeout_secs: Some(defaults.timeout_secs),
            layers: Some(Vec::new()),
            tracing: Some(defaults.tracing),
            bundling: Some(defaults.bundling.clone()),
            architecture: Some(defaults.architecture),
            runtime: Some(defaults.runtime),
            handler: Some(defaults.handler.clone()),
            retry_attempts: Some(defaults.retry_attempts),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    pub fn vpc(mut self, placement: VpcPlacement) -> Self {
        self.vpc = Some(placement);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.environment
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn layer(mut self, arn: impl Into<Value>) -> Self {
        self.layers.get_or_insert_with(Vec::new).push(arn.into());
        self
    }

    pub fn tracing(mut self, tracing: Tracing) -> Self {
        self.tracing = Some(tracing);
        self
    }

    pub fn memory_size(mut self, memory_size: u32) -> Self {
        self.memory_size = Some(memory_size);
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn bundling(mut self, bundling: BundlingOptions) -> Self {
        self.bundling = Some(bundling);
        self
    }

    pub fn architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }

    pub fn retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = Some(retry_attempts);
        self
    }

    /// Merge `upper` on top of `self`
    pub fn overlay(self, upper: FunctionProps) -> FunctionProps {
        FunctionProps {
            description: upper.description.or(self.description),
            function_name: upper.function_name.or(self.function_name),
            vpc: upper.vpc.or(self.vpc),
            environment: merge_maps(self.environment, upper.environment),
            memory_size: upper.memory_size.or(self.memory_size),
            timeout_secs: upper.timeout_secs.or(self.timeout_secs),
            layers: append(self.layers, upper.layers),
            tracing: upper.tracing.or(self.tracing),
            bundling: match (self.bundling, upper.bundling) {
                (Some(lower), Some(upper)) => Some(lower.overlay(upper)),
                (lower, upper) => upper.or(lower),
            },
            architecture: upper.architecture.or(self.architecture),
            runtime: upper.runtime.or(self.runtime),
            handler: upper.handler.or(self.handler),
            retry_attempts: upper.retry_attempts.or(self.retry_attempts),
            role: upper.role.or(self.role),
        }
    }
}

fn merge_maps(
    lower: Option<BTreeMap<String, Value>>,
    upper: Option<BTreeMap<String, Value>>,
) -> Option<BTreeMap<String, Value>> {
    match (lower, upper) {
        (Some(mut lower), Some(upper)) => {
            lower.extend(upper);
            Some(lower)
        }
        (lower, upper) => upper.or(lower),
    }
}

fn append(lower: Option<Vec<Value>>, upper: Option<Vec<Value>>) -> Option<Vec<Value>> {
    match (lower, upper) {
        (Some(mut lower), Some(upper)) => {
            lower.extend(upper);
            Some(lower)
        }
        (lower, upper) => upper.or(lower),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_are_replaced_by_upper_layer() {
        let lower = FunctionProps::default().memory_size(128).timeout_secs(30);
        let merged = lower.overlay(FunctionProps::default().memory_size(512));
        assert_eq!(merged.memory_size, Some(512));
        assert_eq!(merged.timeout_secs, Some(30));
    }

    #[test]
    fn environment_merges_key_by_key() {
        let lower = FunctionProps::default().env("A", "1").env("B", "1");
        let merged = lower.overlay(FunctionProps::default().env("B", "2").env("C", "3"));
        let env = merged.environment.unwrap();
        assert_eq!(env["A"], json!("1"));
        assert_eq!(env["B"], json!("2"));
        assert_eq!(env["C"], json!("3"));
    }

    #[test]
    fn layers_append_in_order() {
        let lower = FunctionProps::default().layer("arn:base");
        let merged = lower
            .overlay(FunctionProps::default())
            .overlay(FunctionProps::default().layer("arn:caller"));
        assert_eq!(
            merged.layers.unwrap(),
            vec![json!("arn:base"), json!("arn:caller")]
        );
    }

    #[test]
    fn bundling_merges_key_by_key() {
        let lower = FunctionProps::default().bundling(BundlingOptions {
            package: Some("fnstack-lambda".into()),
            release: Some(true),
            ..Default::default()
        });
        let merged = lower.overlay(FunctionProps::default().bundling(BundlingOptions {
            features: Some(vec!["extra".into()]),
            release: Some(false),
            ..Default::default()
        }));
        let bundling = merged.bundling.unwrap();
        assert_eq!(bundling.package.as_deref(), Some("fnstack-lambda"));
        assert_eq!(bundling.release, Some(false));
        assert_eq!(bundling.features, Some(vec!["extra".to_string()]));
    }

    #[test]
    fn baseline_copies_config_defaults() {
        let props = FunctionProps::baseline(&FunctionDefaults::default());
        assert_eq!(props.memory_size, Some(128));
        assert_eq!(props.runtime, Some(Runtime::ProvidedAl2023));
        assert_eq!(props.layers, Some(Vec::new()));
        assert_eq!(props.environment.unwrap()["RUST_BACKTRACE"], json!("1"));
    }
}
