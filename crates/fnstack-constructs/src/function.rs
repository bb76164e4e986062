// Function builder
//
// Every function gets a dedicated execution role, an explicit log group
// (so no log-retention helper role is needed), read grants for its stored
// parameters and, unless disabled, the version-pinned observability layer.
// The role always carries the log-write statement; tracing and VPC
// statements are added when the merged properties call for them.

use crate::parameter::ParameterBinding;
use crate::props::FunctionProps;
use crate::Result;
use fnstack_config::StackConfig;
use fnstack_core::iam::service_trust_policy;
use fnstack_core::intrinsic::{get_att, reference, suffixed};
use fnstack_core::{
    logical_id, Asset, BundlingOptions, CfnResource, ConstructNode, CoreError, PolicyDocument,
    PolicyStatement, RemovalPolicy, Stack, TemplateParameter, Tracing,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub const LAMBDA_SERVICE: &str = "lambda.amazonaws.com";

pub const LOG_WRITE_ACTIONS: [&str; 2] = ["logs:CreateLogStream", "logs:PutLogEvents"];

pub const NETWORK_INTERFACE_ACTIONS: [&str; 5] = [
    "ec2:CreateNetworkInterface",
    "ec2:DescribeNetworkInterfaces",
    "ec2:DeleteNetworkInterface",
    "ec2:AssignPrivateIpAddresses",
    "ec2:UnassignPrivateIpAddresses",
];

pub const TRACING_ACTIONS: [&str; 12] = [
    "logs:CreateLogDelivery",
    "logs:DeleteLogDelivery",
    "logs:DescribeLogGroups",
    "logs:DescribeResourcePolicies",
    "logs:GetLogDelivery",
    "logs:ListLogDeliveries",
    "logs:PutResourcePolicy",
    "logs:UpdateLogDelivery",
    "xray:GetSamplingRules",
    "xray:GetSamplingTargets",
    "xray:PutTelemetryRecords",
    "xray:PutTraceSegments",
];

/// What the caller asks for when adding a function
#[derive(Debug, Clone, Default)]
pub struct FunctionSpec {
    /// Attached to the execution role verbatim, in order
    pub statements: Vec<PolicyStatement>,
    /// Parameter names, resolved under the configured prefix
    pub parameters: Vec<String>,
    /// `None` and `Some(true)` both attach the observability layer
    pub observability: Option<bool>,
    pub props: FunctionProps,
}

impl FunctionSpec {
    pub fn new(props: FunctionProps) -> Self {
        Self {
            props,
            ..Default::default()
        }
    }

    pub fn statement(mut self, statement: PolicyStatement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }

    pub fn observability(mut self, enabled: bool) -> Self {
        self.observability = Some(enabled);
        self
    }
}

/// Handle to a built function
#[derive(Debug, Clone)]
pub struct Function {
    pub id: String,
    pub function_name: String,
    pub logical_id: String,
    pub role_logical_id: String,
    pub policy_logical_id: String,
    pub log_group_logical_id: String,
    pub event_invoke_config_logical_id: String,
    pub parameters: Vec<ParameterBinding>,
    /// Properties after the baseline, derived and caller layers were merged
    pub props: FunctionProps,
    pub policy: PolicyDocument,
    pub asset: Asset,
}

impl Function {
    pub fn arn(&self) -> Value {
        get_att(&self.logical_id, "Arn")
    }

    pub fn role_arn(&self) -> Value {
        get_att(&self.role_logical_id, "Arn")
    }
}

pub struct FunctionBuilder<'a> {
    config: &'a StackConfig,
    observability_layer: String,
}

impl<'a> FunctionBuilder<'a> {
    pub fn new(config: &'a StackConfig) -> Self {
        let observability_layer = config.observability.layer_arn(&config.stack.region);
        Self {
            config,
            observability_layer,
        }
    }

    pub fn observability_layer(&self) -> &str {
        &self.observability_layer
    }

    pub fn build(&self, stack: &mut Stack, id: &str, spec: FunctionSpec) -> Result<Function> {
        if stack.node(id).is_some() {
            return Err(CoreError::DuplicateConstruct {
                scope: stack.name().to_string(),
                id: id.to_string(),
            }
            .into());
        }

        let FunctionSpec {
            statements,
            parameters,
            observability,
            props: overrides,
        } = spec;

        let mut wrapper = ConstructNode::scope(id);
        let mut baseline = FunctionProps::baseline(&self.config.functions);

        let observability_node = if observability != Some(false) {
            baseline = baseline.layer(self.observability_layer.clone());
            Some(ConstructNode::reference(
                format!("layer-powertool-{}", id),
                Value::String(self.observability_layer.clone()),
            ))
        } else {
            None
        };

        // Log group
        let log_id = format!("fn-log-{}", id);
        let log_group_logical_id = logical_id(&[id, log_id.as_str()]);
        let mut log_group = CfnResource::new(&log_group_logical_id, "AWS::Logs::LogGroup")
            .with_property("LogGroupName", json!(format!("/aws/lambda/{}", id)))
            .with_property("RetentionInDays", json!(self.config.logs.retention_days));
        log_group.apply_removal_policy(RemovalPolicy::Destroy)?;
        wrapper.add_child(ConstructNode::fronting(&log_id, log_group))?;
        let log_streams = suffixed(get_att(&log_group_logical_id, "Arn"), ":*");

        // Execution role policy, statement order is caller, parameters, logs,
        // network, tracing
        let mut policy = PolicyDocument::new();
        for statement in statements {
            policy.add(statement);
        }

        let mut bindings = Vec::with_capacity(parameters.len());
        for name in &parameters {
            let node_id = format!("fn-param-{}-{}", id, name);
            let binding = ParameterBinding::new(
                name,
                &self.config.parameters.prefix,
                &self.config.parameters.env_prefix,
                logical_id(&[id, node_id.as_str(), "Parameter"]),
            );
            stack.add_parameter(
                &binding.logical_id,
                TemplateParameter::ssm_string(&binding.parameter_name),
            )?;
            wrapper.add_child(ConstructNode::reference(&node_id, binding.arn()))?;
            policy.add(binding.read_statement());
            bindings.push(binding);
        }

        policy.add(
            PolicyStatement::allow()
                .actions(LOG_WRITE_ACTIONS)
                .resources([log_streams.clone()]),
        );

        let mut derived = FunctionProps::default();
        for binding in &bindings {
            derived = derived.env(&binding.env_key, binding.value());
        }

        let props = baseline.overlay(derived).overlay(overrides);
        if let Some(role) = &props.role {
            warn!(
                function = %id,
                role = %role,
                "ignoring caller-supplied role; every function gets its own execution role"
            );
        }

        if props.vpc.is_some() {
            policy.add(
                PolicyStatement::allow()
                    .actions(NETWORK_INTERFACE_ACTIONS)
                    .resources(self.config.network.interface_policy_resources.iter().cloned()),
            );
        }

        if matches!(props.tracing, None | Some(Tracing::Active)) {
            policy.add(
                PolicyStatement::allow()
                    .actions(TRACING_ACTIONS)
                    .resources([log_streams]),
            );
        }

        // Role and its default policy
        let role_id = format!("fn-role-{}", id);
        let role_logical_id = logical_id(&[role_id.as_str()]);
        let policy_logical_id = logical_id(&[role_id.as_str(), "DefaultPolicy"]);
        let role = CfnResource::new(&role_logical_id, "AWS::IAM::Role")
            .with_property("RoleName", json!(format!("fnRole{}", id)))
            .with_property("Description", json!(format!("lambda exec role for {}", id)))
            .with_property(
                "AssumeRolePolicyDocument",
                service_trust_policy(LAMBDA_SERVICE),
            );
        let default_policy = CfnResource::new(&policy_logical_id, "AWS::IAM::Policy")
            .with_property("PolicyName", json!(policy_logical_id))
            .with_property(
                "PolicyDocument",
                serde_json::to_value(&policy).map_err(CoreError::Render)?,
            )
            .with_property("Roles", json!([reference(&role_logical_id)]));
        let mut role_node = ConstructNode::fronting(&role_id, role);
        role_node.add_child(ConstructNode::fronting("DefaultPolicy", default_policy))?;

        // Code asset
        let architecture = props.architecture.unwrap_or_default();
        let bundling = BundlingOptions {
            binary: Some(id.to_string()),
            target: Some(architecture.rust_target().to_string()),
            release: Some(self.config.build_mode.release_builds()),
            ..Default::default()
        }
        .overlay(props.bundling.clone().unwrap_or_default());
        let asset = Asset::cargo_binary(bundling, &self.config.functions.sources)?;
        let code = stack.add_asset(asset.clone());

        // Function, forced name and role, tracing never enabled on the resource
        let function_name = props
            .function_name
            .clone()
            .unwrap_or_else(|| id.to_string());
        let fn_id = format!("fn-{}", id);
        let fn_logical_id = logical_id(&[fn_id.as_str()]);
        let runtime = props.runtime.unwrap_or_default();

        let mut function = CfnResource::new(&fn_logical_id, "AWS::Lambda::Function")
            .with_property("FunctionName", json!(function_name))
            .with_property("Description", json!(props.description))
            .with_property("Role", get_att(&role_logical_id, "Arn"))
            .with_property("Runtime", json!(runtime.as_str()))
            .with_property("Handler", json!(props.handler))
            .with_property("Architectures", json!([architecture.as_str()]))
            .with_property("MemorySize", json!(props.memory_size))
            .with_property("Timeout", json!(props.timeout_secs))
            .with_property("Code", code);
        if let Some(environment) = props.environment.as_ref().filter(|e| !e.is_empty()) {
            function.set_property("Environment", json!({ "Variables": environment }));
        }
        if let Some(layers) = props.layers.as_ref().filter(|l| !l.is_empty()) {
            function.set_property("Layers", json!(layers));
        }
        if let Some(vpc) = &props.vpc {
            function.set_property("VpcConfig", vpc.render());
        }
        function.add_dependency(&policy_logical_id);
        function.add_dependency(&role_logical_id);

        let event_invoke_config_logical_id = logical_id(&[fn_id.as_str(), "EventInvokeConfig"]);
        let event_invoke_config =
            CfnResource::new(&event_invoke_config_logical_id, "AWS::Lambda::EventInvokeConfig")
                .with_property("FunctionName", reference(&fn_logical_id))
                .with_property("Qualifier", json!("$LATEST"))
                .with_property("MaximumRetryAttempts", json!(props.retry_attempts));
        let mut fn_node = ConstructNode::fronting(&fn_id, function);
        fn_node.add_child(ConstructNode::fronting(
            "EventInvokeConfig",
            event_invoke_config,
        ))?;

        stack.add(wrapper)?;
        if let Some(node) = observability_node {
            stack.add(node)?;
        }
        stack.add(role_node)?;
        stack.add(fn_node)?;

        debug!(
            function = %id,
            statements = policy.statement.len(),
            tracing_requested = ?props.tracing,
            "execution role policy assembled"
        );
        info!(
            function = %id,
            name = %function_name,
            parameters = bindings.len(),
            layers = props.layers.as_ref().map_or(0, Vec::len),
            "function added"
        );

        Ok(Function {
            id: id.to_string(),
            function_name,
            logical_id: fn_logical_id,
            role_logical_id,
            policy_logical_id,
            log_group_logical_id,
            event_invoke_config_logical_id,
            parameters: bindings,
            props,
            policy,
            asset,
        })
    }
}
