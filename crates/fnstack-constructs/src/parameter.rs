// SSM parameter bindings
//
// A binding exposes a stored string parameter to a function: the template
// resolves it at deploy time, the role may read it, and the function sees
// its value in a `PARAM_*` environment variable.

use fnstack_core::intrinsic::{self, AWS_ACCOUNT_ID, AWS_PARTITION, AWS_REGION};
use fnstack_core::PolicyStatement;
use serde_json::Value;

pub const READ_ACTIONS: [&str; 4] = [
    "ssm:DescribeParameters",
    "ssm:GetParameters",
    "ssm:GetParameter",
    "ssm:GetParameterHistory",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    /// Name as given by the caller, e.g. `DB-USER`
    pub name: String,
    /// Full parameter store name, e.g. `fn-DB-USER`
    pub parameter_name: String,
    /// Template parameter holding the resolved value
    pub logical_id: String,
    pub env_key: String,
}

impl ParameterBinding {
    pub fn new(name: &str, prefix: &str, env_prefix: &str, logical_id: String) -> Self {
        Self {
            name: name.to_string(),
            parameter_name: format!("{}{}", prefix, name),
            logical_id,
            env_key: env_key(env_prefix, name),
        }
    }

    /// Value placed in the function environment
    pub fn value(&self) -> Value {
        intrinsic::reference(&self.logical_id)
    }

    pub fn arn(&self) -> Value {
        let name = self.parameter_name.trim_start_matches('/');
        intrinsic::join(
            "",
            vec![
                Value::String("arn:".into()),
                intrinsic::reference(AWS_PARTITION),
                Value::String(":ssm:".into()),
                intrinsic::reference(AWS_REGION),
                Value::String(":".into()),
                intrinsic::reference(AWS_ACCOUNT_ID),
                Value::String(format!(":parameter/{}", name)),
            ],
        )
    }

    pub fn read_statement(&self) -> PolicyStatement {
        PolicyStatement::allow()
            .actions(READ_ACTIONS)
            .resources([self.arn()])
    }
}

/// `DB-USER` -> `PARAM_DB_USER`
pub fn env_key(env_prefix: &str, name: &str) -> String {
    format!("{}{}", env_prefix, name.to_uppercase().replace('-', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn env_key_uppercases_and_replaces_dashes() {
        assert_eq!(env_key("PARAM_", "DB-USER"), "PARAM_DB_USER");
        assert_eq!(env_key("PARAM_", "api-key-v2"), "PARAM_API_KEY_V2");
    }

    #[test]
    fn binding_references_template_parameter() {
        let binding = ParameterBinding::new("DB-USER", "fn-", "PARAM_", "P".into());
        assert_eq!(binding.parameter_name, "fn-DB-USER");
        assert_eq!(binding.value(), json!({ "Ref": "P" }));
        let statement = binding.read_statement();
        assert!(statement.has_action("ssm:GetParameterHistory"));
        let arn = serde_json::to_string(&statement.resource[0]).unwrap();
        assert!(arn.contains(":parameter/fn-DB-USER"));
    }
}
