// IAM policy documents
//
// Statements serialize with the PascalCase keys IAM expects. Resources are
// kept as JSON values so they can hold intrinsics as well as literal ARNs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    pub action: Vec<String>,
    pub resource: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl PolicyStatement {
    pub fn allow() -> Self {
        Self::with_effect(Effect::Allow)
    }

    pub fn deny() -> Self {
        Self::with_effect(Effect::Deny)
    }

    fn with_effect(effect: Effect) -> Self {
        Self {
            sid: None,
            effect,
            action: Vec::new(),
            resource: Vec::new(),
            condition: None,
        }
    }

    pub fn sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn resources<I, V>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.resource.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn condition(mut self, condition: Value) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.action.iter().any(|a| a == action)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: Vec::new(),
        }
    }

    pub fn add(&mut self, statement: PolicyStatement) {
        self.statement.push(statement);
    }

    pub fn is_empty(&self) -> bool {
        self.statement.is_empty()
    }

    /// Every action granted by an Allow statement, in statement order
    pub fn allowed_actions(&self) -> impl Iterator<Item = &str> {
        self.statement
            .iter()
            .filter(|s| s.effect == Effect::Allow)
            .flat_map(|s| s.action.iter().map(String::as_str))
    }
}

/// Trust document for `sts:AssumeRole` by one AWS service
pub fn service_trust_policy(service: &str) -> Value {
    let mut statement = Map::new();
    statement.insert("Action".into(), json!("sts:AssumeRole"));
    statement.insert("Effect".into(), json!("Allow"));
    statement.insert("Principal".into(), json!({ "Service": service }));
    json!({
        "Version": POLICY_VERSION,
        "Statement": [Value::Object(statement)],
    })
}

/// Condition fragment matching resources carrying `tag_name = tag_value`
pub fn resource_tag_condition(tag_name: &str, tag_value: &str) -> Value {
    let mut matches = Map::new();
    matches.insert(
        format!("aws:ResourceTag/{}", tag_name),
        Value::String(tag_value.to_string()),
    );
    json!({ "StringEquals": matches })
}
