// Low-level CloudFormation resources
//
// A CfnResource is one entry of the template's Resources section. Tags are
// tracked separately from properties and rendered as the standard
// `[{Key, Value}]` list, sorted by key.

use crate::{CoreError, RemovalPolicy};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Resource types that accept a `Tags` property
const TAGGABLE_TYPES: &[&str] = &[
    "AWS::DynamoDB::Table",
    "AWS::EC2::SecurityGroup",
    "AWS::IAM::Role",
    "AWS::Lambda::Function",
    "AWS::Logs::LogGroup",
    "AWS::S3::Bucket",
    "AWS::SNS::Topic",
    "AWS::SQS::Queue",
    "AWS::SSM::Parameter",
];

/// Resource types whose DeletionPolicy may be `Snapshot`
const SNAPSHOT_TYPES: &[&str] = &[
    "AWS::DocDB::DBCluster",
    "AWS::EC2::Volume",
    "AWS::ElastiCache::CacheCluster",
    "AWS::ElastiCache::ReplicationGroup",
    "AWS::Neptune::DBCluster",
    "AWS::RDS::DBCluster",
    "AWS::RDS::DBInstance",
    "AWS::Redshift::Cluster",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagManager {
    tags: BTreeMap<String, String>,
}

impl TagManager {
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn render(&self) -> Value {
        Value::Array(
            self.tags
                .iter()
                .map(|(key, value)| json!({ "Key": key, "Value": value }))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CfnResource {
    logical_id: String,
    resource_type: String,
    properties: Map<String, Value>,
    depends_on: Vec<String>,
    removal_policy: Option<RemovalPolicy>,
    tags: Option<TagManager>,
}

impl CfnResource {
    pub fn new(logical_id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        let tags = TAGGABLE_TYPES
            .contains(&resource_type.as_str())
            .then(TagManager::default);
        Self {
            logical_id: logical_id.into(),
            resource_type,
            properties: Map::new(),
            depends_on: Vec::new(),
            removal_policy: None,
            tags,
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn with_property(mut self, key: &str, value: Value) -> Self {
        self.set_property(key, value);
        self
    }

    /// Sets a property; `null` values are dropped so optional inputs can be
    /// passed straight through
    pub fn set_property(&mut self, key: &str, value: Value) {
        if value.is_null() {
            self.properties.remove(key);
        } else {
            self.properties.insert(key.to_string(), value);
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn add_dependency(&mut self, logical_id: impl Into<String>) {
        let logical_id = logical_id.into();
        if !self.depends_on.contains(&logical_id) {
            self.depends_on.push(logical_id);
        }
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn apply_removal_policy(&mut self, policy: RemovalPolicy) -> Result<(), CoreError> {
        if policy == RemovalPolicy::Snapshot
            && !SNAPSHOT_TYPES.contains(&self.resource_type.as_str())
        {
            return Err(CoreError::UnsupportedRemovalPolicy {
                resource_type: self.resource_type.clone(),
                policy: policy.as_cfn(),
            });
        }
        self.removal_policy = Some(policy);
        Ok(())
    }

    pub fn removal_policy(&self) -> Option<RemovalPolicy> {
        self.removal_policy
    }

    pub fn is_taggable(&self) -> bool {
        self.tags.is_some()
    }

    pub fn tags(&self) -> Option<&TagManager> {
        self.tags.as_ref()
    }

    pub fn tags_mut(&mut self) -> Option<&mut TagManager> {
        self.tags.as_mut()
    }

    /// Render the Resources entry for this resource
    pub fn render(&self) -> Value {
        let mut properties = self.properties.clone();
        if let Some(tags) = self.tags.as_ref().filter(|t| !t.is_empty()) {
            properties.insert("Tags".to_string(), tags.render());
        }

        let mut entry = Map::new();
        entry.insert("Type".into(), Value::String(self.resource_type.clone()));
        if !properties.is_empty() {
            entry.insert("Properties".into(), Value::Object(properties));
        }
        if !self.depends_on.is_empty() {
            entry.insert("DependsOn".into(), json!(self.depends_on));
        }
        if let Some(policy) = self.removal_policy {
            entry.insert("DeletionPolicy".into(), json!(policy.as_cfn()));
            entry.insert("UpdateReplacePolicy".into(), json!(policy.as_cfn()));
        }
        Value::Object(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taggability_follows_type() {
        assert!(CfnResource::new("Fn", "AWS::Lambda::Function").is_taggable());
        assert!(!CfnResource::new("Policy", "AWS::IAM::Policy").is_taggable());
        assert!(!CfnResource::new("Layer", "AWS::Lambda::LayerVersion").is_taggable());
    }

    #[test]
    fn test_snapshot_rejected_for_unsupported_type() {
        let mut group = CfnResource::new("Logs", "AWS::Logs::LogGroup");
        assert!(group.apply_removal_policy(RemovalPolicy::Snapshot).is_err());
        assert_eq!(group.removal_policy(), None);

        let mut db = CfnResource::new("Db", "AWS::RDS::DBInstance");
        assert!(db.apply_removal_policy(RemovalPolicy::Snapshot).is_ok());
    }

    #[test]
    fn test_render_includes_policies_and_sorted_tags() {
        let mut resource = CfnResource::new("Logs", "AWS::Logs::LogGroup")
            .with_property("RetentionInDays", json!(1));
        resource.apply_removal_policy(RemovalPolicy::Destroy).unwrap();
        let tags = resource.tags_mut().unwrap();
        tags.set_tag("x-app", "SampleApp");
        tags.set_tag("resource:type", "AWS::Logs::LogGroup");

        let rendered = resource.render();
        assert_eq!(rendered["DeletionPolicy"], json!("Delete"));
        assert_eq!(rendered["UpdateReplacePolicy"], json!("Delete"));
        assert_eq!(
            rendered["Properties"]["Tags"],
            json!([
                { "Key": "resource:type", "Value": "AWS::Logs::LogGroup" },
                { "Key": "x-app", "Value": "SampleApp" },
            ])
        );
    }

    #[test]
    fn test_null_property_is_dropped() {
        let mut resource = CfnResource::new("Fn", "AWS::Lambda::Function")
            .with_property("Description", json!("first"));
        resource.set_property("Description", Value::Null);
        assert!(resource.property("Description").is_none());
        assert!(resource.render().get("Properties").is_none());
    }

    #[test]
    fn test_dependencies_are_deduplicated() {
        let mut resource = CfnResource::new("Fn", "AWS::Lambda::Function");
        resource.add_dependency("Role");
        resource.add_dependency("Role");
        assert_eq!(resource.depends_on(), ["Role".to_string()]);
    }
}
