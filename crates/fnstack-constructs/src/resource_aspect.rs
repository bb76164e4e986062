// Resource aspect
//
// Applied to every node of a stack after construction. Nodes that are
// resources, or that front a default child resource, get the configured
// removal policy; taggable resources get `resource:type` plus one `x-<key>`
// tag per configured entry.

use fnstack_core::{Aspect, ConstructNode, RemovalPolicy};
use std::collections::BTreeMap;
use tracing::warn;

pub const RESOURCE_TYPE_TAG: &str = "resource:type";

/// Ordered tag entries; keys are written with an `x-` prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<(String, String)>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&BTreeMap<String, String>> for TagSet {
    fn from(tags: &BTreeMap<String, String>) -> Self {
        Self(tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

#[derive(Debug, Clone)]
pub struct ResourceAspect {
    removal_policy: RemovalPolicy,
    tags: TagSet,
}

impl ResourceAspect {
    pub fn new(removal_policy: RemovalPolicy, tags: TagSet) -> Self {
        Self {
            removal_policy,
            tags,
        }
    }
}

impl Aspect for ResourceAspect {
    fn visit(&self, node: &mut ConstructNode) {
        let kind = node.kind_name();
        let id = node.id().to_string();

        let target = if node.is_cfn_resource() {
            node.cfn_resource_mut()
        } else {
            node.default_child_mut()
        };
        if let Some(resource) = target {
            if let Err(e) = resource.apply_removal_policy(self.removal_policy) {
                warn!(node = %id, kind = %kind, error = %e, "cannot apply removal policy");
            }
        }

        if let Some(resource) = node.cfn_resource_mut() {
            let resource_type = resource.resource_type().to_string();
            if let Some(tags) = resource.tags_mut() {
                tags.set_tag(RESOURCE_TYPE_TAG, resource_type);
                for (key, value) in self.tags.iter() {
                    tags.set_tag(format!("x-{}", key), value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnstack_core::{walk, CfnResource};

    fn tree() -> ConstructNode {
        let mut root = ConstructNode::scope("stack");
        root.add_child(ConstructNode::fronting(
            "fn-role-a",
            CfnResource::new("FnRoleA", "AWS::IAM::Role"),
        ))
        .unwrap();
        root.add_child(ConstructNode::resource(
            "policy",
            CfnResource::new("Policy", "AWS::IAM::Policy"),
        ))
        .unwrap();
        root.add_child(ConstructNode::reference("imported", "arn:x".into()))
            .unwrap();
        root
    }

    #[test]
    fn tags_taggable_resources() {
        let mut root = tree();
        let aspect = ResourceAspect::new(
            RemovalPolicy::Destroy,
            TagSet::new().with("app", "SampleApp"),
        );
        walk(&mut root, &aspect);

        let role = root.find_resource("FnRoleA").unwrap();
        let tags = role.tags().unwrap();
        assert_eq!(tags.get("resource:type"), Some("AWS::IAM::Role"));
        assert_eq!(tags.get("x-app"), Some("SampleApp"));
        assert_eq!(role.removal_policy(), Some(RemovalPolicy::Destroy));

        let policy = root.find_resource("Policy").unwrap();
        assert!(policy.tags().is_none());
        assert_eq!(policy.removal_policy(), Some(RemovalPolicy::Destroy));
    }

    #[test]
    fn unsupported_removal_policy_is_skipped() {
        let mut root = tree();
        let aspect = ResourceAspect::new(RemovalPolicy::Snapshot, TagSet::new());
        walk(&mut root, &aspect);

        let role = root.find_resource("FnRoleA").unwrap();
        assert_eq!(role.removal_policy(), None);
        assert_eq!(role.tags().unwrap().len(), 1);
    }

    #[test]
    fn tag_set_from_config_map_keeps_key_order() {
        let mut map = BTreeMap::new();
        map.insert("team".to_string(), "core".to_string());
        map.insert("app".to_string(), "SampleApp".to_string());
        let tags = TagSet::from(&map);
        let keys: Vec<_> = tags.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["app", "team"]);
    }
}
