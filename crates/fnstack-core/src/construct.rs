// Construct tree
//
// Nodes are plain data: a scope grouping children (optionally fronting one
// default child resource), a low-level resource, or a reference to
// something that already exists outside the stack.

use crate::{CfnResource, CoreError};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Grouping construct; `default_child` names the child resource it fronts
    Scope { default_child: Option<String> },
    Resource(CfnResource),
    /// Imported by ARN or name; never rendered
    Reference { arn: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructNode {
    id: String,
    kind: NodeKind,
    children: Vec<ConstructNode>,
}

impl ConstructNode {
    pub fn scope(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Scope {
                default_child: None,
            },
            children: Vec::new(),
        }
    }

    /// Higher-level construct whose `Resource` child is its default child
    pub fn fronting(id: impl Into<String>, resource: CfnResource) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Scope {
                default_child: Some("Resource".to_string()),
            },
            children: vec![ConstructNode::resource("Resource", resource)],
        }
    }

    pub fn resource(id: impl Into<String>, resource: CfnResource) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Resource(resource),
            children: Vec::new(),
        }
    }

    pub fn reference(id: impl Into<String>, arn: Value) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Reference { arn },
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[ConstructNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [ConstructNode] {
        &mut self.children
    }

    pub fn add_child(&mut self, child: ConstructNode) -> Result<&mut ConstructNode, CoreError> {
        if self.children.iter().any(|c| c.id == child.id) {
            return Err(CoreError::DuplicateConstruct {
                scope: self.id.clone(),
                id: child.id,
            });
        }
        self.children.push(child);
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }

    pub fn find_child(&self, id: &str) -> Option<&ConstructNode> {
        self.children.iter().find(|c| c.id == id)
    }

    pub fn find_child_mut(&mut self, id: &str) -> Option<&mut ConstructNode> {
        self.children.iter_mut().find(|c| c.id == id)
    }

    pub fn is_cfn_resource(&self) -> bool {
        matches!(self.kind, NodeKind::Resource(_))
    }

    pub fn cfn_resource(&self) -> Option<&CfnResource> {
        match &self.kind {
            NodeKind::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn cfn_resource_mut(&mut self) -> Option<&mut CfnResource> {
        match &mut self.kind {
            NodeKind::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn has_default_child(&self) -> bool {
        self.default_child_id()
            .is_some_and(|id| self.find_child(id).is_some())
    }

    /// The resource a higher-level construct fronts, if any
    pub fn default_child_mut(&mut self) -> Option<&mut CfnResource> {
        let id = self.default_child_id()?.to_string();
        self.find_child_mut(&id)?.cfn_resource_mut()
    }

    fn default_child_id(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scope { default_child } => default_child.as_deref(),
            _ => None,
        }
    }

    pub fn is_taggable(&self) -> bool {
        self.cfn_resource().is_some_and(CfnResource::is_taggable)
    }

    /// Short label for log lines, e.g. `Resource(AWS::IAM::Role)`
    pub fn kind_name(&self) -> String {
        match &self.kind {
            NodeKind::Scope { .. } => "Scope".to_string(),
            NodeKind::Resource(resource) => format!("Resource({})", resource.resource_type()),
            NodeKind::Reference { .. } => "Reference".to_string(),
        }
    }

    /// Every resource in this subtree, pre-order
    pub fn resources(&self) -> Vec<&CfnResource> {
        let mut out = Vec::new();
        self.collect_resources(&mut out);
        out
    }

    fn collect_resources<'a>(&'a self, out: &mut Vec<&'a CfnResource>) {
        if let Some(resource) = self.cfn_resource() {
            out.push(resource);
        }
        for child in &self.children {
            child.collect_resources(out);
        }
    }

    /// Find a resource anywhere below this node by logical id
    pub fn find_resource(&self, logical_id: &str) -> Option<&CfnResource> {
        self.resources()
            .into_iter()
            .find(|r| r.logical_id() == logical_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_child_rejected() {
        let mut root = ConstructNode::scope("stack");
        root.add_child(ConstructNode::scope("return-200")).unwrap();
        let err = root
            .add_child(ConstructNode::scope("return-200"))
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateConstruct { .. }));
    }

    #[test]
    fn test_fronting_exposes_default_child() {
        let mut node = ConstructNode::fronting(
            "fn-role-x",
            CfnResource::new("FnRoleX", "AWS::IAM::Role"),
        );
        assert!(node.has_default_child());
        assert!(!node.is_cfn_resource());
        assert_eq!(
            node.default_child_mut().unwrap().resource_type(),
            "AWS::IAM::Role"
        );
    }

    #[test]
    fn test_plain_scope_has_no_default_child() {
        let mut node = ConstructNode::scope("group");
        assert!(!node.has_default_child());
        assert!(node.default_child_mut().is_none());
    }

    #[test]
    fn test_resources_are_collected_pre_order() {
        let mut root = ConstructNode::scope("stack");
        root.add_child(ConstructNode::fronting(
            "a",
            CfnResource::new("A", "AWS::IAM::Role"),
        ))
        .unwrap()
        .add_child(ConstructNode::resource(
            "Policy",
            CfnResource::new("APolicy", "AWS::IAM::Policy"),
        ))
        .unwrap();
        root.add_child(ConstructNode::reference(
            "imported",
            serde_json::json!("arn:aws:lambda:eu-west-1:1:layer:x:1"),
        ))
        .unwrap();

        let ids: Vec<_> = root.resources().iter().map(|r| r.logical_id()).collect();
        assert_eq!(ids, vec!["A", "APolicy"]);
        assert!(root.find_resource("APolicy").is_some());
    }
}
