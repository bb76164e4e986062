// Stack: the root of a construct tree plus template-level sections
//
// Builders add construct subtrees, template parameters and assets here;
// `synth` flattens the tree into a Template.

use crate::asset::ASSETS_BUCKET_PARAMETER;
use crate::{Asset, ConstructNode, CoreError, Template};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateParameter {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TemplateParameter {
    pub fn string(description: &str) -> Self {
        Self {
            kind: "String".to_string(),
            default: None,
            description: Some(description.to_string()),
        }
    }

    /// Parameter resolved from SSM Parameter Store at deploy time
    pub fn ssm_string(parameter_name: &str) -> Self {
        Self {
            kind: "AWS::SSM::Parameter::Value<String>".to_string(),
            default: Some(Value::String(parameter_name.to_string())),
            description: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stack {
    region: String,
    account: Option<String>,
    description: Option<String>,
    root: ConstructNode,
    parameters: BTreeMap<String, TemplateParameter>,
    outputs: BTreeMap<String, Value>,
    assets: Vec<Asset>,
}

impl Stack {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account: None,
            description: None,
            root: ConstructNode::scope(name),
            parameters: BTreeMap::new(),
            outputs: BTreeMap::new(),
            assets: Vec::new(),
        }
    }

    pub fn with_account(mut self, account: Option<String>) -> Self {
        self.account = account;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn name(&self) -> &str {
        self.root.id()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn root(&self) -> &ConstructNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ConstructNode {
        &mut self.root
    }

    /// Add a top-level construct; ids are unique per stack
    pub fn add(&mut self, node: ConstructNode) -> Result<&mut ConstructNode, CoreError> {
        debug!(stack = %self.name(), construct = %node.id(), "adding construct");
        self.root.add_child(node)
    }

    pub fn node(&self, id: &str) -> Option<&ConstructNode> {
        self.root.find_child(id)
    }

    pub fn add_parameter(
        &mut self,
        logical_id: impl Into<String>,
        parameter: TemplateParameter,
    ) -> Result<(), CoreError> {
        let logical_id = logical_id.into();
        if self.parameters.contains_key(&logical_id) {
            return Err(CoreError::DuplicateLogicalId {
                stack: self.name().to_string(),
                logical_id,
            });
        }
        self.parameters.insert(logical_id, parameter);
        Ok(())
    }

    pub fn parameters(&self) -> &BTreeMap<String, TemplateParameter> {
        &self.parameters
    }

    /// Register an asset and return the S3 location the template should use
    pub fn add_asset(&mut self, asset: Asset) -> Value {
        self.parameters
            .entry(ASSETS_BUCKET_PARAMETER.to_string())
            .or_insert_with(|| TemplateParameter::string("S3 bucket holding packaged assets"));
        let location = asset.s3_location();
        if !self.assets.iter().any(|a| a.hash == asset.hash) {
            self.assets.push(asset);
        }
        location
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn add_output(&mut self, name: impl Into<String>, value: Value) {
        self.outputs.insert(name.into(), value);
    }

    /// Flatten the construct tree into a template
    pub fn synth(&self) -> Result<Template, CoreError> {
        let mut template = Template::new(self.description.clone());
        for (logical_id, parameter) in &self.parameters {
            template.parameters.insert(
                logical_id.clone(),
                serde_json::to_value(parameter).map_err(CoreError::Render)?,
            );
        }

        for resource in self.root.resources() {
            let logical_id = resource.logical_id().to_string();
            if template.parameters.contains_key(&logical_id)
                || template.resources.contains_key(&logical_id)
            {
                return Err(CoreError::DuplicateLogicalId {
                    stack: self.name().to_string(),
                    logical_id,
                });
            }
            template.resources.insert(logical_id, resource.render());
        }

        for (name, value) in &self.outputs {
            template
                .outputs
                .insert(name.clone(), serde_json::json!({ "Value": value }));
        }

        debug!(
            stack = %self.name(),
            resources = template.resources.len(),
            parameters = template.parameters.len(),
            "synthesized template"
        );
        Ok(template)
    }
}
