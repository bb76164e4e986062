// Rendered CloudFormation template

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
    pub resources: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Value>,
}

impl Template {
    pub fn new(description: Option<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            description,
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.resources.get(logical_id)
    }

    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r["Type"] == resource_type)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_sections_are_omitted() {
        let template = Template::new(None);
        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(
            value,
            json!({ "AWSTemplateFormatVersion": "2010-09-09", "Resources": {} })
        );
    }

    #[test]
    fn test_resources_of_type() {
        let mut template = Template::new(Some("demo".into()));
        template
            .resources
            .insert("A".into(), json!({ "Type": "AWS::IAM::Role" }));
        template
            .resources
            .insert("B".into(), json!({ "Type": "AWS::Lambda::Function" }));
        let roles: Vec<_> = template
            .resources_of_type("AWS::IAM::Role")
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(roles, vec!["A"]);
    }
}
