// CloudFormation intrinsic function helpers

use serde_json::{json, Value};

pub const AWS_ACCOUNT_ID: &str = "AWS::AccountId";
pub const AWS_PARTITION: &str = "AWS::Partition";
pub const AWS_REGION: &str = "AWS::Region";

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn join(delimiter: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [delimiter, parts] })
}

/// `<value>:*`, the wildcard form used for log stream ARNs
pub fn suffixed(value: Value, suffix: &str) -> Value {
    join("", vec![value, Value::String(suffix.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_att_shape() {
        assert_eq!(
            get_att("LogGroup", "Arn"),
            json!({ "Fn::GetAtt": ["LogGroup", "Arn"] })
        );
    }

    #[test]
    fn test_suffixed_wraps_in_join() {
        let value = suffixed(get_att("LogGroup", "Arn"), ":*");
        assert_eq!(
            value,
            json!({ "Fn::Join": ["", [{ "Fn::GetAtt": ["LogGroup", "Arn"] }, ":*"]] })
        );
    }
}
