use crate::HttpResponseData;
use serde_json::json;

/// Response of the always-200 function, whatever the event
pub fn fixed_success() -> HttpResponseData {
    HttpResponseData::json_value(200, &json!({ "status": "200" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_status_200_body() {
        let response = fixed_success();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"status":"200"}"#);
    }
}
