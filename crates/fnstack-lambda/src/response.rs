// HTTP event and response types for Lambda
//
// Converts the runtime-independent response into the shape matching the
// event that triggered the invocation.

use aws_lambda_events::{
    apigw::{
        ApiGatewayProxyRequest, ApiGatewayProxyResponse, ApiGatewayV2httpRequest,
        ApiGatewayV2httpResponse,
    },
    encodings::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue},
    lambda_function_urls::{LambdaFunctionUrlRequest, LambdaFunctionUrlResponse},
};
use fnstack_handlers::HttpResponseData;
use serde::{Deserialize, Serialize};

/// Lambda event types (API Gateway v1, HTTP API v2, or Function URL)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HttpRequestEvent {
    ApiGatewayV1(Box<ApiGatewayProxyRequest>),
    ApiGatewayV2(Box<ApiGatewayV2httpRequest>),
    FunctionUrl(Box<LambdaFunctionUrlRequest>),
}

/// Fields every supported event carries
pub(crate) struct RequestParts<'a> {
    pub headers: &'a HeaderMap,
    pub body: Option<&'a str>,
    pub is_base64_encoded: bool,
}

impl HttpRequestEvent {
    pub(crate) fn parts(&self) -> RequestParts<'_> {
        match self {
            Self::ApiGatewayV1(request) => RequestParts {
                headers: &request.headers,
                body: request.body.as_deref(),
                is_base64_encoded: request.is_base64_encoded,
            },
            Self::ApiGatewayV2(request) => RequestParts {
                headers: &request.headers,
                body: request.body.as_deref(),
                is_base64_encoded: request.is_base64_encoded,
            },
            Self::FunctionUrl(request) => RequestParts {
                headers: &request.headers,
                body: request.body.as_deref(),
                is_base64_encoded: request.is_base64_encoded,
            },
        }
    }

    /// Wrap `data` in the response type matching this event
    pub fn respond(&self, data: HttpResponseData) -> HttpLambdaResponse {
        match self {
            Self::ApiGatewayV1(_) => build_api_gateway_v1_response(data),
            Self::ApiGatewayV2(_) => build_api_gateway_v2_response(data),
            Self::FunctionUrl(_) => build_function_url_response(data),
        }
    }
}

/// Lambda response types
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HttpLambdaResponse {
    ApiGatewayV1(ApiGatewayProxyResponse),
    ApiGatewayV2(ApiGatewayV2httpResponse),
    FunctionUrl(LambdaFunctionUrlResponse),
}

impl HttpLambdaResponse {
    pub fn status_code(&self) -> i64 {
        match self {
            Self::ApiGatewayV1(r) => r.status_code,
            Self::ApiGatewayV2(r) => r.status_code,
            Self::FunctionUrl(r) => r.status_code,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::ApiGatewayV1(r) => text_body(r.body.as_ref()),
            Self::ApiGatewayV2(r) => text_body(r.body.as_ref()),
            Self::FunctionUrl(r) => r.body.as_deref(),
        }
    }
}

fn text_body(body: Option<&Body>) -> Option<&str> {
    match body {
        Some(Body::Text(text)) => Some(text.as_str()),
        _ => None,
    }
}

fn content_type_headers(content_type: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers
}

fn build_api_gateway_v1_response(data: HttpResponseData) -> HttpLambdaResponse {
    HttpLambdaResponse::ApiGatewayV1(ApiGatewayProxyResponse {
        status_code: data.status_code as i64,
        headers: content_type_headers(data.content_type),
        multi_value_headers: Default::default(),
        body: Some(Body::Text(data.body)),
        is_base64_encoded: false,
    })
}

fn build_api_gateway_v2_response(data: HttpResponseData) -> HttpLambdaResponse {
    HttpLambdaResponse::ApiGatewayV2(ApiGatewayV2httpResponse {
        status_code: data.status_code as i64,
        headers: content_type_headers(data.content_type),
        multi_value_headers: Default::default(),
        body: Some(Body::Text(data.body)),
        is_base64_encoded: false,
        cookies: vec![],
    })
}

fn build_function_url_response(data: HttpResponseData) -> HttpLambdaResponse {
    HttpLambdaResponse::FunctionUrl(LambdaFunctionUrlResponse {
        status_code: data.status_code as i64,
        headers: content_type_headers(data.content_type),
        body: Some(data.body),
        is_base64_encoded: false,
        cookies: Vec::new(),
    })
}
