//! Verify both interception stages against JSON test vectors stored in
//! `test-vectors/`.
//!
//! `outbound.json` describes request inputs and the request the client must
//! build; `envelope.json` describes simulated responses and either the
//! expected payload or the expected error. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use blog_api_core::interceptor::parse_data;
use blog_api_core::{ApiError, AuthContext, AuthScheme, BlogClient, ClientConfig, HttpMethod, HttpResponse};

const BASE_URL: &str = "http://localhost:8080/api";

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

#[test]
fn outbound_test_vectors() {
    let raw = include_str!("../../test-vectors/outbound.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let expected_req = &case["expected_request"];

        let scheme: AuthScheme = serde_json::from_value(input["auth_scheme"].clone()).unwrap();
        let client = BlogClient::from_config(&ClientConfig {
            auth_scheme: scheme,
            ..ClientConfig::new(BASE_URL)
        });
        let auth = match input["token"].as_str() {
            Some(token) => AuthContext::with_token(token),
            None => AuthContext::anonymous(),
        };
        let body = (!input["body"].is_null()).then_some(&input["body"]);

        let req = client
            .build_request(
                parse_method(input["method"].as_str().unwrap()),
                input["path"].as_str().unwrap(),
                body,
                &auth,
            )
            .unwrap();

        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["url"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let req_body: serde_json::Value = match req.body.as_deref() {
            Some(body) => serde_json::from_str(body).unwrap(),
            None => serde_json::Value::Null,
        };
        assert_eq!(req_body, expected_req["body"], "{name}: body");
    }
}

#[test]
fn envelope_test_vectors() {
    let raw = include_str!("../../test-vectors/envelope.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = parse_data::<serde_json::Value>(response);

        let Some(expected) = case.get("expected_error") else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
            continue;
        };

        let err = result.unwrap_err();
        match expected["kind"].as_str().unwrap() {
            "Application" => {
                assert!(
                    matches!(err, ApiError::Application { status, .. } if Some(status) == expected["status"].as_i64()),
                    "{name}: expected Application, got {err:?}"
                );
                assert_eq!(err.to_string(), expected["message"].as_str().unwrap(), "{name}: message");
            }
            "Http" => {
                assert!(
                    matches!(err, ApiError::Http { status, .. } if Some(u64::from(status)) == expected["status"].as_u64()),
                    "{name}: expected Http, got {err:?}"
                );
                assert_eq!(err.to_string(), expected["message"].as_str().unwrap(), "{name}: message");
            }
            "Deserialization" => {
                assert!(matches!(err, ApiError::Deserialization(_)), "{name}: expected Deserialization, got {err:?}");
            }
            other => panic!("{name}: unknown expected_error: {other}"),
        }
    }
}
