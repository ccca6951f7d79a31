//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use serde_json::Value;
use tablebridge_core::{
    ApiError, DataRecord, HttpMethod, HttpRequest, HttpResponse, RemoteConfig, TableClient, User,
};

struct Vectors {
    root: Value,
    client: TableClient,
    base_url: String,
}

fn load(raw: &str) -> Vectors {
    let root: Value = serde_json::from_str(raw).unwrap();
    let base_url = root["base_url"].as_str().unwrap().to_string();
    let api_key = root["api_key"].as_str().unwrap();
    let client = TableClient::new(RemoteConfig::new(&base_url, api_key).unwrap());
    Vectors {
        root,
        client,
        base_url,
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn assert_request(name: &str, base_url: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{base_url}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let actual: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&actual, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be empty"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Compare a parse result with `{"ok": ...}` or `{"err": "<message>"}`.
fn assert_result<T>(name: &str, actual: Result<T, ApiError>, expected: &Value)
where
    T: serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    match (actual, expected.get("ok"), expected.get("err")) {
        (Ok(value), Some(ok), None) => {
            let expected: T = serde_json::from_value(ok.clone()).unwrap();
            assert_eq!(value, expected, "{name}: parsed result");
        }
        (Err(err), None, Some(msg)) => {
            assert_eq!(err.to_string(), msg.as_str().unwrap(), "{name}: error message");
        }
        (actual, _, _) => panic!("{name}: unexpected outcome {actual:?}"),
    }
}

fn cases<'a>(root: &'a Value, key: &str) -> &'a Vec<Value> {
    root[key].as_array().unwrap()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[test]
fn register_test_vectors() {
    let v = load(include_str!("../../test-vectors/users.json"));
    for case in cases(&v.root, "register") {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let req = v
            .client
            .build_register(input["login"].as_str().unwrap(), input["password"].as_str().unwrap())
            .unwrap();
        assert_request(name, &v.base_url, &req, &case["expected_request"]);

        let result = v.client.parse_register(simulated(case));
        assert_result::<String>(name, result, &case["expected_result"]);
    }
}

#[test]
fn login_test_vectors() {
    let v = load(include_str!("../../test-vectors/users.json"));
    for case in cases(&v.root, "login") {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let req = v
            .client
            .build_login(input["login"].as_str().unwrap(), input["password"].as_str().unwrap());
        assert_request(name, &v.base_url, &req, &case["expected_request"]);

        let result = v.client.parse_login(simulated(case));
        assert_result::<Option<User>>(name, result, &case["expected_result"]);
    }
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let v = load(include_str!("../../test-vectors/data.json"));
    for case in cases(&v.root, "list") {
        let name = case["name"].as_str().unwrap();
        let req = v.client.build_list_data();
        assert_request(name, &v.base_url, &req, &case["expected_request"]);

        let result = v.client.parse_list_data(simulated(case));
        assert_result::<Vec<DataRecord>>(name, result, &case["expected_result"]);
    }
}

#[test]
fn add_test_vectors() {
    let v = load(include_str!("../../test-vectors/data.json"));
    for case in cases(&v.root, "add") {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let req = v
            .client
            .build_add_data(input["content"].as_str().unwrap(), input["user_id"].as_str())
            .unwrap();
        assert_request(name, &v.base_url, &req, &case["expected_request"]);

        let result = v.client.parse_add_data(simulated(case));
        assert_result::<String>(name, result, &case["expected_result"]);
    }
}

#[test]
fn update_test_vectors() {
    let v = load(include_str!("../../test-vectors/data.json"));
    for case in cases(&v.root, "update") {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let req = v
            .client
            .build_update_data(input["id"].as_str().unwrap(), input["content"].as_str().unwrap())
            .unwrap();
        assert_request(name, &v.base_url, &req, &case["expected_request"]);

        let result = v.client.parse_update_data(simulated(case));
        assert_result::<String>(name, result, &case["expected_result"]);
    }
}

#[test]
fn delete_test_vectors() {
    let v = load(include_str!("../../test-vectors/data.json"));
    for case in cases(&v.root, "delete") {
        let name = case["name"].as_str().unwrap();
        let req = v.client.build_delete_data(case["input"]["id"].as_str().unwrap());
        assert_request(name, &v.base_url, &req, &case["expected_request"]);

        let result = v.client.parse_delete_data(simulated(case));
        assert_result::<String>(name, result, &case["expected_result"]);
    }
}
