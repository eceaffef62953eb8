//! Key/value client tests against an in-memory mock server.

mod common;

use serde_json::{Map, Value, json};

use ndb_client::{Error, KvClient};

use common::{MockServer, ServerReply, init_logging, single_entry, spawn_server};

// ============================================================================
// Mock Database
// ============================================================================

/// Spawns a server implementing enough of the `KV_` family for the
/// client tests: a key/value map plus one saved dataset named "ok".
async fn kv_server() -> MockServer {
    let mut store: Map<String, Value> = Map::new();

    spawn_server(move |request| {
        let (name, body) = single_entry(&request);
        let rsp = match name.as_str() {
            "KV_SET" => {
                for (key, value) in body["keys"].as_object().expect("keys object") {
                    store.insert(key.clone(), value.clone());
                }
                json!({"KV_SET_RSP": {"st": 1}})
            }
            "KV_ADD" => {
                for (key, value) in body["keys"].as_object().expect("keys object") {
                    store.entry(key.clone()).or_insert_with(|| value.clone());
                }
                json!({"KV_ADD_RSP": {"st": 1}})
            }
            "KV_GET" => {
                let mut keys = Map::new();
                for key in body["keys"].as_array().expect("keys array") {
                    let key = key.as_str().expect("key string");
                    if let Some(value) = store.get(key) {
                        keys.insert(key.to_owned(), value.clone());
                    }
                }
                json!({"KV_GET_RSP": {"st": 1, "keys": keys}})
            }
            "KV_RMV" => {
                for key in body["keys"].as_array().expect("keys array") {
                    store.remove(key.as_str().expect("key string"));
                }
                json!({"KV_RMV_RSP": {"st": 1}})
            }
            "KV_COUNT" => json!({"KV_COUNT_RSP": {"st": 1, "cnt": store.len()}}),
            "KV_CONTAINS" => {
                let contains: Vec<&str> = body["keys"]
                    .as_array()
                    .expect("keys array")
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|key| store.contains_key(*key))
                    .collect();
                json!({"KV_CONTAINS_RSP": {"st": 1, "contains": contains}})
            }
            "KV_KEYS" => {
                let keys: Vec<&String> = store.keys().collect();
                json!({"KV_KEYS_RSP": {"st": 1, "keys": keys}})
            }
            "KV_CLEAR" => {
                let cnt = store.len();
                store.clear();
                json!({"KV_CLEAR_RSP": {"st": 1, "cnt": cnt}})
            }
            "KV_CLEAR_SET" => {
                let cnt = store.len();
                store.clear();
                for (key, value) in body["keys"].as_object().expect("keys object") {
                    store.insert(key.clone(), value.clone());
                }
                json!({"KV_CLEAR_SET_RSP": {"st": 1, "cnt": cnt}})
            }
            "KV_SAVE" => {
                // dataset "bad" simulates a persistence failure
                let st = if body["name"] == json!("bad") { 123 } else { 121 };
                json!({"KV_SAVE_RSP": {"st": st}})
            }
            "KV_LOAD" => {
                if body["name"] == json!("ok") {
                    json!({"KV_LOAD_RSP": {"st": 141, "keys": 4}})
                } else {
                    json!({"KV_LOAD_RSP": {"st": 142}})
                }
            }
            "SV_INFO" => {
                json!({"SV_INFO_RSP": {"st": 1, "serverVersion": "0.6.9", "persistEnabled": true}})
            }
            other => panic!("unexpected command {other}"),
        };
        ServerReply::Json(rsp)
    })
    .await
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn set_then_get() -> anyhow::Result<()> {
    init_logging();
    let server = kv_server().await;

    let client = KvClient::new();
    client.open(&server.url).await?;

    client.set(json!({"user": "alice", "age": 30})).await?;
    let values = client.get(&["user", "age", "missing"]).await?;

    assert_eq!(values.get("user"), Some(&json!("alice")));
    assert_eq!(values.get("age"), Some(&json!(30)));
    assert!(!values.contains_key("missing"));

    client.close().await;
    Ok(())
}

#[tokio::test]
async fn add_does_not_overwrite() -> anyhow::Result<()> {
    init_logging();
    let server = kv_server().await;

    let client = KvClient::new();
    client.open(&server.url).await?;

    client.set(json!({"k": "original"})).await?;
    client.add(json!({"k": "replacement", "fresh": 1})).await?;

    let values = client.get(&["k", "fresh"]).await?;
    assert_eq!(values.get("k"), Some(&json!("original")));
    assert_eq!(values.get("fresh"), Some(&json!(1)));

    client.close().await;
    Ok(())
}

#[tokio::test]
async fn rmv_count_and_contains() -> anyhow::Result<()> {
    init_logging();
    let server = kv_server().await;

    let client = KvClient::new();
    client.open(&server.url).await?;

    client.set(json!({"a": 1, "b": 2, "c": 3})).await?;
    assert_eq!(client.count().await?, 3);

    client.rmv(&["b"]).await?;
    assert_eq!(client.count().await?, 2);

    let present = client.contains(&["a", "b", "c"]).await?;
    assert_eq!(present, vec!["a".to_string(), "c".to_string()]);

    client.close().await;
    Ok(())
}

#[tokio::test]
async fn keys_clear_and_clear_set() -> anyhow::Result<()> {
    init_logging();
    let server = kv_server().await;

    let client = KvClient::new();
    client.open(&server.url).await?;

    client.set(json!({"a": 1, "b": 2})).await?;
    let mut keys = client.keys().await?;
    keys.sort();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

    let cleared = client.clear_set(json!({"x": 9})).await?;
    assert_eq!(cleared, 2);
    assert_eq!(client.keys().await?, vec!["x".to_string()]);

    assert_eq!(client.clear().await?, 1);
    assert_eq!(client.count().await?, 0);

    client.close().await;
    Ok(())
}

#[tokio::test]
async fn save_and_load_use_completion_statuses() -> anyhow::Result<()> {
    init_logging();
    let server = kv_server().await;

    let client = KvClient::new();
    client.open(&server.url).await?;

    client.save("nightly").await?;
    assert_eq!(client.load("ok").await?, 4);

    client.close().await;
    Ok(())
}

#[tokio::test]
async fn save_failure_surfaces_status() {
    init_logging();
    let server = kv_server().await;

    let client = KvClient::new();
    client.open(&server.url).await.expect("open");

    let err = client.save("bad").await.unwrap_err();
    assert!(err.is_response_error());
    assert!(matches!(
        err,
        Error::ResponseStatus { status: 123, .. }
    ));

    // the connection survives a failed command
    client.set(json!({"a": 1})).await.expect("set");

    client.close().await;
}

#[tokio::test]
async fn load_unknown_dataset_surfaces_status() {
    init_logging();
    let server = kv_server().await;

    let client = KvClient::new();
    client.open(&server.url).await.expect("open");

    let err = client.load("nope").await.unwrap_err();
    assert!(matches!(
        err,
        Error::ResponseStatus { status: 142, .. }
    ));

    client.close().await;
}

#[tokio::test]
async fn save_rejects_empty_name() {
    init_logging();
    let client = KvClient::new();
    let err = client.save("").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[tokio::test]
async fn server_info_strips_status() -> anyhow::Result<()> {
    init_logging();
    let server = kv_server().await;

    let client = KvClient::new();
    client.open(&server.url).await?;

    let info = client.server_info().await?;
    assert!(!info.contains_key("st"));
    assert_eq!(info.get("serverVersion"), Some(&json!("0.6.9")));

    client.close().await;
    Ok(())
}
