use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::{InitError, PersistError};
use crate::store::DocumentStore;

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com/v1";

/// Credential file contents granting write access to the store
#[derive(Debug, Deserialize)]
struct Credentials {
    project_id: String,
    token: String,
}

/// Firestore-backed document store over its REST interface.
///
/// Writes go through `documents:commit` with a full-document write plus
/// a server-timestamp transform on `last_updated`, so the stamp is
/// assigned by the store, not this client.
pub struct FirestoreStore {
    http: reqwest::Client,
    project_id: String,
    token: String,
}

impl FirestoreStore {
    /// Load the credential file and verify the store is reachable.
    ///
    /// Fails with [`InitError`] if the file cannot be loaded or the store
    /// rejects the probe; callers treat that as fatal before any pipeline
    /// runs.
    pub async fn connect<P: AsRef<Path>>(credentials_path: P) -> Result<Self, InitError> {
        let path = credentials_path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| InitError::CredentialsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let credentials: Credentials =
            serde_json::from_str(&raw).map_err(|source| InitError::CredentialsFormat {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self {
            http: reqwest::Client::new(),
            project_id: credentials.project_id,
            token: credentials.token,
        };
        store.probe().await?;

        ::log::info!("Connected to document store for project {}", store.project_id);
        Ok(store)
    }

    /// Probe the store with a read. A missing probe document is fine; an
    /// auth or transport failure is not.
    async fn probe(&self) -> Result<(), PersistError> {
        self.get("health", "probe").await.map(|_| ())
    }

    /// Fully-qualified resource name for a document
    fn doc_name(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{}/{}",
            self.project_id, collection, doc_id
        )
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn set(
        &self,
        collection: &str,
        doc_id: &str,
        payload: Value,
    ) -> Result<(), PersistError> {
        let Value::Object(fields) = payload else {
            return Err(PersistError::MalformedPayload(
                "payload must be a JSON object".to_string(),
            ));
        };

        let body = json!({
            "writes": [{
                "update": {
                    "name": self.doc_name(collection, doc_id),
                    "fields": encode_fields(&fields),
                },
                "updateTransforms": [{
                    "fieldPath": "last_updated",
                    "setToServerTimestamp": "REQUEST_TIME",
                }],
            }],
        });

        let url = format!(
            "{}/projects/{}/databases/(default)/documents:commit",
            FIRESTORE_HOST, self.project_id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistError::Rejected {
                collection: collection.to_string(),
                doc_id: doc_id.to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        ::log::debug!("Stored document {}/{}", collection, doc_id);
        Ok(())
    }

    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, PersistError> {
        let url = format!("{}/{}", FIRESTORE_HOST, self.doc_name(collection, doc_id));
        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PersistError::Rejected {
                collection: collection.to_string(),
                doc_id: doc_id.to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let document: Value = response.json().await?;
        let fields = document
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(Some(Value::Object(decode_fields(&fields))))
    }
}

/// Encode a plain JSON object as Firestore typed fields
fn encode_fields(fields: &Map<String, Value>) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    Value::Object(encoded)
}

/// Encode a plain JSON value as a Firestore typed value
fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({"nullValue": null}),
        Value::Bool(b) => json!({"booleanValue": b}),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                // Firestore carries integers as strings
                json!({"integerValue": n.to_string()})
            } else {
                json!({"doubleValue": n.as_f64()})
            }
        }
        Value::String(s) => json!({"stringValue": s}),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({"arrayValue": {"values": values}})
        }
        Value::Object(map) => json!({"mapValue": {"fields": encode_fields(map)}}),
    }
}

/// Decode Firestore typed fields back to a plain JSON object
fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Decode a single Firestore typed value
fn decode_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Null;
    };

    if let Some(s) = map.get("stringValue") {
        return s.clone();
    }
    if let Some(s) = map.get("timestampValue") {
        return s.clone();
    }
    if let Some(b) = map.get("booleanValue") {
        return b.clone();
    }
    if let Some(n) = map.get("integerValue") {
        if let Some(parsed) = n.as_str().and_then(|s| s.parse::<i64>().ok()) {
            return json!(parsed);
        }
        return n.clone();
    }
    if let Some(n) = map.get("doubleValue") {
        return n.clone();
    }
    if map.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(array) = map.get("arrayValue") {
        let values = array
            .get("values")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(inner) = map.get("mapValue") {
        let fields = inner
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        return Value::Object(decode_fields(&fields));
    }

    ::log::warn!("Unrecognized Firestore value: {}", value);
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_roundtrip() {
        let payload = json!({
            "topic": "Ukraine",
            "summary": {"positive": 3, "negative": 1, "neutral": 2},
            "opinions": [{"text": "fine", "sentiment": "neutral"}],
            "score": 0.5,
            "flag": true,
            "missing": null,
        });

        let Value::Object(fields) = payload.clone() else {
            unreachable!()
        };
        let encoded = encode_fields(&fields);
        let decoded = decode_fields(encoded.as_object().unwrap());
        assert_eq!(Value::Object(decoded), payload);
    }

    #[test]
    fn test_encode_integer_as_string() {
        let encoded = encode_value(&json!(42));
        assert_eq!(encoded, json!({"integerValue": "42"}));
    }

    #[test]
    fn test_decode_timestamp_as_string() {
        let decoded = decode_value(&json!({"timestampValue": "2025-01-01T00:00:00Z"}));
        assert_eq!(decoded, json!("2025-01-01T00:00:00Z"));
    }
}
