//! Response bodies returned by the search engine's HTTP API. Only the fields
//! this client reads are modelled.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse<T> {
    pub hits: Hits<T>,
    #[serde(default)]
    pub aggregations: Option<HashMap<String, TermsAggregation>>,
}

#[derive(Debug, Deserialize)]
pub struct Hits<T> {
    #[serde(default = "Vec::new")]
    pub hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Hit<T> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct TermsAggregation {
    #[serde(default)]
    pub buckets: Vec<TermsBucket>,
}

#[derive(Debug, Deserialize)]
pub struct TermsBucket {
    pub key: serde_json::Value,
    pub doc_count: u64,
}

impl TermsBucket {
    pub fn key_string(&self) -> String {
        match &self.key {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
pub struct BulkItem {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub error: Option<EngineErrorCause>,
}

#[derive(Debug, Deserialize)]
pub struct EngineErrorCause {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetResponse<T> {
    pub found: bool,
    #[serde(rename = "_source")]
    pub source: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    pub result: String,
}
