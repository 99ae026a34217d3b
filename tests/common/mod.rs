//! In-process stand-in for the search engine's HTTP API, serving the handful
//! of endpoints the client calls for a collection named `books`.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, head, post},
    Router,
};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const INDEX: &str = "books";

#[derive(Debug, Default)]
pub struct EngineState {
    pub created: bool,
    pub create_calls: usize,
    pub definition: Option<Value>,
    pub docs: BTreeMap<String, Value>,
}

pub type SharedState = Arc<Mutex<EngineState>>;

pub struct FakeEngine {
    pub base_url: String,
    pub state: SharedState,
}

impl FakeEngine {
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(EngineState::default()));

        let app = Router::new()
            .route("/books", head(index_exists).put(create_index))
            .route("/_bulk", post(bulk))
            .route("/books/_count", get(count))
            .route("/books/_search", post(search))
            .route("/books/_doc/:id", get(get_doc).delete(delete_doc))
            .route("/books/_update/:id", post(update_doc))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn doc_count(&self) -> usize {
        self.state.lock().unwrap().docs.len()
    }
}

async fn index_exists(State(state): State<SharedState>) -> StatusCode {
    if state.lock().unwrap().created {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn create_index(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    if state.created {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {"type": "resource_already_exists_exception", "reason": "index [books] already exists"},
                "status": 400
            })),
        );
    }

    state.created = true;
    state.create_calls += 1;
    state.definition = Some(body);
    (
        StatusCode::OK,
        Json(json!({"acknowledged": true, "index": INDEX})),
    )
}

async fn bulk(State(state): State<SharedState>, body: String) -> Json<Value> {
    let mut state = state.lock().unwrap();
    let lines: Vec<&str> = body.lines().filter(|l| !l.trim().is_empty()).collect();

    let mut items = Vec::new();
    let mut errors = false;

    for pair in lines.chunks(2) {
        let action: Value = serde_json::from_str(pair[0]).unwrap();
        let id = action["index"]["_id"].as_str().unwrap().to_string();
        let doc: Value = serde_json::from_str(pair[1]).unwrap();

        let title_ok = doc["title"].as_str().map(|t| !t.is_empty()).unwrap_or(false);
        if title_ok {
            state.docs.insert(id.clone(), doc);
            items.push(json!({"index": {"_index": INDEX, "_id": id, "status": 201, "result": "created"}}));
        } else {
            errors = true;
            items.push(json!({"index": {
                "_index": INDEX,
                "_id": id,
                "status": 400,
                "error": {"type": "mapper_parsing_exception", "reason": "title must not be empty"}
            }}));
        }
    }

    Json(json!({"took": 1, "errors": errors, "items": items}))
}

async fn count(State(state): State<SharedState>) -> Json<Value> {
    let state = state.lock().unwrap();
    Json(json!({"count": state.docs.len()}))
}

fn words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

fn matches(doc: &Value, query: &Value) -> bool {
    let bool_query = &query["bool"];

    for clause in bool_query["must"].as_array().cloned().unwrap_or_default() {
        let text = clause["multi_match"]["query"].as_str().unwrap_or_default();
        let mut doc_words = words(doc["title"].as_str().unwrap_or_default());
        doc_words.extend(words(doc["summary"].as_str().unwrap_or_default()));
        if !words(text).iter().any(|w| doc_words.contains(w)) {
            return false;
        }
    }

    for clause in bool_query["filter"].as_array().cloned().unwrap_or_default() {
        let term = clause["term"].as_object().cloned().unwrap_or_default();
        for (field, value) in term {
            let ok = match field.as_str() {
                "author.keyword" => doc["author"] == value,
                "genres" => doc["genres"]
                    .as_array()
                    .map(|g| g.contains(&value))
                    .unwrap_or(false),
                other => doc[other] == value,
            };
            if !ok {
                return false;
            }
        }
    }

    true
}

async fn search(State(state): State<SharedState>, Json(body): Json<Value>) -> Json<Value> {
    let state = state.lock().unwrap();
    let size = body["size"].as_u64().unwrap_or(10) as usize;

    let matched: Vec<(&String, &Value)> = state
        .docs
        .iter()
        .filter(|(_, doc)| matches(doc, &body["query"]))
        .collect();

    let hits: Vec<Value> = matched
        .iter()
        .take(size)
        .map(|(id, doc)| json!({"_index": INDEX, "_id": id, "_score": 1.0, "_source": doc}))
        .collect();

    let mut response = json!({
        "hits": {"total": {"value": matched.len(), "relation": "eq"}, "hits": hits}
    });

    if let Some(aggs) = body["aggs"].as_object() {
        let mut results = Map::new();
        for (name, agg) in aggs {
            let field = agg["terms"]["field"].as_str().unwrap_or_default();
            let limit = agg["terms"]["size"].as_u64().unwrap_or(10) as usize;

            let mut counts: HashMap<String, u64> = HashMap::new();
            for (_, doc) in &matched {
                for value in doc[field].as_array().cloned().unwrap_or_default() {
                    if let Some(key) = value.as_str() {
                        *counts.entry(key.to_string()).or_default() += 1;
                    }
                }
            }

            let mut buckets: Vec<(String, u64)> = counts.into_iter().collect();
            buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            buckets.truncate(limit);

            let buckets: Vec<Value> = buckets
                .into_iter()
                .map(|(key, doc_count)| json!({"key": key, "doc_count": doc_count}))
                .collect();
            results.insert(name.clone(), json!({"buckets": buckets}));
        }
        response["aggregations"] = Value::Object(results);
    }

    Json(response)
}

async fn get_doc(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let state = state.lock().unwrap();
    match state.docs.get(&id) {
        Some(doc) => (
            StatusCode::OK,
            Json(json!({"_index": INDEX, "_id": id, "found": true, "_source": doc})),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"_index": INDEX, "_id": id, "found": false})),
        ),
    }
}

async fn delete_doc(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    match state.docs.remove(&id) {
        Some(_) => (
            StatusCode::OK,
            Json(json!({"_index": INDEX, "_id": id, "result": "deleted"})),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"_index": INDEX, "_id": id, "result": "not_found"})),
        ),
    }
}

async fn update_doc(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    let Some(doc) = state.docs.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {"type": "document_missing_exception", "reason": format!("[{}]: document missing", id)},
                "status": 404
            })),
        );
    };

    if let (Some(target), Some(partial)) = (doc.as_object_mut(), body["doc"].as_object()) {
        for (key, value) in partial {
            target.insert(key.clone(), value.clone());
        }
    }

    (
        StatusCode::OK,
        Json(json!({"_index": INDEX, "_id": id, "result": "updated"})),
    )
}
