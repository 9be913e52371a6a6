#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};

use folio_extensions::resource_api::{ResourceApiClient, ResourceApiConfig};

/// A request as the fake server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub op: String,
    pub query: Option<Value>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct FakeFile {
    collection_id: String,
    file_id: String,
    file_name: String,
    content: String,
}

#[derive(Debug, Default)]
struct FakeState {
    collections: Vec<Value>,
    files: Vec<FakeFile>,
    requests: Vec<Recorded>,
    canned: HashMap<String, (StatusCode, Value)>,
}

impl FakeState {
    fn structure(&self) -> Value {
        let records: Vec<Value> = self
            .collections
            .iter()
            .map(|c| {
                let mut record = c.clone();
                let files: Vec<Value> = self
                    .files
                    .iter()
                    .filter(|f| c["collection_id"] == f.collection_id.as_str())
                    .map(|f| json!({ "file_id": f.file_id, "file_name": f.file_name }))
                    .collect();
                record["editor_files"] = Value::Array(files);
                record
            })
            .collect();
        json!({ "data": { "editor_collections": records } })
    }
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "errors": [{ "message": message }] }))).into_response()
}

fn str_field<'a>(value: &'a Option<Value>, key: &str) -> &'a str {
    value.as_ref().and_then(|v| v[key].as_str()).unwrap_or_default()
}

async fn resource(
    State(state): State<Arc<Mutex<FakeState>>>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let op = params.get("name").cloned().unwrap_or_default();
    let query = params.get("json").and_then(|j| serde_json::from_str::<Value>(j).ok());
    let body = serde_json::from_slice::<Value>(&body).ok();

    let mut state = state.lock().unwrap();
    state.requests.push(Recorded {
        method,
        op: op.clone(),
        query: query.clone(),
        body: body.clone(),
    });
    if let Some((status, payload)) = state.canned.remove(&op) {
        return (status, Json(payload)).into_response();
    }

    match op.as_str() {
        "get_collection_structure" => Json(state.structure()).into_response(),
        "save_collection_structure" => {
            let records = body
                .as_ref()
                .and_then(|b| b["collections"].as_array().cloned())
                .unwrap_or_default();
            state.collections = records;
            Json(json!({ "data": {} })).into_response()
        }
        "get_file" => {
            let file_id = str_field(&query, "file_id");
            let files: Vec<Value> = state
                .files
                .iter()
                .filter(|f| f.file_id == file_id)
                .map(|f| json!({ "file_id": f.file_id, "file_name": f.file_name, "content": f.content }))
                .collect();
            Json(json!({ "data": { "editor_files": files } })).into_response()
        }
        "create_file" | "update_file" => {
            let file = FakeFile {
                collection_id: str_field(&body, "collection_id").to_string(),
                file_id: str_field(&body, "file_id").to_string(),
                file_name: str_field(&body, "file_name").to_string(),
                content: str_field(&body, "content").to_string(),
            };
            state.files.retain(|f| f.file_id != file.file_id);
            state.files.push(file);
            Json(json!({ "success": true })).into_response()
        }
        "delete_editor_file" => {
            let file_id = str_field(&body, "file_id").to_string();
            let before = state.files.len();
            state.files.retain(|f| f.file_id != file_id);
            if state.files.len() == before {
                return not_found("File not found");
            }
            Json(json!({ "data": {} })).into_response()
        }
        "rename_collection" => {
            let id = str_field(&body, "collection_id").to_string();
            let name = str_field(&body, "collection_name").to_string();
            match state.collections.iter_mut().find(|c| c["collection_id"] == id.as_str()) {
                Some(record) => {
                    record["collection_name"] = Value::String(name);
                    Json(json!({ "data": {} })).into_response()
                }
                None => not_found("Collection not found"),
            }
        }
        "delete_editor_collection" => {
            let id = str_field(&body, "collection_id").to_string();
            let before = state.collections.len();
            state.collections.retain(|c| c["collection_id"] != id.as_str());
            if state.collections.len() == before {
                return not_found("Collection not found");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        "create_collection" => {
            if let Some(record) = body {
                state.collections.push(record);
            }
            Json(json!({ "data": {} })).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": [{ "message": format!("Unknown operation '{op}'") }] })),
        )
            .into_response(),
    }
}

/// Resource endpoint served from memory on an ephemeral local port.
pub struct FakeResourceServer {
    addr: SocketAddr,
    state: Arc<Mutex<FakeState>>,
}

impl FakeResourceServer {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState::default()));
        let app = Router::new()
            .route("/api/resource", any(resource))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/api/resource", self.addr)
    }

    pub fn client(&self) -> ResourceApiClient {
        let config = ResourceApiConfig::new().unwrap().base_url(&self.endpoint()).unwrap();
        ResourceApiClient::new_with_options(config, None).unwrap()
    }

    pub fn with_collection(self, id: &str, name: &str, parent_id: Option<&str>) -> Self {
        self.state.lock().unwrap().collections.push(json!({
            "collection_id": id,
            "collection_name": name,
            "parent_id": parent_id,
        }));
        self
    }

    pub fn with_file(self, collection_id: &str, file_id: &str, file_name: &str, content: &str) -> Self {
        self.state.lock().unwrap().files.push(FakeFile {
            collection_id: collection_id.into(),
            file_id: file_id.into(),
            file_name: file_name.into(),
            content: content.into(),
        });
        self
    }

    /// Answers the next request for `op` with `status` and `payload` instead of the usual handling.
    pub fn respond_once(&self, op: &str, status: StatusCode, payload: Value) {
        self.state.lock().unwrap().canned.insert(op.to_string(), (status, payload));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn ops(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.op).collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn collection_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .collections
            .iter()
            .filter_map(|c| c["collection_id"].as_str().map(str::to_string))
            .collect()
    }

    pub fn file(&self, file_id: &str) -> Option<(String, String, String)> {
        self.state
            .lock()
            .unwrap()
            .files
            .iter()
            .find(|f| f.file_id == file_id)
            .map(|f| (f.collection_id.clone(), f.file_name.clone(), f.content.clone()))
    }
}
