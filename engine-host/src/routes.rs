//! HTTP route handlers for the host API.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use engine::io::uploads::{FileCollection, UploadedFile};
use engine::{Endpoint, RequestEnv, UpdateRequest};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::identity::caller_from_headers;
use crate::state::AppState;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/components", get(list_components))
        .route("/components/{name}/update", post(update_component))
        .route("/components/{name}/upload", post(upload_component))
}

/// Multipart part carrying the JSON `UpdateRequest`; every other part is a file.
pub const REQUEST_PART: &str = "request";

type Rejection = (StatusCode, String);

async fn health() -> &'static str {
    "ok"
}

#[derive(Serialize)]
struct ComponentsResponse {
    components: Vec<ComponentEntry>,
}

#[derive(Serialize)]
struct ComponentEntry {
    name: String,
    fields: Vec<&'static str>,
    actions: Vec<String>,
}

/// GET /api/components - registered components with their fields and actions.
async fn list_components(State(state): State<AppState>) -> Json<ComponentsResponse> {
    let components = state
        .registry
        .iter()
        .map(|endpoint| ComponentEntry {
            name: endpoint.name().to_string(),
            fields: endpoint.field_names(),
            actions: endpoint
                .action_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect();
    Json(ComponentsResponse { components })
}

/// POST /api/components/:name/update - run one action and return the
/// `{update, script, result}` envelope.
async fn update_component(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateRequest>,
) -> Result<Response, Rejection> {
    let endpoint = find(&state, &name)?;
    apply(&state, &*endpoint, &name, &headers, &request, &FileCollection::new())
}

/// POST /api/components/:name/upload - same as `update`, with the request in
/// the `request` part and uploads in the remaining parts, keyed by part name.
async fn upload_component(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, Rejection> {
    let endpoint = find(&state, &name)?;

    let mut request = None;
    let mut files = FileCollection::new();
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let part = field.name().unwrap_or_default().to_string();
        if part == REQUEST_PART {
            let text = field.text().await.map_err(bad_request)?;
            let parsed: UpdateRequest = serde_json::from_str(&text).map_err(bad_request)?;
            request = Some(parsed);
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(bad_request)?;
        let mut file = UploadedFile::new(part, file_name, bytes.to_vec());
        file.content_type = content_type;
        files.push(file);
    }

    let request = request.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("missing `{REQUEST_PART}` part"),
        )
    })?;
    debug!(component = %name, files = files.len(), "multipart received");
    apply(&state, &*endpoint, &name, &headers, &request, &files)
}

fn find(state: &AppState, name: &str) -> Result<Arc<dyn Endpoint>, Rejection> {
    state.registry.get(name).cloned().ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("component `{name}` not found"),
        )
    })
}

fn bad_request(err: impl std::fmt::Display) -> Rejection {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn apply(
    state: &AppState,
    endpoint: &dyn Endpoint,
    name: &str,
    headers: &HeaderMap,
    request: &UpdateRequest,
    files: &FileCollection,
) -> Result<Response, Rejection> {
    let caller = caller_from_headers(headers);
    let env = RequestEnv::new(&caller, files);

    let mut body = Vec::new();
    if let Err(err) = endpoint.update(request, &env, &state.config, &mut body) {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        warn!(component = %name, action = %request.method, status = status.as_u16(), error = ?err, "update rejected");
        return Err((status, err.to_string()));
    }

    info!(component = %name, action = %request.method, bytes = body.len(), "update applied");
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::identity::{ROLES_HEADER, USER_HEADER};
    use axum::body::{Body, to_bytes};
    use axum::extract::FromRequest;
    use axum::http::{HeaderValue, Request};
    use engine::io::config::EngineConfig;
    use serde_json::{Value, json};

    fn state() -> AppState {
        AppState::new(demo::registry().expect("registry"), EngineConfig::default())
    }

    async fn call(
        component: &str,
        headers: HeaderMap,
        request: Value,
    ) -> (StatusCode, String) {
        let request: UpdateRequest = serde_json::from_value(request).expect("request");
        let outcome = update_component(
            State(state()),
            Path(component.to_string()),
            headers,
            Json(request),
        )
        .await;
        read(outcome).await
    }

    const BOUNDARY: &str = "engine-host-test";

    fn form(request: Option<Value>, files: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(request) = request {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{REQUEST_PART}\"\r\n\r\n{request}\r\n"
                )
                .as_bytes(),
            );
        }
        for (part, file_name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{part}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn upload(component: &str, body: Vec<u8>) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        let multipart = Multipart::from_request(request, &()).await.expect("multipart");
        let outcome = upload_component(
            State(state()),
            Path(component.to_string()),
            HeaderMap::new(),
            multipart,
        )
        .await;
        read(outcome).await
    }

    async fn read(outcome: Result<Response, Rejection>) -> (StatusCode, String) {
        let response = match outcome {
            Ok(response) => response,
            Err(rejection) => rejection.into_response(),
        };
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, String::from_utf8(bytes.to_vec()).expect("utf8"))
    }

    fn admin() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("root"));
        headers.insert(ROLES_HEADER, HeaderValue::from_static("admin"));
        headers
    }

    #[tokio::test]
    async fn increment_returns_envelope() {
        let (status, body) = call(
            "counter",
            HeaderMap::new(),
            json!({"data": {"count": 9, "step": 1, "history": []}, "props": {}, "method": "increment"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let envelope: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(
            envelope,
            json!({
                "update": {"count": 10, "history": [9]},
                "script": "alert('reached 10')",
                "result": null
            })
        );
    }

    #[tokio::test]
    async fn engine_errors_map_to_status_codes() {
        let (status, _) = call("counter", HeaderMap::new(), json!({"method": "reset"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut user = HeaderMap::new();
        user.insert(USER_HEADER, HeaderValue::from_static("ana"));
        let (status, body) = call(
            "counter",
            user,
            json!({"method": "set_step", "params": [2]}),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("`admin`"));

        let (status, _) = call("counter", HeaderMap::new(), json!({"method": "nope"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            "counter",
            HeaderMap::new(),
            json!({"method": "add", "params": ["lots"]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_can_change_step() {
        let (status, body) = call(
            "counter",
            admin(),
            json!({"method": "set_step", "params": ["5"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let envelope: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(envelope["update"], json!({"step": 5}));
        assert_eq!(envelope["script"], json!("console.log('step changed by root')"));
    }

    #[tokio::test]
    async fn profile_rename_reports_previous_name() {
        let (status, body) = call(
            "profile",
            HeaderMap::new(),
            json!({"data": {"name": "Ana"}, "method": "rename", "params": ["Bea"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&body).expect("json"),
            json!({"update": {"name": "Bea"}, "script": "", "result": {"previous": "Ana"}})
        );
    }

    #[tokio::test]
    async fn unknown_component_is_not_found() {
        let (status, body) = call("missing", HeaderMap::new(), json!({"method": "x"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("missing"));
    }

    #[tokio::test]
    async fn list_components_includes_actions() {
        let Json(listing) = list_components(State(state())).await;
        let names: Vec<_> = listing.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["counter", "profile"]);
        assert_eq!(
            listing.components[0].actions,
            vec!["add", "increment", "reset", "set_step"]
        );
        assert_eq!(
            listing.components[1].fields,
            vec!["name", "tier", "address", "tags", "avatar"]
        );
    }

    #[tokio::test]
    async fn increment_overflow_is_a_server_error() {
        let (status, body) = call(
            "counter",
            HeaderMap::new(),
            json!({"data": {"count": i64::MAX}, "method": "increment"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("increment"));
    }

    #[tokio::test]
    async fn upload_binds_file_parts() {
        let body = form(
            Some(json!({"data": {"name": "Ana"}, "method": "set_avatar", "params": ["avatar"]})),
            &[("avatar", "me.png", &b"\x89PNG"[..])],
        );
        let (status, body) = upload("profile", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&body).expect("json"),
            json!({"update": {"avatar": "me.png"}, "script": "", "result": {"bytes": 4}})
        );
    }

    #[tokio::test]
    async fn upload_without_matching_file_is_bad_request() {
        let body = form(
            Some(json!({"method": "set_avatar", "params": ["avatar"]})),
            &[("other", "x.txt", &b"x"[..])],
        );
        let (status, body) = upload("profile", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("`avatar`"));
    }

    #[tokio::test]
    async fn upload_requires_request_part() {
        let body = form(None, &[("avatar", "me.png", &b"png"[..])]);
        let (status, body) = upload("profile", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains(REQUEST_PART));
    }
}
