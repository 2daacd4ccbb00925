//! Test fixtures shared across modules: a scripted transport, an in-memory
//! event sink and an in-process fake portal for the real HTTP client.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{FixedOffset, NaiveTime};
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::config::Config;
use crate::journal::{EventSink, SequenceEvent};
use crate::portal::{
    LoginRequest, PortalResponse, PortalTransport, ProfileUpdateRequest, TransportError,
    UploadForm,
};
use crate::refresh::SessionState;

pub const TEST_FORM_KEY: &str = "FORM-1";
pub const TEST_FILE_KEY: &str = "FILE-1";

pub fn test_config(resume_path: &Path) -> Config {
    Config {
        resume_path: resume_path.to_path_buf(),
        log_file_path: resume_path.with_file_name("update.log"),
        email: "user@example.com".to_string(),
        password: "secret".to_string(),
        profile_id: "profile-1".to_string(),
        form_key: TEST_FORM_KEY.to_string(),
        file_key: TEST_FILE_KEY.to_string(),
        login_url: "http://portal.invalid/login".to_string(),
        upload_url: "http://portal.invalid/file".to_string(),
        profile_base_url: "http://portal.invalid/profiles".to_string(),
        allow_file_key_fallback: false,
        http_timeout_secs: 5,
        schedule_times: vec![
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(8, 45, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        ],
        schedule_utc_offset: FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub fn write_resume(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"PK\x03\x04 fake docx bytes").unwrap();
    path
}

pub fn login_ok(token: &str, set_cookies: &[&str]) -> PortalResponse {
    PortalResponse {
        status: 200,
        set_cookies: set_cookies.iter().map(|c| c.to_string()).collect(),
        body: json!({
            "cookies": [
                {"name": "nauk_rt", "value": "refresh-token"},
                {"name": "nauk_at", "value": token}
            ]
        })
        .to_string(),
    }
}

pub fn upload_ok(file_key: &str, reference: &str) -> PortalResponse {
    let mut body = serde_json::Map::new();
    body.insert(file_key.to_string(), json!({ "fileKey": reference }));
    PortalResponse {
        status: 200,
        set_cookies: vec![],
        body: Value::Object(body).to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Event sink
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<SequenceEvent>>,
}

impl MemorySink {
    pub fn events(&self) -> Vec<SequenceEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: SequenceEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted transport
// ────────────────────────────────────────────────────────────────────────────

type Scripted = Result<PortalResponse, String>;

/// Transport that replays queued responses per endpoint and records every
/// request. When a queue is empty it answers with a success response.
#[derive(Default)]
pub struct MockTransport {
    logins: Mutex<VecDeque<Scripted>>,
    uploads: Mutex<VecDeque<Scripted>>,
    profiles: Mutex<VecDeque<Scripted>>,
    login_gate: Option<Arc<Notify>>,
    login_requests: Mutex<Vec<LoginRequest>>,
    upload_forms: Mutex<Vec<UploadForm>>,
    profile_updates: Mutex<Vec<(String, String, ProfileUpdateRequest)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login(self, response: PortalResponse) -> Self {
        self.logins.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_login_error(self, message: &str) -> Self {
        self.logins.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    /// Login blocks until the gate is notified.
    pub fn with_login_gate(mut self, gate: Arc<Notify>) -> Self {
        self.login_gate = Some(gate);
        self
    }

    pub fn with_upload(self, response: PortalResponse) -> Self {
        self.uploads.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_profile(self, response: PortalResponse) -> Self {
        self.profiles.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_profile_error(self, message: &str) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn login_calls(&self) -> usize {
        self.login_requests.lock().unwrap().len()
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_forms.lock().unwrap().len()
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_updates.lock().unwrap().len()
    }

    pub fn last_login(&self) -> Option<LoginRequest> {
        self.login_requests.lock().unwrap().last().cloned()
    }

    pub fn last_upload(&self) -> Option<UploadForm> {
        self.upload_forms.lock().unwrap().last().cloned()
    }

    /// `(bearer token, cookie header, body)` of every profile update, in order.
    pub fn profile_updates(&self) -> Vec<(String, String, ProfileUpdateRequest)> {
        self.profile_updates.lock().unwrap().clone()
    }

    pub fn last_profile_update(&self) -> Option<(String, String, ProfileUpdateRequest)> {
        self.profile_updates.lock().unwrap().last().cloned()
    }

    fn next(queue: &Mutex<VecDeque<Scripted>>, default: PortalResponse) -> Scripted {
        queue.lock().unwrap().pop_front().unwrap_or(Ok(default))
    }
}

fn replay(scripted: Scripted) -> Result<PortalResponse, TransportError> {
    scripted.map_err(TransportError::InvalidRequest)
}

#[async_trait]
impl PortalTransport for MockTransport {
    async fn login(&self, request: &LoginRequest) -> Result<PortalResponse, TransportError> {
        self.login_requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.login_gate {
            gate.notified().await;
        }
        replay(Self::next(
            &self.logins,
            login_ok("tok-default", &["nauk_at=tok-default; Path=/"]),
        ))
    }

    async fn upload(&self, form: UploadForm) -> Result<PortalResponse, TransportError> {
        let file_key = form.file_key.clone();
        self.upload_forms.lock().unwrap().push(form);
        replay(Self::next(&self.uploads, upload_ok(&file_key, "U-default")))
    }

    async fn update_profile(
        &self,
        session: &SessionState,
        request: &ProfileUpdateRequest,
    ) -> Result<PortalResponse, TransportError> {
        self.profile_updates.lock().unwrap().push((
            session.auth_token().to_string(),
            session.cookie_header().to_string(),
            request.clone(),
        ));
        replay(Self::next(
            &self.profiles,
            PortalResponse {
                status: 200,
                set_cookies: vec![],
                body: r#"{"profile":"updated"}"#.to_string(),
            },
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fake portal (real HTTP, in process)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CapturedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct Captured {
    pub login_body: Option<Value>,
    pub login_appid: Option<String>,
    pub upload_fields: Vec<CapturedField>,
    pub upload_had_authorization: bool,
    pub profile_path: Option<String>,
    pub profile_method_override: Option<String>,
    pub profile_authorization: Option<String>,
    pub profile_cookie: Option<String>,
    pub profile_body: Option<Value>,
}

#[derive(Clone, Default)]
struct FakeState {
    captured: Arc<Mutex<Captured>>,
    login_failure: Arc<Mutex<Option<(u16, String)>>>,
}

pub struct FakePortal {
    addr: SocketAddr,
    state: FakeState,
    server: tokio::task::JoinHandle<()>,
}

impl FakePortal {
    pub async fn start() -> Self {
        let state = FakeState::default();
        let app = Router::new()
            .route("/login", post(fake_login))
            .route("/file", post(fake_upload))
            .route("/profiles/:id/advResume", post(fake_profile))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Rewrites the portal URLs in `config` to this fake.
    pub fn point(&self, config: &mut Config) {
        config.login_url = format!("http://{}/login", self.addr);
        config.upload_url = format!("http://{}/file", self.addr);
        config.profile_base_url = format!("http://{}/profiles", self.addr);
    }

    pub fn captured(&self) -> Captured {
        self.state.captured.lock().unwrap().clone()
    }

    pub fn fail_login_with(&self, status: u16, body: &str) {
        *self.state.login_failure.lock().unwrap() = Some((status, body.to_string()));
    }
}

impl Drop for FakePortal {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn fake_login(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    {
        let mut captured = state.captured.lock().unwrap();
        captured.login_body = Some(body);
        captured.login_appid = header(&headers, "appid");
    }

    if let Some((status, body)) = state.login_failure.lock().unwrap().clone() {
        return Response::builder()
            .status(StatusCode::from_u16(status).unwrap())
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
    }

    let body = json!({
        "cookies": [
            {"name": "nauk_at", "value": "tok-abc"},
            {"name": "nauk_rt", "value": "r1"}
        ]
    });
    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json")
        .header("set-cookie", "nauk_at=tok-abc; Path=/; HttpOnly")
        .header("set-cookie", "nauk_rt=r1; Path=/")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn fake_upload(
    State(state): State<FakeState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Json<Value> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        fields.push(CapturedField {
            name,
            file_name,
            content_type,
            data,
        });
    }

    let file_key = fields
        .iter()
        .find(|f| f.name == "fileKey")
        .map(|f| String::from_utf8_lossy(&f.data).into_owned())
        .unwrap_or_default();

    {
        let mut captured = state.captured.lock().unwrap();
        captured.upload_had_authorization = headers.contains_key("authorization");
        captured.upload_fields = fields;
    }

    let mut body = serde_json::Map::new();
    body.insert(file_key, json!({ "fileKey": "U-fake-1" }));
    Json(Value::Object(body))
}

async fn fake_profile(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut captured = state.captured.lock().unwrap();
    captured.profile_path = Some(uri.path().to_string());
    captured.profile_method_override = header(&headers, "x-http-method-override");
    captured.profile_authorization = header(&headers, "authorization");
    captured.profile_cookie = header(&headers, "cookie");
    captured.profile_body = Some(body);
    Json(json!({"profile": {"resumeUpdated": true}}))
}
