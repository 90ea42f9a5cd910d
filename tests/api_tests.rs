//! Router-level tests: real store on a temp dir, stub classifier

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use uuid::Uuid;

use notecheck::{
    classifier::{Classifier, ClassifierError},
    config::Config,
    create_router,
    handlers::auth::AdminCredentials,
    models::{AuditAction, NewScan, Verdict},
    pipeline::ScanPipeline,
    store::ScanStore,
    AppState,
};

const BOUNDARY: &str = "notecheck-test-boundary";

struct FixedScore(f32);

impl Classifier for FixedScore {
    fn classify(&self, _input: &Array4<f32>) -> Result<f32, ClassifierError> {
        Ok(self.0)
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

struct TestApp {
    _dir: TempDir,
    state: AppState,
}

impl TestApp {
    fn new(score: Option<f32>) -> Self {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().join("data"),
            upload_dir: dir.path().join("uploads"),
            model_path: dir.path().join("missing.onnx"),
            model_info_path: dir.path().join("missing.json"),
            history_page_size: 2,
            jwt_secret: "test-secret".to_string(),
            ..Config::default()
        };

        let store = Arc::new(ScanStore::open(config.history_path(), config.audit_path()).unwrap());
        let classifier = score.map(|s| Arc::new(FixedScore(s)) as Arc<dyn Classifier>);
        let credentials = AdminCredentials::from_config(&config).unwrap();

        let state = AppState {
            pipeline: ScanPipeline::new(store.clone(), classifier),
            store,
            credentials: Arc::new(credentials),
            config: Arc::new(config),
        };

        Self { _dir: dir, state }
    }

    fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    fn token(&self) -> String {
        notecheck::handlers::auth::generate_jwt("admin", "test-secret", 1).unwrap()
    }

    fn seed(&self, filename: &str, result: Verdict, confidence: f64) -> Uuid {
        self.state
            .store
            .record_scan(NewScan {
                filename: filename.to_string(),
                result,
                confidence,
                raw_score: confidence / 100.0,
                reasons: Vec::new(),
            })
            .unwrap()
            .id
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(router, request).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn authed(method: &str, uri: &str, token: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
}

fn stored_uploads(app: &TestApp) -> Vec<String> {
    match std::fs::read_dir(&app.state.config.upload_dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn json_body(value: Value) -> Body {
    Body::from(serde_json::to_vec(&value).unwrap())
}

fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    RgbImage::from_pixel(32, 32, Rgb([90, 140, 60]))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn multipart_upload(filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/v1/scans")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(None);
    let (status, body) = send_json(
        app.router(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_login_success_and_failure_are_audited() {
    let app = TestApp::new(None);

    let bad = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(json_body(json!({ "username": "admin", "password": "nope" })))
        .unwrap();
    let (status, body) = send_json(app.router(), bad).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let good = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(json_body(json!({ "username": "admin", "password": "admin123" })))
        .unwrap();
    let (status, body) = send_json(app.router(), good).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let actions: Vec<AuditAction> = app.state.store.audit_entries().iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AuditAction::Login, AuditAction::LoginFail]);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = TestApp::new(None);

    let (status, _) = send_json(
        app.router(),
        Request::builder().uri("/api/v1/admin/dashboard").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        app.router(),
        authed("GET", "/api/v1/admin/dashboard", "garbage").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_json(
        app.router(),
        authed("GET", "/api/v1/admin/dashboard", &app.token()).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_scans"], 0);
    assert_eq!(body["model_info"]["status"], "Not Found");
}

#[tokio::test]
async fn test_predict_persists_record() {
    let app = TestApp::new(Some(0.1));
    let (status, body) = send_json(app.router(), multipart_upload("my note.png", &png_bytes())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "FAKE");
    assert_eq!(body["filename"], "my_note.png");
    let id = body["id"].as_str().unwrap();
    assert_eq!(body["image_url"], format!("/uploads/{}_my_note.png", id));
    assert!(!body["reasons"].as_array().unwrap().is_empty());

    let records = app.state.store.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].result, Verdict::Fake);
    assert!(app.state.store.audit_entries().is_empty());
}

#[tokio::test]
async fn test_predict_rejects_bad_uploads() {
    let app = TestApp::new(Some(0.9));

    let (status, _) = send_json(app.router(), multipart_upload("note.gif", &png_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(app.router(), multipart_upload("note.jpg", b"not an image")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(app.state.store.snapshot().is_empty());
    assert!(stored_uploads(&app).is_empty());
}

#[tokio::test]
async fn test_predict_without_model_is_unavailable() {
    let app = TestApp::new(None);
    let (status, _) = send_json(app.router(), multipart_upload("note.png", &png_bytes())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(app.state.store.snapshot().is_empty());
    assert!(stored_uploads(&app).is_empty());
}

#[tokio::test]
async fn test_same_name_uploads_keep_their_own_image() {
    let app = TestApp::new(Some(0.9));
    let (_, first) = send_json(app.router(), multipart_upload("note.png", &png_bytes())).await;
    let (_, second) = send_json(app.router(), multipart_upload("note.png", &png_bytes())).await;

    assert_eq!(first["filename"], "note.png");
    assert_eq!(second["filename"], "note.png");
    assert_ne!(first["image_url"], second["image_url"]);

    let mut stored = stored_uploads(&app);
    stored.sort();
    let mut expected = vec![
        format!("{}_note.png", first["id"].as_str().unwrap()),
        format!("{}_note.png", second["id"].as_str().unwrap()),
    ];
    expected.sort();
    assert_eq!(stored, expected);

    let (status, bytes) = send(
        app.router(),
        Request::builder().uri(first["image_url"].as_str().unwrap()).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, png_bytes());
}

#[tokio::test]
async fn test_visuals_lookup() {
    let app = TestApp::new(Some(0.9));
    let (_, scan) = send_json(app.router(), multipart_upload("note.png", &png_bytes())).await;
    let stored = scan["image_url"].as_str().unwrap().trim_start_matches("/uploads/").to_string();

    let (status, body) = send_json(
        app.router(),
        Request::builder()
            .uri(format!("/api/v1/scans/visuals?filename={}", stored))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["heatmap"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));

    let (status, _) = send_json(
        app.router(),
        Request::builder().uri("/api/v1/scans/visuals").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        app.router(),
        Request::builder().uri("/api/v1/scans/visuals?filename=ghost.png").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verify_flow() {
    let app = TestApp::new(None);
    let id = app.seed("n.jpg", Verdict::Fake, 72.0);
    let token = app.token();

    let (status, _) = send_json(
        app.router(),
        authed("POST", "/api/v1/verify", &token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(json_body(json!({ "record_id": id.to_string() })))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        app.router(),
        authed("POST", "/api/v1/verify", &token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(json_body(json!({ "record_id": Uuid::new_v4().to_string(), "status": "REAL" })))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        app.router(),
        authed("POST", "/api/v1/verify", &token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(json_body(json!({ "record_id": id.to_string(), "status": "real" })))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previous_result"], "FAKE");
    assert_eq!(body["record"]["confidence"], 100.0);
    assert_eq!(body["record"]["verified_by_admin"], true);

    // verified REAL drops off the worklist
    let (_, risk) = send_json(
        app.router(),
        authed("GET", "/api/v1/admin/risk", &token).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(risk["total"], 0);

    let entries = app.state.store.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Verify);
}

#[tokio::test]
async fn test_history_pagination_and_filter() {
    let app = TestApp::new(None);
    app.seed("a.jpg", Verdict::Real, 95.0);
    app.seed("b.jpg", Verdict::Fake, 80.0);
    app.seed("c.jpg", Verdict::Real, 91.0);
    let token = app.token();

    let (status, body) = send_json(
        app.router(),
        authed("GET", "/api/v1/history?page=2", &token).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["records"][0]["filename"], "a.jpg");

    let (_, body) = send_json(
        app.router(),
        authed("GET", "/api/v1/history?result=FAKE", &token).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["records"][0]["filename"], "b.jpg");

    let (_, body) = send_json(
        app.router(),
        authed("GET", "/api/v1/history?page=9", &token).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(body["records"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_csv_export_is_audited() {
    let app = TestApp::new(None);
    app.seed("note.jpg", Verdict::Fake, 66.666);

    let response = app
        .router()
        .oneshot(
            authed("GET", "/api/v1/history/export?format=csv", &app.token())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("Timestamp,Filename,Result,Confidence,Reasons"));
    assert!(text.contains("note.jpg,FAKE,66.67"));

    let entries = app.state.store.audit_entries();
    assert_eq!(entries[0].action, AuditAction::Export);
    assert_eq!(entries[0].details, "History exported as CSV");
}

#[tokio::test]
async fn test_delete_and_clear() {
    let app = TestApp::new(None);
    let id = app.seed("a.jpg", Verdict::Real, 95.0);
    app.seed("b.jpg", Verdict::Fake, 80.0);
    let token = app.token();

    let uri = format!("/api/v1/history/{}", id);
    for _ in 0..2 {
        let (status, _) = send_json(app.router(), authed("DELETE", &uri, &token).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(app.state.store.snapshot().len(), 1);

    let (status, body) = send_json(
        app.router(),
        authed("DELETE", "/api/v1/history", &token).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);
    assert!(app.state.store.snapshot().is_empty());

    let actions: Vec<AuditAction> = app.state.store.audit_entries().iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AuditAction::ClearHistory, AuditAction::Delete, AuditAction::Delete]);
}
