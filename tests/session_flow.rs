//! Integration tests for the full upload flow against an in-process mock of
//! the inference service.
//!
//! The mock is a small axum router bound to an ephemeral port on 127.0.0.1.
//! Each test scripts the responses it needs (status, delay, body) in arrival
//! order and inspects what the mock received afterwards.
//!
//! Run with:
//!   cargo test --test session_flow -- --nocapture

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use fieldsense::pipeline::render::NO_DATA;
use fieldsense::{
    export_json, ClientConfig, ConfidenceTier, DocumentData, ExtractionReport, FieldCatalog,
    FieldSenseError, InferenceClient, NoopProgressCallback, ProgressCallback, ProgressCallbackRef,
    ProgressScript, Resolution, Session, UploadFile, UploadState,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── Mock inference service ───────────────────────────────────────────────────

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    delay: Duration,
    body: String,
}

impl Reply {
    fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            delay: Duration::ZERO,
            body: body.to_string(),
        }
    }

    fn status(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            ..Self::ok(body)
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// One multipart part as seen by the mock.
#[derive(Debug, Clone)]
struct Received {
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    len: usize,
}

#[derive(Clone)]
struct Mock {
    replies: Arc<Vec<Reply>>,
    hits: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Vec<Received>>>>,
}

impl Mock {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn analyze(State(mock): State<Mock>, mut multipart: Multipart) -> (StatusCode, String) {
    let index = mock.hits.fetch_add(1, Ordering::SeqCst);
    let reply = mock.replies[index.min(mock.replies.len() - 1)].clone();

    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        parts.push(Received {
            field: name,
            file_name,
            content_type,
            len,
        });
    }
    mock.received.lock().unwrap().push(parts);

    tokio::time::sleep(reply.delay).await;
    (reply.status, reply.body)
}

async fn spawn_mock(replies: Vec<Reply>) -> (String, Mock) {
    let mock = Mock {
        replies: Arc::new(replies),
        hits: Arc::new(AtomicUsize::new(0)),
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/analyze", post(analyze))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (format!("http://{addr}"), mock)
}

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Route library logs through the test harness; `RUST_LOG=debug` shows them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client_for(endpoint: &str) -> InferenceClient {
    init_tracing();
    let config = ClientConfig::builder()
        .endpoint(endpoint)
        .request_timeout_secs(5)
        .retry_backoff_ms(50)
        .build()
        .expect("valid config");
    InferenceClient::new(&config).expect("client")
}

fn png_upload(name: &str) -> UploadFile {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 6, Rgba([20, 40, 60, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    UploadFile::new(name, "image/png", buf)
}

fn results_json(records: &[(&str, f64, &str)]) -> String {
    let results: Vec<serde_json::Value> = records
        .iter()
        .map(|(class_id, confidence, text)| {
            serde_json::json!({
                "class_id": class_id,
                "bbox": [10.0, 20.0, 110.0, 60.0],
                "confidence": confidence,
                "text": text,
            })
        })
        .collect();
    serde_json::json!({ "results": results }).to_string()
}

fn noop() -> ProgressCallbackRef {
    Arc::new(NoopProgressCallback)
}

#[derive(Default)]
struct Recorder {
    ticks: Mutex<Vec<u8>>,
    done: AtomicUsize,
}

impl ProgressCallback for Recorder {
    fn on_tick(&self, percent: u8) {
        self.ticks.lock().unwrap().push(percent);
    }
    fn on_done(&self) {
        self.done.fetch_add(1, Ordering::SeqCst);
    }
}

fn completed(state: UploadState) -> DocumentData {
    match state {
        UploadState::Completed(extraction) => extraction.document,
        other => panic!("expected Completed, got {other:?}"),
    }
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_field_renders_bank_row() {
    let (url, mock) = spawn_mock(vec![Reply::ok(&results_json(&[("bank", 0.92, "HBL")]))]).await;
    let client = client_for(&url);
    let session = Session::new();
    let recorder = Arc::new(Recorder::default());

    let resolution = session
        .upload(
            &client,
            png_upload("service-log.png"),
            &ProgressScript::default(),
            recorder.clone(),
        )
        .await
        .expect("upload accepted");
    assert!(matches!(resolution, Resolution::Applied(UploadState::Completed(_))));

    let doc = completed(session.state());
    let report = ExtractionReport::new(&doc, FieldCatalog::field_service());
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].label, "Bank Name");
    assert_eq!(report.rows[0].value(), "HBL");
    assert_eq!(report.rows[0].badge, "92.0%");
    assert_eq!(report.rows[0].tier, ConfidenceTier::High);
    assert_eq!(report.stats.fields_detected, 1);
    assert_eq!(report.stats.average_badge(), "92.0%");

    assert_eq!(mock.hits(), 1, "accepted file is submitted exactly once");
    assert_eq!(recorder.done.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.ticks.lock().unwrap().last(), Some(&100));
    assert!(session.preview().is_some());
}

#[tokio::test]
async fn request_is_single_multipart_file_part() {
    let (url, mock) = spawn_mock(vec![Reply::ok(r#"{"results":[]}"#)]).await;
    let client = client_for(&url);
    let upload = png_upload("branch-0412.png");
    let size = upload.bytes.len();

    Session::new()
        .upload(&client, upload, &ProgressScript::default(), noop())
        .await
        .expect("upload accepted");

    let received = mock.received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let parts = &received[0];
    assert_eq!(parts.len(), 1, "exactly one part: {parts:?}");
    assert_eq!(parts[0].field, "file");
    assert_eq!(parts[0].file_name.as_deref(), Some("branch-0412.png"));
    assert_eq!(parts[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(parts[0].len, size);
}

#[tokio::test]
async fn empty_text_shows_no_data_marker() {
    let (url, _mock) = spawn_mock(vec![Reply::ok(&results_json(&[("city", 0.45, "")]))]).await;
    let client = client_for(&url);
    let session = Session::new();

    session
        .upload(&client, png_upload("log.png"), &ProgressScript::default(), noop())
        .await
        .expect("upload accepted");

    let doc = completed(session.state());
    let report = ExtractionReport::new(&doc, FieldCatalog::field_service());
    assert_eq!(report.rows[0].value(), NO_DATA);
    assert_eq!(report.rows[0].tier, ConfidenceTier::Low);
    assert_eq!(report.stats.fields_detected, 0);
}

#[tokio::test]
async fn partially_bad_response_is_salvaged() {
    let body = r#"{"results":[
        {"class_id":"bank","bbox":[0,0,1,1],"confidence":0.9,"text":"MCB"},
        {"class_id":"city","bbox":[0,0,1],"confidence":0.9,"text":"Karachi"},
        {"class_id":"model","bbox":[0,0,1,1],"confidence":0.7,"text":"NCR 6622"}
    ]}"#;
    let (url, _mock) = spawn_mock(vec![Reply::ok(body)]).await;
    let session = Session::new();

    session
        .upload(&client_for(&url), png_upload("log.png"), &ProgressScript::default(), noop())
        .await
        .expect("upload accepted");

    match session.state() {
        UploadState::Completed(extraction) => {
            let ids: Vec<&str> = extraction
                .document
                .results
                .iter()
                .map(|r| r.class_id.as_str())
                .collect();
            assert_eq!(ids, ["bank", "model"]);
            assert_eq!(extraction.rejected.len(), 1);
            assert_eq!(extraction.rejected[0].index, 1);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn results_export_round_trips() {
    let body = results_json(&[("model", 0.81, "NCR 6622"), ("technician_name", 0.66, "A. Khan")]);
    let (url, _mock) = spawn_mock(vec![Reply::ok(&body)]).await;
    let session = Session::new();
    session
        .upload(&client_for(&url), png_upload("log.png"), &ProgressScript::default(), noop())
        .await
        .expect("upload accepted");
    let doc = completed(session.state());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(fieldsense::DEFAULT_EXPORT_FILENAME);
    export_json(&doc, &path).await.expect("export");

    let back: DocumentData =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back, doc);
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn server_error_fails_then_reset_clears() {
    let (url, mock) = spawn_mock(vec![Reply::status(
        StatusCode::INTERNAL_SERVER_ERROR,
        "model crashed",
    )])
    .await;
    let session = Session::new();
    let recorder = Arc::new(Recorder::default());

    session
        .upload(&client_for(&url), png_upload("log.png"), &ProgressScript::default(), recorder.clone())
        .await
        .expect("upload accepted");

    match session.state() {
        UploadState::Failed(message) => {
            assert_eq!(message, "API request failed with status 500");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(mock.hits(), 1, "HTTP errors are not retried");
    assert_eq!(recorder.done.load(Ordering::SeqCst), 0);

    session.reset();
    assert_eq!(session.state(), UploadState::Idle);
    assert!(session.preview().is_none());
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let (url, _mock) = spawn_mock(vec![Reply::ok("<html>upstream error</html>")]).await;
    let session = Session::new();

    session
        .upload(&client_for(&url), png_upload("log.png"), &ProgressScript::default(), noop())
        .await
        .expect("upload accepted");

    match session.state() {
        UploadState::Failed(message) => assert!(message.contains("Malformed"), "{message}"),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_shape_is_malformed() {
    let (url, _mock) = spawn_mock(vec![Reply::ok(r#"{"detections":[]}"#)]).await;
    let client = client_for(&url);
    let upload = fieldsense::accept(png_upload("log.png")).unwrap();

    let err = client.submit(&upload).await.unwrap_err();
    assert!(matches!(err, FieldSenseError::MalformedResponse { .. }));
}

#[tokio::test]
async fn rejected_file_is_never_submitted() {
    let (url, mock) = spawn_mock(vec![Reply::ok(r#"{"results":[]}"#)]).await;
    let session = Session::new();

    let err = session
        .upload(
            &client_for(&url),
            UploadFile::new("report.pdf", "application/pdf", b"%PDF-1.7".to_vec()),
            &ProgressScript::default(),
            noop(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FieldSenseError::InvalidFileType { .. }));
    assert_eq!(session.state(), UploadState::Idle);
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn unreachable_endpoint_fails_with_network_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = client_for(&format!("http://127.0.0.1:{port}"));
    let upload = fieldsense::accept(png_upload("log.png")).unwrap();
    let err = client.submit(&upload).await.unwrap_err();
    assert!(
        matches!(err, FieldSenseError::NetworkUnavailable { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn timeout_is_retried_once() {
    let body = results_json(&[("bank", 0.92, "HBL")]);
    let (url, mock) = spawn_mock(vec![
        Reply::ok(&body).delayed(Duration::from_secs(3)),
        Reply::ok(&body),
    ])
    .await;
    let config = ClientConfig::builder()
        .endpoint(url)
        .request_timeout_secs(1)
        .retry_backoff_ms(10)
        .build()
        .unwrap();
    let client = InferenceClient::new(&config).unwrap();
    let upload = fieldsense::accept(png_upload("log.png")).unwrap();

    let extraction = client.submit(&upload).await.expect("second attempt succeeds");
    assert_eq!(extraction.document.results[0].text, "HBL");
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn timeout_without_retry_budget_fails() {
    let (url, mock) = spawn_mock(vec![
        Reply::ok(r#"{"results":[]}"#).delayed(Duration::from_secs(3)),
    ])
    .await;
    let config = ClientConfig::builder()
        .endpoint(url)
        .request_timeout_secs(1)
        .max_retries(0)
        .build()
        .unwrap();
    let client = InferenceClient::new(&config).unwrap();
    let upload = fieldsense::accept(png_upload("log.png")).unwrap();

    let err = client.submit(&upload).await.unwrap_err();
    assert!(matches!(err, FieldSenseError::RequestTimeout { secs: 1, .. }), "got {err:?}");
    assert_eq!(mock.hits(), 1);
}

// ── Single flight ────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_upload_supersedes_first() {
    let (url, mock) = spawn_mock(vec![
        Reply::ok(&results_json(&[("bank", 0.9, "OLD")])).delayed(Duration::from_millis(800)),
        Reply::ok(&results_json(&[("bank", 0.9, "NEW")])),
    ])
    .await;
    let client = Arc::new(client_for(&url));
    let session = Arc::new(Session::new());

    let first = {
        let (client, session) = (client.clone(), session.clone());
        tokio::spawn(async move {
            session
                .upload(&client, png_upload("first.png"), &ProgressScript::default(), noop())
                .await
        })
    };

    // Wait until the first request is on the wire.
    for _ in 0..200 {
        if mock.hits() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(mock.hits(), 1);

    let second = session
        .upload(&client, png_upload("second.png"), &ProgressScript::default(), noop())
        .await
        .expect("second upload accepted");
    assert!(matches!(second, Resolution::Applied(UploadState::Completed(_))));

    let first = first.await.expect("task").expect("first upload accepted");
    assert!(matches!(first, Resolution::Stale { .. }), "got {first:?}");

    // Give the abandoned response time to arrive; it must not be applied.
    tokio::time::sleep(Duration::from_millis(900)).await;
    let doc = completed(session.state());
    assert_eq!(doc.results[0].text, "NEW");
}

#[tokio::test]
async fn in_flight_upload_is_processing() {
    let (url, mock) = spawn_mock(vec![
        Reply::ok(&results_json(&[("bank", 0.9, "HBL")])).delayed(Duration::from_millis(300)),
    ])
    .await;
    let client = Arc::new(client_for(&url));
    let session = Arc::new(Session::new());

    let task = {
        let (client, session) = (client.clone(), session.clone());
        tokio::spawn(async move {
            session
                .upload(&client, png_upload("log.png"), &ProgressScript::default(), noop())
                .await
        })
    };

    for _ in 0..200 {
        if mock.hits() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(mock.hits(), 1);
    assert_eq!(session.state(), UploadState::Processing);
    assert!(session.state().is_in_flight());

    let resolution = task.await.expect("task").expect("accepted");
    assert!(matches!(resolution, Resolution::Applied(UploadState::Completed(_))));
}

#[tokio::test]
async fn reset_abandons_in_flight_upload() {
    let (url, _mock) = spawn_mock(vec![
        Reply::ok(&results_json(&[("bank", 0.9, "LATE")])).delayed(Duration::from_millis(500)),
    ])
    .await;
    let client = Arc::new(client_for(&url));
    let session = Arc::new(Session::new());

    let task = {
        let (client, session) = (client.clone(), session.clone());
        tokio::spawn(async move {
            session
                .upload(&client, png_upload("log.png"), &ProgressScript::default(), noop())
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.reset();

    let resolution = task.await.expect("task").expect("accepted");
    assert!(matches!(resolution, Resolution::Stale { .. }));
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(session.state(), UploadState::Idle);
}
