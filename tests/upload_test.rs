//! HTTP-level tests for the upload route

use std::fs::File;
use std::io::Read;
use std::path::Path;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;

use archive_upload_server::config::Config;
use archive_upload_server::state::AppState;

struct TestApp {
    server: TestServer,
    dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with_memory_limit(8 * 1024 * 1024)
    }

    fn with_memory_limit(max_multipart_memory: usize) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.public_dir = dir.path().join("public");
        config.upload.max_multipart_memory = max_multipart_memory;

        let server = TestServer::new(archive_upload_server::app(AppState::new(config))).unwrap();
        Self { server, dir }
    }

    fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }
}

fn file_part(name: &str, data: impl Into<Vec<u8>>) -> Part {
    Part::bytes(data.into())
        .file_name(name)
        .mime_type("application/octet-stream")
}

fn read_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            (entry.name().to_string(), data)
        })
        .collect()
}

#[tokio::test]
async fn test_upload_two_files() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .add_text("name", "batch1")
        .add_part("files", file_part("a.txt", "hello"))
        .add_part("files", file_part("sub/b.txt", "world"));

    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "All files zipped successfully");
    assert_eq!(
        read_entries(&app.upload_dir().join("batch1.zip")),
        vec![
            ("a.txt".to_string(), b"hello".to_vec()),
            ("b.txt".to_string(), b"world".to_vec()),
        ]
    );
}

#[tokio::test]
async fn test_name_after_files() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .add_part("files", file_part("late.txt", "name comes last"))
        .add_text("name", "ordered");

    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(app.upload_dir().join("ordered.zip").is_file());
}

#[tokio::test]
async fn test_no_files_is_bad_request() {
    let app = TestApp::new();

    let form = MultipartForm::new().add_text("name", "empty");
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "no files uploaded");
    assert!(!app.upload_dir().join("empty.zip").exists());
}

#[tokio::test]
async fn test_files_field_without_filename_is_not_a_file() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .add_text("name", "values")
        .add_text("files", "just a value");
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(!app.upload_dir().exists());
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let app = TestApp::new();

    let response = app.server.post("/upload").text("name=batch1").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(!app.upload_dir().exists());
}

#[tokio::test]
async fn test_missing_name_is_bad_request() {
    let app = TestApp::new();

    let form = MultipartForm::new().add_part("files", file_part("a.txt", "a"));
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(!app.upload_dir().exists());
}

#[tokio::test]
async fn test_traversal_name_is_rejected() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .add_text("name", "../escaped")
        .add_part("files", file_part("a.txt", "a"));
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(!app.dir.path().join("escaped.zip").exists());
}

#[tokio::test]
async fn test_traversal_filename_becomes_base_name() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .add_text("name", "slip")
        .add_part("files", file_part("../../etc/passwd", "root:x:0:0"));
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let entries = read_entries(&app.upload_dir().join("slip.zip"));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "passwd");
}

#[tokio::test]
async fn test_same_name_overwrites() {
    let app = TestApp::new();

    for body in ["first", "second"] {
        let form = MultipartForm::new()
            .add_text("name", "again")
            .add_part("files", file_part(&format!("{body}.txt"), body));
        let response = app.server.post("/upload").multipart(form).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    assert_eq!(
        read_entries(&app.upload_dir().join("again.zip")),
        vec![("second.txt".to_string(), b"second".to_vec())]
    );
}

#[tokio::test]
async fn test_part_larger_than_memory_ceiling() {
    let app = TestApp::new();
    let big: Vec<u8> = (0..(8 * 1024 * 1024 + 4096)).map(|i| (i % 253) as u8).collect();

    let form = MultipartForm::new()
        .add_text("name", "big")
        .add_part("files", file_part("big.bin", big.clone()))
        .add_part("files", file_part("small.txt", "tail"));
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let entries = read_entries(&app.upload_dir().join("big.zip"));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "big.bin");
    assert!(entries[0].1 == big, "large entry content differs");
    assert_eq!(entries[1].1, b"tail");
}

#[tokio::test]
async fn test_spilled_parts_keep_their_order() {
    // Tiny ceiling so every part after the first spills to disk
    let app = TestApp::with_memory_limit(16);

    let mut form = MultipartForm::new().add_text("name", "spilled");
    let bodies: Vec<String> = (0..5).map(|i| format!("part number {i} ").repeat(10)).collect();
    for (i, body) in bodies.iter().enumerate() {
        form = form.add_part("files", file_part(&format!("p{i}.txt"), body.clone()));
    }

    let response = app.server.post("/upload").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let entries = read_entries(&app.upload_dir().join("spilled.zip"));
    assert_eq!(entries.len(), bodies.len());
    for (i, (name, data)) in entries.iter().enumerate() {
        assert_eq!(name, &format!("p{i}.txt"));
        assert_eq!(data, bodies[i].as_bytes());
    }
}

#[tokio::test]
async fn test_unwritable_upload_dir_is_internal_error() {
    let app = TestApp::new();
    // A regular file where the upload directory should be
    std::fs::write(app.upload_dir(), b"in the way").unwrap();

    let form = MultipartForm::new()
        .add_text("name", "blocked")
        .add_part("files", file_part("a.txt", "a"));
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("output directory"));
}

#[tokio::test]
async fn test_static_assets_served_at_root() {
    let app = TestApp::new();
    let public = app.dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<h1>upload</h1>").unwrap();

    let response = app.server.get("/index.html").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "<h1>upload</h1>");

    let missing = app.server.get("/missing.css").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "archive-upload-server");
}
