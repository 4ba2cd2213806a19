use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use vhostd::config::{HandlerConfig, VhostConfig};
use vhostd::handler::{FileHandler, Handler, TextHandler};
use vhostd::http::error::HttpError;
use vhostd::http::request::{Method, Request, RequestBuilder, Version};
use vhostd::http::writer::CHUNK_SIZE;

fn temp_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vhostd-handler-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn get(target: &str, version: Version) -> Request {
    RequestBuilder::new()
        .method(Method::GET)
        .target(target)
        .version(version)
        .header("Host", "default")
        .build()
        .unwrap()
}

async fn serve_file(root: &Path, target: &str) -> Result<Vec<u8>, HttpError> {
    let req = get(target, Version::HTTP_1_1);
    let mut out = Vec::new();
    FileHandler::new(root)
        .handle(&req, &req.split_target(), &mut out)
        .await?;
    Ok(out)
}

#[tokio::test]
async fn test_file_handler_serves_file() {
    let root = temp_root("serve");
    std::fs::write(root.join("index.html"), "<h1>hi</h1>").unwrap();

    let out = serve_file(&root, "/index.html?ignored=1").await.unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 Ok\r\n"));
    assert!(text.contains("Content-Type: text/html\r\n"));
    assert!(text.contains("Content-Length: 11\r\n"));
    assert!(text.ends_with("\r\n\r\n<h1>hi</h1>"));
}

#[tokio::test]
async fn test_file_handler_uses_request_version() {
    let root = temp_root("version");
    std::fs::write(root.join("a.txt"), "a").unwrap();

    let req = get("/a.txt", Version::HTTP_1_0);
    let mut out = Vec::new();
    FileHandler::new(&root)
        .handle(&req, &req.split_target(), &mut out)
        .await
        .unwrap();

    assert!(out.starts_with(b"HTTP/1.0 200 Ok\r\n"));
}

#[tokio::test]
async fn test_file_handler_streams_large_file() {
    let root = temp_root("large");
    let data: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
    std::fs::write(root.join("blob.bin"), &data).unwrap();

    let out = serve_file(&root, "/blob.bin").await.unwrap();
    let head_end = out.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
    let head = String::from_utf8_lossy(&out[..head_end]);

    assert!(head.contains(&format!("Content-Length: {}\r\n", data.len())));
    assert!(head.contains("Content-Type: application/octet-stream\r\n"));
    assert_eq!(&out[head_end..], &data[..]);
}

#[tokio::test]
async fn test_file_handler_nested_path() {
    let root = temp_root("nested");
    std::fs::create_dir_all(root.join("docs/api")).unwrap();
    std::fs::write(root.join("docs/api/v1.json"), "{}").unwrap();

    let out = serve_file(&root, "/docs/./api/../api/v1.json").await.unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("Content-Type: application/json\r\n"));
    assert!(text.ends_with("{}"));
}

#[tokio::test]
async fn test_file_handler_missing_file_is_not_found() {
    let root = temp_root("missing");

    let err = serve_file(&root, "/missing.txt").await.unwrap_err();
    assert!(matches!(err, HttpError::NotFound(_)));
    assert_eq!(err.to_string(), "File doesn't exist");
}

#[tokio::test]
async fn test_file_handler_directory_is_not_found() {
    let root = temp_root("directory");
    std::fs::create_dir_all(root.join("sub")).unwrap();

    assert!(matches!(
        serve_file(&root, "/sub").await,
        Err(HttpError::NotFound(_))
    ));
    assert!(matches!(
        serve_file(&root, "/").await,
        Err(HttpError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_file_handler_refuses_traversal() {
    let root = temp_root("traversal");
    let outside = root.parent().unwrap().join(format!("vhostd-outside-{}.txt", std::process::id()));
    std::fs::write(&outside, "secret").unwrap();

    let target = format!("/../{}", outside.file_name().unwrap().to_str().unwrap());
    let result = serve_file(&root, &target).await;

    assert!(matches!(result, Err(HttpError::Forbidden(_))));
    let _ = std::fs::remove_file(&outside);
}

/// Drops every permission bit from `path`. Returns false when the file can
/// still be opened, which happens when the tests run with root privileges.
fn make_unreadable(path: &Path) -> bool {
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o000)).unwrap();
    std::fs::File::open(path).is_err()
}

#[tokio::test]
async fn test_file_handler_unreadable_file_is_forbidden() {
    let root = temp_root("unreadable");
    let secret = root.join("secret.txt");
    std::fs::write(&secret, "top secret").unwrap();

    if !make_unreadable(&secret) {
        eprintln!("skipping: running with privileges that bypass file modes");
        return;
    }

    let mut out = Vec::new();
    let req = get("/secret.txt", Version::HTTP_1_1);
    let result = FileHandler::new(&root)
        .handle(&req, &req.split_target(), &mut out)
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, HttpError::Forbidden(_)));
    assert_eq!(err.to_string(), "Permissions denied");
    // Nothing may be written before the failure is known.
    assert!(out.is_empty());

    std::fs::set_permissions(&secret, std::fs::Permissions::from_mode(0o644)).unwrap();
}

#[tokio::test]
async fn test_file_handler_body_matches_file_bytes() {
    let root = temp_root("exact");
    let data = b"line one\nline two\n\x00\xff".to_vec();
    std::fs::write(root.join("data.bin"), &data).unwrap();

    let out = serve_file(&root, "/data.bin").await.unwrap();
    let head_end = out.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;

    assert!(String::from_utf8_lossy(&out[..head_end]).contains("Content-Length: 20\r\n"));
    assert_eq!(&out[head_end..], &data[..]);
}

#[tokio::test]
async fn test_text_handler_writes_fixed_body() {
    let req = get("/anything", Version::HTTP_1_1);
    let mut out = Vec::new();

    TextHandler::new("hello", "text/plain")
        .handle(&req, &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("HTTP/1.1 200 Ok\r\n"));
    assert!(text.contains("Content-Type: text/plain\r\n"));
    assert!(text.contains("Content-Length: 5\r\n"));
    assert!(text.ends_with("\r\n\r\nhello"));
}

#[tokio::test]
async fn test_handler_selected_from_vhost_config() {
    let root = temp_root("registry");
    std::fs::write(root.join("f.txt"), "file body").unwrap();

    let file_vhost = VhostConfig::new("default", HandlerConfig::File { root: root.clone() });
    let text_vhost = VhostConfig::new(
        "example.com",
        HandlerConfig::Text {
            body: "text body".to_string(),
            content_type: "text/plain".to_string(),
        },
    );

    assert!(matches!(Handler::for_vhost(&file_vhost), Handler::File(_)));
    assert!(matches!(Handler::for_vhost(&text_vhost), Handler::Text(_)));

    let req = get("/f.txt", Version::HTTP_1_1);
    let target = req.split_target();

    let mut out = Vec::new();
    Handler::for_vhost(&file_vhost)
        .handle(&req, &target, &mut out)
        .await
        .unwrap();
    assert!(out.ends_with(b"file body"));

    let mut out = Vec::new();
    Handler::for_vhost(&text_vhost)
        .handle(&req, &target, &mut out)
        .await
        .unwrap();
    assert!(out.ends_with(b"text body"));
}
