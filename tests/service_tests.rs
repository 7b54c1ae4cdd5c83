//! Service-layer tests that need a mocked network

use pitchreel::services::assembler::Assembler;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn download_picks_extension_from_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"video bytes".to_vec())
                .insert_header("content-type", "video/mp4"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let assembler = Assembler::new(dir.path());

    let downloaded = assembler
        .download_file(&format!("{}/clip", server.uri()))
        .await
        .unwrap();

    assert_eq!(downloaded.extension().unwrap(), "mp4");
    assert_eq!(std::fs::read(&downloaded).unwrap(), b"video bytes");
}

#[tokio::test]
async fn download_surfaces_http_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let assembler = Assembler::new(dir.path());

    let result = assembler
        .download_file(&format!("{}/missing", server.uri()))
        .await;

    assert!(result.is_err());
}
