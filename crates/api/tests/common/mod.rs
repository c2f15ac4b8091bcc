use std::fs;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use batchsim_api::config::ServerConfig;
use batchsim_api::routes;

/// Shell document written into every test asset directory.
pub const INDEX_HTML: &str = "<!doctype html><title>Batch Simulator</title>";

/// Script asset written into every test asset directory.
pub const SCRIPT_JS: &str = "console.log('batch simulator');";

/// Create a temporary asset directory with an index and a nested script.
pub fn asset_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();
    fs::create_dir(dir.path().join("js")).unwrap();
    fs::write(dir.path().join("js").join("script.js"), SCRIPT_JS).unwrap();
    dir
}

/// Build a test `ServerConfig` serving `dir`.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        static_dir: dir.path().to_path_buf(),
        request_timeout_secs: 30,
    }
}

/// Build the full application with the production middleware stack.
pub fn build_test_app(dir: &TempDir) -> Router {
    routes::build_app(&test_config(dir))
}

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as UTF-8 text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
