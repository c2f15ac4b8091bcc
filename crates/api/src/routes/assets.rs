//! Route definitions for the presentation assets.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

/// Name of the shell document served for `/`.
pub const INDEX_FILE: &str = "index.html";

/// Routes serving the asset directory `dir`.
///
/// ```text
/// GET /        -> <dir>/index.html
/// GET /{path}  -> <dir>/{path}  (404 when missing)
/// ```
pub fn router(dir: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(dir.join(INDEX_FILE)))
        .fallback_service(ServeDir::new(dir))
}
