//! Static file serving for the FingerMath pages.
//!
//! The pages, scripts and styles are embedded in the binary at compile time,
//! so the server runs from any directory.

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

/// Embedded files from the `web/static` directory.
#[derive(Embed)]
#[folder = "web/static"]
#[include = "*.html"]
#[include = "*.js"]
#[include = "*.css"]
#[include = "*.png"]
#[include = "*.ico"]
#[include = "*.svg"]
#[include = "js/*"]
#[include = "css/*"]
pub struct StaticAssets;

/// Serves the requested embedded file, or 404.
///
/// There is no client-side routing, so unknown paths are never rewritten to
/// a page.
pub async fn serve_static(request: Request) -> Response {
    let path = request.uri().path().trim_start_matches('/');

    if path.is_empty() {
        return serve_file("index.html");
    }

    serve_file(path)
}

/// Serves a specific file from embedded assets.
pub fn serve_file(path: &str) -> Response {
    match StaticAssets::get(path) {
        Some(content) => file_response(path, content.data.as_ref()),
        None => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

/// Creates an HTTP response for a file with appropriate content type.
fn file_response(path: &str, content: &[u8]) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, cache_control_for_path(path))
        .body(Body::from(content.to_vec()))
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create response",
            )
                .into_response()
        })
}

/// Returns the Cache-Control header for a file.
///
/// HTML is always revalidated; everything else is cached for an hour.
fn cache_control_for_path(path: &str) -> &'static str {
    if std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    {
        "no-cache, must-revalidate"
    } else {
        "public, max-age=3600"
    }
}
