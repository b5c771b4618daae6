// Files served straight from the data directory, such as log.csv
use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::Response;
use std::path::PathBuf;
use tower::ServiceExt;
use tower_http::services::ServeDir;

const DIRECTORY_INDEX: &str = "index.htm";
const DEFAULT_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug, Clone)]
pub struct StaticFiles {
    serve_dir: ServeDir,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            serve_dir: ServeDir::new(root.into()).append_index_html_on_directories(false),
        }
    }

    /// Answer a GET or HEAD from the data directory. `None` when there is no
    /// such file, including paths that try to leave the directory.
    pub async fn serve(&self, request: Request) -> Option<Response> {
        let request = with_directory_index(request);
        let path = request.uri().path().to_string();

        let response = self
            .serve_dir
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Static file {} not found", path);
            return None;
        }

        let mut response = response.map(Body::new);
        let unknown_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .is_none_or(|v| v.as_bytes() == b"application/octet-stream");
        if unknown_type {
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
            );
        }
        Some(response)
    }
}

/// Directory requests (`/docs/`) read the directory's `index.htm`.
fn with_directory_index(mut request: Request) -> Request {
    let uri = request.uri();
    if !uri.path().ends_with('/') {
        return request;
    }

    let rewritten = match uri.query() {
        Some(query) => format!("{}{}?{}", uri.path(), DIRECTORY_INDEX, query),
        None => format!("{}{}", uri.path(), DIRECTORY_INDEX),
    };
    match rewritten.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => tracing::debug!("Directory index not applied: {}", e),
    }
    request
}
