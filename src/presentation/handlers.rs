// HTTP request handlers
use crate::infrastructure::data_files::{format_listing, DataFileError, DataFiles};
use crate::infrastructure::html_page::HtmlPage;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Multipart, Query, Request, State},
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use std::fmt::Write;
use std::sync::Arc;

const PAGE_TITLE: &str = "Power Usage";

const SUCCESS: &str = r#"{"success":1}"#;
const NO_FILE: &str = r#"{"no file specified":1}"#;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Send the root path to the graph page
pub async fn redirect_to_index() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/index.html")])
}

/// Fetch, parse and draw the power log into a fresh page.
///
/// Always answers 200: a failed load shows up as the page's error region.
pub async fn power_graph_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut page = HtmlPage::new(PAGE_TITLE);
    let outcome = state.power_graph.render_page(&mut page).await;
    tracing::info!(
        "Served power graph page ({}, {} records, chart: {}, loading: {})",
        outcome,
        page.element_count().unwrap_or(0),
        page.has_chart(),
        page.is_loading_visible()
    );
    Html(page.render())
}

/// `GET /list`: the data directory as `[a, b, c]`
pub async fn list_files(State(state): State<Arc<AppState>>) -> Response {
    match state.data_files.list().await {
        Ok(names) => format_listing(&names).into_response(),
        Err(e) => {
            tracing::error!("Failed to list data files: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"unable to list files":1}"#,
            )
                .into_response()
        }
    }
}

/// `DELETE /delete?file=<name>`: the first query argument names the file.
///
/// Answers 200 with a one-key status object, as the device does.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Query(args): Query<Vec<(String, String)>>,
) -> &'static str {
    let Some((_, name)) = args.first() else {
        return NO_FILE;
    };

    match state.data_files.delete(name).await {
        Ok(()) => SUCCESS,
        Err(DataFileError::Missing(_)) => r#"{"file does not exist":1}"#,
        Err(DataFileError::InvalidName(_)) => r#"{"invalid file name":1}"#,
        Err(e) => {
            tracing::warn!("Failed to delete {}: {}", name, e);
            r#"{"unable to remove file":1}"#
        }
    }
}

/// `POST /upload`: every multipart file part is stored under its file name
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    match store_uploads(&state.data_files, &mut multipart).await {
        Ok(0) => (StatusCode::BAD_REQUEST, NO_FILE).into_response(),
        Ok(count) => {
            tracing::info!("Stored {} uploaded file(s)", count);
            SUCCESS.into_response()
        }
        Err(e) => {
            tracing::warn!("Upload failed: {:#}", e);
            (StatusCode::BAD_REQUEST, r#"{"upload failed":1}"#).into_response()
        }
    }
}

async fn store_uploads(files: &DataFiles, multipart: &mut Multipart) -> anyhow::Result<usize> {
    let mut stored = 0;
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let contents = field.bytes().await?;
        files.store(&name, &contents).await?;
        stored += 1;
    }
    Ok(stored)
}

/// Anything else is looked up in the data directory
pub async fn static_file(
    State(state): State<Arc<AppState>>,
    Query(args): Query<Vec<(String, String)>>,
    request: Request,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    if method == Method::GET || method == Method::HEAD {
        if let Some(response) = state.static_files.serve(request).await {
            return response;
        }
    }

    tracing::warn!("No file for {} {}", method, uri.path());
    (StatusCode::NOT_FOUND, not_found_report(&method, &uri, &args)).into_response()
}

fn not_found_report(method: &Method, uri: &Uri, args: &[(String, String)]) -> String {
    let mut message = String::from("File Not Detected\n\n");
    let _ = writeln!(message, "URI: {}", uri.path());
    let _ = writeln!(message, "Method: {}", method);
    let _ = writeln!(message, "Arguments: {}", args.len());
    for (name, value) in args {
        let _ = writeln!(message, " NAME:{}\n VALUE:{}", name, value);
    }
    message
}
