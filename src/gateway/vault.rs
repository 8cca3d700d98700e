//! Notes tree and file vault: the login-gated, object-store-backed pages.
//!
//! Both features sit behind the same [`ObjectStore`] seam; the gateway
//! never touches the backing bytes beyond passing them through.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::storage::{ObjectStore, StorageError};

use super::policy::found;
use super::{pages, AppState};

fn feature_unavailable(what: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(pages::render_error_page(
            "Unavailable",
            &format!("The {what} feature is not configured on this server."),
        )),
    )
        .into_response()
}

fn storage_error_response(err: &StorageError, key: &str) -> Response {
    match err {
        StorageError::NotFound(_) | StorageError::InvalidKey(_) => (
            StatusCode::NOT_FOUND,
            Html(pages::render_error_page(
                "Not found",
                &format!("No such item: {key}"),
            )),
        )
            .into_response(),
        StorageError::Io(e) => {
            tracing::warn!(key, error = %e, "storage operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::render_error_page(
                    "Error",
                    "The storage backend failed. Try again later.",
                )),
            )
                .into_response()
        }
    }
}

// ── Notes ─────────────────────────────────────────────────────────────

/// GET /notes/ — root of the notes tree.
pub async fn handle_notes_root(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    notes_response(&state, &uri, &headers, String::new()).await
}

/// GET /notes/{*path} — a folder (trailing slash) or a single note.
pub async fn handle_notes(
    State(state): State<AppState>,
    uri: Uri,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Response {
    notes_response(&state, &uri, &headers, path).await
}

async fn notes_response(
    state: &AppState,
    uri: &Uri,
    headers: &HeaderMap,
    path: String,
) -> Response {
    let claim = match state.gate.require_identity(headers, uri) {
        Ok(claim) => claim,
        Err(response) => return response,
    };
    let Some(store) = state.notes.as_ref() else {
        return feature_unavailable("notes");
    };
    tracing::debug!(username = %claim.username, path, "notes access");

    if path.is_empty() || path.ends_with('/') {
        match store.list_folder(&path).await {
            Ok(listing) => Html(pages::render_notes_listing(&path, &listing)).into_response(),
            Err(e) => storage_error_response(&e, &path),
        }
    } else {
        match store.read(&path).await {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                Html(pages::render_note_page(&path, &text)).into_response()
            }
            Err(e) => storage_error_response(&e, &path),
        }
    }
}

// ── Files ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub key: String,
}

/// GET /files/ — vault listing plus the upload form.
pub async fn handle_files_index(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = state.gate.require_identity(&headers, &uri) {
        return response;
    }
    let Some(store) = state.files.as_ref() else {
        return feature_unavailable("files");
    };

    match store.list_folder("").await {
        Ok(listing) => Html(pages::render_files_page(&listing)).into_response(),
        Err(e) => storage_error_response(&e, "/"),
    }
}

/// GET /files/download/{*key} — raw bytes with a guessed content type.
pub async fn handle_file_download(
    State(state): State<AppState>,
    uri: Uri,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = state.gate.require_identity(&headers, &uri) {
        return response;
    }
    let Some(store) = state.files.as_ref() else {
        return feature_unavailable("files");
    };

    match store.read(&key).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&key).first_or_octet_stream();
            let filename = key.rsplit('/').next().unwrap_or(&key).to_owned();
            (
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => storage_error_response(&e, &key),
    }
}

/// POST /files/upload — multipart field `file`, stored under its filename.
pub async fn handle_file_upload(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let claim = match state.gate.require_identity(&headers, &uri) {
        Ok(claim) => claim,
        Err(response) => return response,
    };
    let Some(store) = state.files.as_ref() else {
        return feature_unavailable("files");
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Html(pages::render_error_page(
                        "Upload failed",
                        &format!("Malformed upload: {e}"),
                    )),
                )
                    .into_response();
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        // Browsers may send a full client-side path; keep the basename.
        let filename = field
            .file_name()
            .unwrap_or("")
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or("")
            .to_owned();
        if filename.is_empty() {
            break;
        }

        let content = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Html(pages::render_error_page(
                        "Upload failed",
                        &format!("Could not read upload: {e}"),
                    )),
                )
                    .into_response();
            }
        };

        return match store.write(&filename, content).await {
            Ok(()) => {
                tracing::info!(username = %claim.username, filename, "file uploaded");
                found("/files/")
            }
            Err(e) => storage_error_response(&e, &filename),
        };
    }

    (
        StatusCode::BAD_REQUEST,
        Html(pages::render_error_page(
            "Upload failed",
            "No file was provided.",
        )),
    )
        .into_response()
}

/// POST /files/delete — remove one object, back to the listing.
pub async fn handle_file_delete(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    Form(form): Form<DeleteForm>,
) -> Response {
    let claim = match state.gate.require_identity(&headers, &uri) {
        Ok(claim) => claim,
        Err(response) => return response,
    };
    let Some(store) = state.files.as_ref() else {
        return feature_unavailable("files");
    };

    match store.delete(&form.key).await {
        Ok(()) => {
            tracing::info!(username = %claim.username, key = form.key, "file deleted");
            found("/files/")
        }
        Err(e) => storage_error_response(&e, &form.key),
    }
}
