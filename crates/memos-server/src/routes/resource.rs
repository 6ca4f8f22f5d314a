//! Resource (attachment) routes.
//!
//! Uploads are streamed field by field so that the size limit applies to
//! the file itself, not to the framework's default body limit.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use memos_core::{Resource, object_key};
use memos_store::NewResource;
use serde::Deserialize;
use uuid::Uuid;

use super::page;
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Query parameters for GET /api/resource.
#[derive(Debug, Default, Deserialize)]
pub struct ListResourcesParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A file read from the `file` multipart field.
#[derive(Debug)]
struct Upload {
    filename: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// Reduce a client-supplied filename to `[A-Za-z0-9._-]`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    // Browsers may send a full path.
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        cleaned
    }
}

async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> ApiResult<Upload> {
    let bad_multipart = |e: axum::extract::multipart::MultipartError| {
        ApiError::BadRequest(format!("invalid multipart body: {}", e))
    };

    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or_default());
        let mime_type = field
            .content_type()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ApiError::PayloadTooLarge(format!(
                    "file exceeds {} bytes",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Upload {
            filename,
            mime_type,
            bytes,
        });
    }

    Err(ApiError::BadRequest("missing file field".to_string()))
}

/// POST /api/resource/blob
async fn upload_resource(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    multipart: Multipart,
) -> ApiResult<Json<Resource>> {
    let upload = read_upload(multipart, state.config().max_upload_bytes).await?;

    let uid = Uuid::new_v4().to_string();
    let key = object_key(&uid, &upload.filename);
    let size = i64::try_from(upload.bytes.len())
        .map_err(|_| ApiError::PayloadTooLarge("file too large".to_string()))?;

    state
        .objects()
        .put(&key, upload.bytes, &upload.mime_type)
        .await?;

    let record = NewResource {
        uid,
        creator_id: auth.id(),
        filename: upload.filename,
        mime_type: upload.mime_type,
        size,
        external_uri: state.objects().download_url(&key),
    };

    let resource = match state.store().create_resource(&record).await {
        Ok(resource) => resource,
        Err(e) => {
            if let Err(cleanup) = state.objects().delete(&key).await {
                tracing::warn!(key = %key, error = %cleanup, "Failed to remove orphaned blob");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        resource_id = resource.id,
        creator_id = resource.creator_id,
        size = resource.size,
        "Resource uploaded"
    );

    Ok(Json(resource))
}

/// GET /api/resource
async fn list_resources(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(params): Query<ListResourcesParams>,
) -> ApiResult<Json<Vec<Resource>>> {
    let (limit, offset) = page(params.limit, params.offset);
    Ok(Json(
        state
            .store()
            .list_resources(auth.id(), limit, offset)
            .await?,
    ))
}

/// DELETE /api/resource/{id}
async fn delete_resource(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let resource = state.store().get_resource(id).await?;
    if resource.creator_id != auth.id() {
        return Err(ApiError::Forbidden(
            "not the owner of this resource".to_string(),
        ));
    }

    state.store().delete_resource(id).await?;

    let key = resource.object_key();
    if let Err(e) = state.objects().delete(&key).await {
        tracing::warn!(resource_id = id, key = %key, error = %e, "Failed to delete blob");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /o/r/{uid}/{filename} - redirect to the blob's download URL.
async fn redirect_to_blob(
    State(state): State<AppState>,
    Path((uid, filename)): Path<(String, String)>,
) -> ApiResult<Response> {
    let resource = state
        .store()
        .find_resource_by_uid(&uid)
        .await?
        .filter(|r| r.filename == filename)
        .ok_or_else(|| ApiError::NotFound(format!("resource {}/{}", uid, filename)))?;

    let url = state.objects().download_url(&resource.object_key());
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

/// Build resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/resource/blob",
            post(upload_resource).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/resource", get(list_resources))
        .route("/api/resource/{id}", delete(delete_resource))
        .route("/o/r/{uid}/{filename}", get(redirect_to_blob))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.png"), "photo.png");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_filename("C:\\Users\\a\\doc.pdf"), "doc.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("résumé.txt"), "r_sum_.txt");
    }
}
