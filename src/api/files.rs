use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::schemas::files::{DeleteFilesRequest, DeleteFilesResponse, UploadFileResponse};

const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-file", post(upload_file))
        .route("/delete-file", post(delete_files))
}

async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadFileResponse>), ApiError> {
    let storage = state
        .storage()
        .ok_or_else(|| ApiError::ServiceUnavailable("File storage is not configured".to_string()))?;

    let mut file_name = None;
    let mut content_type = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        if field.name().unwrap_or("") != "file" {
            continue;
        }

        file_name = field.file_name().map(|s| s.to_string());
        content_type = field.content_type().map(|s| s.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
        {
            if bytes.len() as u64 + chunk.len() as u64 > MAX_UPLOAD_BYTES {
                return Err(ApiError::BadRequest("File exceeds the 25MB upload limit".to_string()));
            }
            bytes.extend_from_slice(&chunk);
        }
        file_bytes = Some(bytes);
    }

    let bytes = file_bytes.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    let file_name =
        file_name.ok_or_else(|| ApiError::BadRequest("Missing file name".to_string()))?;
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    let stored = storage
        .upload_bytes(&file_name, &content_type, bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to upload file"))?;

    Ok((
        StatusCode::CREATED,
        Json(UploadFileResponse {
            public_id: stored.public_id,
            file_name: stored.file_name,
            url: stored.url,
        }),
    ))
}

async fn delete_files(
    State(state): State<AppState>,
    Json(payload): Json<DeleteFilesRequest>,
) -> Result<Json<DeleteFilesResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let storage = state
        .storage()
        .ok_or_else(|| ApiError::ServiceUnavailable("File storage is not configured".to_string()))?;

    storage
        .delete_objects(&payload.public_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete files"))?;

    Ok(Json(DeleteFilesResponse { deleted: payload.public_ids.len() }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn delete_without_storage_returns_503() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/tracker/delete-file",
                Some(json!({"public_ids": ["abc_file.txt"]})),
            ))
            .await
            .expect("delete files");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
