use axum::{
    extract::State,
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn};
use uuid::Uuid;

use super::AppState;
use crate::errors::{ApiResponse, ErrorModel};
use crate::metrics::FILES_STORED_BYTES_TOTAL;
use crate::models::{NewFile, StoredFile, UploadFileRequest};
use crate::validation::{ModelState, ValidPath, ValidatedJson};

fn file_not_found(id: Uuid) -> ErrorModel {
    ErrorModel::not_found(format!("File {} not found", id))
}

/// Upload a file, content base64-encoded in the JSON body
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "files",
    request_body = UploadFileRequest,
    responses(
        (status = 201, description = "File stored", body = crate::errors::FileResponse),
        (status = 400, description = "Validation failed", body = ErrorModel),
        (status = 404, description = "Owning society not found", body = ErrorModel),
        (status = 413, description = "Content exceeds the size limit", body = ErrorModel)
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UploadFileRequest>,
) -> Result<Response, Response> {
    let content = STANDARD
        .decode(request.content_base64.trim())
        .map_err(|e| {
            warn!("Rejected upload with invalid base64: {}", e);
            let mut model_state = ModelState::new();
            model_state.add_model_error(
                "contentBase64",
                "The ContentBase64 field is not a valid Base64 string.",
            );
            model_state.into_response()
        })?;

    if content.len() > state.max_file_size {
        return Err(ErrorModel::payload_too_large(format!(
            "File exceeds the maximum size of {} bytes",
            state.max_file_size
        ))
        .into_response());
    }

    if let Some(society_id) = request.society_id {
        let society = state
            .societies
            .get(society_id)
            .await
            .map_err(|e| ErrorModel::from(e).into_response())?;
        if society.is_none() {
            return Err(
                ErrorModel::not_found(format!("Society {} not found", society_id)).into_response(),
            );
        }
    }

    let file = NewFile::new(
        request.society_id,
        &request.file_name,
        request.content_type.as_deref(),
        content,
    );
    let size = file.size_bytes();
    let stored = state
        .files
        .save(file)
        .await
        .map_err(|e| ErrorModel::from(e).into_response())?;

    FILES_STORED_BYTES_TOTAL.inc_by(u64::try_from(size).unwrap_or_default());
    info!(file_id = %stored.id, size_bytes = size, "File stored");

    Ok(ApiResponse::created(stored).into_response())
}

/// File metadata
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "File found", body = crate::errors::FileResponse),
        (status = 404, description = "File not found", body = ErrorModel)
    )
)]
pub async fn get_file(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<StoredFile>, ErrorModel> {
    state
        .files
        .get(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| file_not_found(id))
}

/// Raw file content
#[utoipa::path(
    get,
    path = "/api/files/{id}/content",
    tag = "files",
    params(("id" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "File content", body = String, content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorModel)
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Response, ErrorModel> {
    let Some(file) = state.files.get(id).await? else {
        return Err(file_not_found(id));
    };
    // Deleted between the two reads
    let Some(content) = state.files.content(id).await? else {
        return Err(file_not_found(id));
    };

    Ok((content_headers(&file), content).into_response())
}

/// Delete a file
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File id")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "File not found", body = ErrorModel)
    )
)]
pub async fn delete_file(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ErrorModel> {
    if !state.files.delete(id).await? {
        return Err(file_not_found(id));
    }
    info!(file_id = %id, "File deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn content_headers(file: &StoredFile) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&file.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(NewFile::DEFAULT_CONTENT_TYPE)),
    );

    let file_name: String = file
        .file_name
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .map(|c| if c == '"' { '\'' } else { c })
        .collect();
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name)) {
        headers.insert(CONTENT_DISPOSITION, value);
    }

    headers
}
