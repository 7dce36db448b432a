use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::errors::{ApiResponse, ErrorModel};
use crate::models::{Society, SocietyDraft, SocietyRequest, StoredFile};
use crate::validation::{ValidPath, ValidatedJson, ValidatedQuery};

/// Society listing filters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct SocietyListParams {
    /// Case-insensitive substring of the society name
    #[validate(length(
        max = 200,
        message = "The field Name must be a string with a maximum length of 200."
    ))]
    pub name: Option<String>,
}

fn society_not_found(id: Uuid) -> ErrorModel {
    ErrorModel::not_found(format!("Society {} not found", id))
}

/// List societies
#[utoipa::path(
    get,
    path = "/api/societies",
    tag = "societies",
    params(SocietyListParams),
    responses(
        (status = 200, description = "Societies ordered by name", body = crate::errors::SocietyListResponse),
        (status = 400, description = "Invalid filter", body = ErrorModel),
        (status = 401, description = "Missing or invalid token", body = ErrorModel)
    )
)]
pub async fn list_societies(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<SocietyListParams>,
) -> Result<ApiResponse<Vec<Society>>, ErrorModel> {
    let mut societies = state.societies.list().await?;

    if let Some(filter) = params.name.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        let filter = filter.to_lowercase();
        societies.retain(|s| s.name.to_lowercase().contains(&filter));
    }

    Ok(ApiResponse::success(societies))
}

/// Get a society by id
#[utoipa::path(
    get,
    path = "/api/societies/{id}",
    tag = "societies",
    params(("id" = Uuid, Path, description = "Society id")),
    responses(
        (status = 200, description = "Society found", body = crate::errors::SocietyResponse),
        (status = 400, description = "Malformed id", body = ErrorModel),
        (status = 404, description = "Society not found", body = ErrorModel)
    )
)]
pub async fn get_society(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<Society>, ErrorModel> {
    state
        .societies
        .get(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| society_not_found(id))
}

/// Register a society
#[utoipa::path(
    post,
    path = "/api/societies",
    tag = "societies",
    request_body = SocietyRequest,
    responses(
        (status = 201, description = "Society created", body = crate::errors::SocietyResponse),
        (status = 400, description = "Validation failed", body = ErrorModel),
        (status = 409, description = "Registration number already in use", body = ErrorModel)
    )
)]
pub async fn create_society(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SocietyRequest>,
) -> Result<ApiResponse<Society>, ErrorModel> {
    let society = state.societies.create(SocietyDraft::from(request)).await?;
    info!(society_id = %society.id, "Society created");
    Ok(ApiResponse::created(society))
}

/// Replace a society's fields
#[utoipa::path(
    put,
    path = "/api/societies/{id}",
    tag = "societies",
    params(("id" = Uuid, Path, description = "Society id")),
    request_body = SocietyRequest,
    responses(
        (status = 200, description = "Society updated", body = crate::errors::SocietyResponse),
        (status = 400, description = "Validation failed", body = ErrorModel),
        (status = 404, description = "Society not found", body = ErrorModel),
        (status = 409, description = "Registration number already in use", body = ErrorModel)
    )
)]
pub async fn update_society(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(request): ValidatedJson<SocietyRequest>,
) -> Result<ApiResponse<Society>, ErrorModel> {
    state
        .societies
        .update(id, SocietyDraft::from(request))
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| society_not_found(id))
}

/// Delete a society
#[utoipa::path(
    delete,
    path = "/api/societies/{id}",
    tag = "societies",
    params(("id" = Uuid, Path, description = "Society id")),
    responses(
        (status = 204, description = "Society deleted"),
        (status = 404, description = "Society not found", body = ErrorModel)
    )
)]
pub async fn delete_society(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Response, ErrorModel> {
    if !state.societies.delete(id).await? {
        return Err(society_not_found(id));
    }
    info!(society_id = %id, "Society deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Files attached to a society, newest first
#[utoipa::path(
    get,
    path = "/api/societies/{id}/files",
    tag = "societies",
    params(("id" = Uuid, Path, description = "Society id")),
    responses(
        (status = 200, description = "Files of the society", body = crate::errors::FileListResponse),
        (status = 404, description = "Society not found", body = ErrorModel)
    )
)]
pub async fn list_society_files(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<Vec<StoredFile>>, ErrorModel> {
    if state.societies.get(id).await?.is_none() {
        return Err(society_not_found(id));
    }
    Ok(ApiResponse::success(state.files.list_by_society(id).await?))
}
