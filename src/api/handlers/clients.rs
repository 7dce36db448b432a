use axum::extract::State;
use tracing::info;

use super::AppState;
use crate::errors::{ApiResponse, ErrorModel};
use crate::models::{ClientDraft, ClientExternal, RegisterClientRequest};
use crate::validation::{ValidPath, ValidatedJson};

/// List external clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "clients",
    responses(
        (status = 200, description = "Clients ordered by client id", body = crate::errors::ClientListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorModel)
    )
)]
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ClientExternal>>, ErrorModel> {
    Ok(ApiResponse::success(state.clients.list().await?))
}

/// Register an external client
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "clients",
    request_body = RegisterClientRequest,
    responses(
        (status = 201, description = "Client registered", body = crate::errors::ClientResponse),
        (status = 400, description = "Validation failed", body = ErrorModel),
        (status = 409, description = "Client id already registered", body = ErrorModel)
    )
)]
pub async fn register_client(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterClientRequest>,
) -> Result<ApiResponse<ClientExternal>, ErrorModel> {
    let client = state.clients.register(ClientDraft::from(request)).await?;
    info!(client_id = %client.client_id, "External client registered");
    Ok(ApiResponse::created(client))
}

/// Look up a client by its public client id
#[utoipa::path(
    get,
    path = "/api/clients/{clientId}",
    tag = "clients",
    params(("clientId" = String, Path, description = "Public client id")),
    responses(
        (status = 200, description = "Client found", body = crate::errors::ClientResponse),
        (status = 404, description = "Client not found", body = ErrorModel)
    )
)]
pub async fn get_client(
    State(state): State<AppState>,
    ValidPath(client_id): ValidPath<String>,
) -> Result<ApiResponse<ClientExternal>, ErrorModel> {
    state
        .clients
        .find_by_client_id(&client_id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ErrorModel::not_found(format!("Client {} not found", client_id)))
}
