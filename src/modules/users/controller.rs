use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info, instrument};
use uuid::Uuid;

use tollgate_core::{AppError, ErrorBody};
use tollgate_models::users::{MeResponse, UpdateRoleRequest, User};

use crate::middleware::auth::{AuthUser, RequireManageAccounts};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::UserService;

/// Get the principal attached to the current access token
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current principal", body = MeResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn get_me(AuthUser(principal): AuthUser) -> Json<MeResponse> {
    Json(MeResponse::from(&principal))
}

/// Change a user's role
///
/// Takes effect at the user's next login. Access tokens minted by refresh
/// keep the claims of the login that produced them.
#[utoipa::path(
    patch,
    path = "/api/users/{id}/role",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = User),
        (status = 400, description = "Invalid role", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 403, description = "Missing manage-accounts capability", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn update_user_role(
    State(state): State<AppState>,
    RequireManageAccounts(admin): RequireManageAccounts,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<User>, AppError> {
    let user = UserService::set_role(&state.db, id, dto.role).await?;
    info!(
        actor_id = %admin.principal().id,
        user_id = %user.id,
        role = %user.role,
        "User role changed"
    );
    Ok(Json(user))
}

/// Delete a user and all of their refresh sessions
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 403, description = "Missing manage-accounts capability", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireManageAccounts(admin): RequireManageAccounts,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    UserService::delete(&state.db, id).await?;
    info!(actor_id = %admin.principal().id, user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
