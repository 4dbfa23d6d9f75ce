use chrono::Utc;
use tracing::{debug, error, instrument};

use tollgate_auth::Principal;
use tollgate_core::{AppError, Role, hash_password, verify_password};
use tollgate_models::auth::{LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse};
use tollgate_models::sessions::NewRefreshSession;
use tollgate_models::users::{RegisterRequest, User};

use crate::middleware::client_context::ClientContext;
use crate::modules::sessions::service::{SessionService, hash_token};
use crate::modules::users::service::UserService;
use crate::state::AppState;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(state, dto), fields(email = %dto.email))]
    pub async fn register(state: &AppState, dto: RegisterRequest) -> Result<(), AppError> {
        if UserService::find_by_email(&state.db, &dto.email).await?.is_some() {
            return Err(AppError::already_registered());
        }

        let password_hash = hash_password(&dto.password).await?;
        UserService::create(
            &state.db,
            &dto.email,
            &password_hash,
            &dto.full_name,
            Role::User,
        )
        .await?;

        Ok(())
    }

    /// Authenticates and mints an access/refresh pair bound to `client_context`.
    ///
    /// The refresh record is persisted before responding; a token the store
    /// does not know about could never be used, so a persistence failure is a
    /// server fault even though the pair was already signed.
    #[instrument(skip(state, dto, client_context), fields(email = %dto.email))]
    pub async fn login(
        state: &AppState,
        dto: LoginRequest,
        client_context: ClientContext,
    ) -> Result<LoginResponse, AppError> {
        let record = UserService::find_by_email(&state.db, &dto.email)
            .await?
            .ok_or_else(AppError::not_registered)?;

        if !verify_password(&dto.password, &record.password).await? {
            return Err(AppError::bad_credentials());
        }

        let principal = User::from(record).principal(&state.permissions);

        let now = Utc::now();
        let access = state
            .codec
            .issue_access_at(&principal, now)
            .map_err(AppError::issuance_failed)?;
        let refresh = state
            .codec
            .issue_refresh_at(&principal, now)
            .map_err(AppError::issuance_failed)?;

        let client_context = client_context.require()?;

        let new_session = NewRefreshSession {
            user_id: principal.id,
            token_hash: hash_token(&refresh.token),
            client_context,
            expires_at: refresh.expires_at,
        };

        if let Err(e) = SessionService::replace(&state.db, &new_session).await {
            error!(
                user_id = %new_session.user_id,
                client_context = %new_session.client_context,
                operation = "login.replace_session",
                error = %e,
                "Failed to persist refresh session"
            );
            return Err(e);
        }

        Ok(LoginResponse {
            access_token: access.token,
            expires_in: access.expires_in,
            refresh_token: refresh.token,
        })
    }

    /// Mints a new access token for the principal the Access Guard attached.
    ///
    /// The refresh token only proves the session is live; its own payload is
    /// not used to build the new claims.
    #[instrument(skip(state, principal, dto, client_context), fields(user_id = %principal.id))]
    pub async fn refresh(
        state: &AppState,
        principal: &Principal,
        dto: RefreshTokenRequest,
        client_context: ClientContext,
    ) -> Result<RefreshTokenResponse, AppError> {
        let holder = state
            .codec
            .verify_refresh(&dto.refresh_token)
            .map_err(|reason| {
                debug!(%reason, "Refresh token rejected");
                AppError::invalid_token()
            })?;

        if holder.id != principal.id {
            debug!(holder_id = %holder.id, "Refresh token belongs to another principal");
            return Err(AppError::invalid_token());
        }

        let client_context = client_context.require()?;

        SessionService::find_live(&state.db, &dto.refresh_token, &client_context)
            .await?
            .ok_or_else(|| {
                debug!(%client_context, "No live refresh session for token");
                AppError::invalid_token()
            })?;

        let access = state
            .codec
            .issue_access(principal)
            .map_err(AppError::issuance_failed)?;

        Ok(RefreshTokenResponse {
            access_token: access.token,
            expires_in: access.expires_in,
        })
    }

    /// Revokes the caller's sessions on this client context only.
    #[instrument(skip(state, principal, client_context), fields(user_id = %principal.id))]
    pub async fn logout(
        state: &AppState,
        principal: &Principal,
        client_context: ClientContext,
    ) -> Result<u64, AppError> {
        let client_context = client_context.require()?;

        SessionService::revoke_for_user_context(&state.db, principal.id, &client_context).await
    }
}
