use axum::{
    Router,
    routing::{delete, get, patch},
};

use crate::state::AppState;

use super::controller::{delete_user, get_me, update_user_role};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/{id}/role", patch(update_user_role))
        .route("/{id}", delete(delete_user))
}
