//! Admin-only routes.
//!
//! Sit behind both guard stages: base token check first, then the
//! admin claim. A request with no or bad token never learns whether
//! the route exists for admins.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::api::auth::PublicUser;
use crate::http::server::AppState;

/// GET /api/v1/admin/users
pub async fn list_users(State(state): State<AppState>) -> Json<serde_json::Value> {
    let users: Vec<PublicUser> = state.users.list().iter().map(PublicUser::from).collect();
    Json(json!({ "users": users }))
}
