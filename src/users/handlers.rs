use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::state::AppState;
use crate::users::{
    dto::{CleanupReport, RoleFilter, UpdateMeRequest, UpdateUserRequest, UserProfile, UserStats},
    repo::{self, User, UserRole},
    services,
};

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/me/promote", post(promote_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/stats", get(user_stats))
        .route("/users/cleanup", post(cleanup_users))
        .route("/users/:id", put(update_user))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    let user = User::update_profile(
        &state.db,
        user_id,
        payload.display_name.as_deref(),
        payload.department,
    )
    .await
    .map_err(internal)?;

    info!(%user_id, "profile updated");
    Ok(Json(user.into()))
}

/// Self-service bootstrap promotion: any signed-in user may claim the
/// admin role. Intended for first-run setup before an admin exists.
#[instrument(skip(state))]
pub async fn promote_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    let user = User::set_role(&state.db, user_id, UserRole::Admin)
        .await
        .map_err(internal)?;

    info!(%user_id, "user promoted to admin");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<RoleFilter>,
) -> Result<Json<Vec<UserProfile>>, (StatusCode, String)> {
    services::require_admin(&state.db, user_id).await?;

    let users = match filter.role {
        Some(role) => User::list_by_role(&state.db, role).await,
        None => User::list_all(&state.db).await,
    }
    .map_err(internal)?;

    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

#[instrument(skip(state))]
pub async fn user_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserStats>, (StatusCode, String)> {
    services::require_admin(&state.db, user_id).await?;

    let counts = repo::count_by_role_and_department(&state.db)
        .await
        .map_err(internal)?;
    Ok(Json(counts.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    services::require_admin(&state.db, user_id).await?;

    if User::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .is_none()
    {
        return Err((StatusCode::NOT_FOUND, "User not found".to_string()));
    }

    let user = User::update_admin(
        &state.db,
        id,
        payload.display_name.as_deref(),
        payload.role,
        payload.department,
    )
    .await
    .map_err(internal)?;

    info!(target_id = %id, admin_id = %user_id, "user updated by admin");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn cleanup_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CleanupReport>, (StatusCode, String)> {
    services::require_admin(&state.db, user_id).await?;

    let report = services::cleanup_duplicate_users(&state.db)
        .await
        .map_err(internal)?;
    Ok(Json(report))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
