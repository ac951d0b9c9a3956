use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::questions::{
    dto::{CreateQuestionRequest, UpdateQuestionRequest},
    repo::Question,
};
use crate::state::AppState;
use crate::users::services::require_admin;

pub fn question_routes() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route(
            "/questions/:id",
            put(update_question).delete(delete_question),
        )
}

#[instrument(skip(state))]
pub async fn list_questions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Question>>, (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    let questions = Question::list_ordered(&state.db).await.map_err(internal)?;
    Ok(Json(questions))
}

#[instrument(skip(state, payload))]
pub async fn create_question(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<Question>), (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    if payload.text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question text is required".into()));
    }

    let question = Question::create(
        &state.db,
        payload.text.trim(),
        payload.kind,
        &payload.category,
        payload.required,
        payload.order_index,
        user_id,
    )
    .await
    .map_err(internal)?;

    info!(question_id = %question.id, "question created");
    Ok((StatusCode::CREATED, Json(question)))
}

#[instrument(skip(state, payload))]
pub async fn update_question(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<Json<Question>, (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    if payload.text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question text is required".into()));
    }

    let question = Question::update(
        &state.db,
        id,
        payload.text.trim(),
        payload.kind,
        &payload.category,
        payload.required,
        payload.order_index,
    )
    .await
    .map_err(internal)?
    .ok_or((StatusCode::NOT_FOUND, "Question not found".to_string()))?;

    info!(question_id = %id, "question updated");
    Ok(Json(question))
}

#[instrument(skip(state))]
pub async fn delete_question(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    let deleted = Question::delete(&state.db, id).await.map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Question not found".to_string()));
    }

    info!(question_id = %id, "question deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
