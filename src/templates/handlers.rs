use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{error, info, instrument};

use crate::auth::AuthUser;
use crate::questions::repo::Question;
use crate::state::AppState;
use crate::templates::{dto::CreateTemplateRequest, repo::Template};
use crate::users::services::require_admin;

pub fn template_routes() -> Router<AppState> {
    Router::new().route("/templates", get(list_templates).post(create_template))
}

#[instrument(skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Template>>, (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    let templates = Template::list_recent(&state.db).await.map_err(internal)?;
    Ok(Json(templates))
}

#[instrument(skip(state, payload))]
pub async fn create_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<Template>), (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    if payload.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Template name is required".into()));
    }
    if payload.question_ids.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Template needs at least one question".into(),
        ));
    }

    let questions = Question::find_by_ids(&state.db, &payload.question_ids)
        .await
        .map_err(internal)?;
    if questions.len() != payload.question_ids.len() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Template references unknown questions".into(),
        ));
    }

    let template = Template::create(
        &state.db,
        payload.name.trim(),
        payload.description.as_deref(),
        &questions,
        payload.kind,
        user_id,
    )
    .await
    .map_err(internal)?;

    info!(template_id = %template.id, "template created");
    Ok((StatusCode::CREATED, Json(template)))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
