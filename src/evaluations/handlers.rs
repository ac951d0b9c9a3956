use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::evaluations::{
    dto::{
        AssignmentRequest, AssignmentResponse, EvaluationDetails, EvaluationStats,
        EvaluationSummary, Pagination, StatusFilter, SubmitRequest, SuggestionsQuery,
        UpdateEvaluationRequest,
    },
    repo::{self, Evaluation, NewEvaluation},
    services,
};
use crate::questions::repo::Question;
use crate::state::AppState;
use crate::templates::repo::Template;
use crate::users::dto::UserProfile;
use crate::users::repo::{User, UserRole};
use crate::users::services::require_admin;

pub fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/assignments", post(create_assignment))
        .route("/assignments/suggestions", get(suggestions))
}

pub fn evaluation_routes() -> Router<AppState> {
    Router::new()
        .route("/evaluations", get(list_my_evaluations))
        .route("/evaluations/all", get(list_all_evaluations))
        .route("/evaluations/stats", get(evaluation_stats))
        .route("/evaluations/:id", get(get_evaluation).put(update_evaluation))
        .route("/evaluations/:id/submit", post(submit_evaluation))
}

/// Fan an assignment out into one pending evaluation per evaluatee. The
/// evaluation kind is inferred from the evaluator and the first evaluatee
/// and applied to the whole batch.
#[instrument(skip(state, payload))]
pub async fn create_assignment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentResponse>), (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    if payload.evaluatee_ids.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "At least one evaluatee is required".into(),
        ));
    }

    let evaluator = User::find_by_id(&state.db, payload.evaluator_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Evaluator not found".to_string()))?;

    let mut evaluatees = Vec::with_capacity(payload.evaluatee_ids.len());
    for evaluatee_id in &payload.evaluatee_ids {
        let evaluatee = User::find_by_id(&state.db, *evaluatee_id)
            .await
            .map_err(internal)?
            .ok_or((StatusCode::NOT_FOUND, "Evaluatee not found".to_string()))?;
        evaluatees.push(evaluatee);
    }

    let kind = services::infer_evaluation_kind(&evaluator, &evaluatees[0]);

    let questions: Vec<Question> = match payload.template_id {
        Some(template_id) => {
            let template = Template::find_by_id(&state.db, template_id)
                .await
                .map_err(internal)?
                .ok_or((StatusCode::NOT_FOUND, "Template not found".to_string()))?;
            template.questions.0
        }
        None => Question::list_ordered(&state.db)
            .await
            .map_err(internal)?
            .into_iter()
            .take(services::DEFAULT_QUESTION_COUNT)
            .collect(),
    };

    let title = services::assignment_title(kind);
    let mut created = Vec::with_capacity(evaluatees.len());
    for evaluatee in &evaluatees {
        let evaluation = Evaluation::create(
            &state.db,
            NewEvaluation {
                title: title.clone(),
                description: Some("Automatic evaluation assignment".to_string()),
                evaluator_id: evaluator.id,
                evaluatee_id: evaluatee.id,
                kind,
                due_date: payload.due_date,
                questions: questions.clone(),
                created_by: user_id,
            },
        )
        .await
        .map_err(internal)?;
        created.push(evaluation.id);
    }

    info!(
        evaluator_id = %evaluator.id,
        count = created.len(),
        kind = kind.as_str(),
        "evaluations assigned"
    );
    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse { created, kind }),
    ))
}

/// Suggested evaluatees for an evaluator, in role-hierarchy order.
#[instrument(skip(state))]
pub async fn suggestions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<Vec<UserProfile>>, (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    let evaluator = User::find_by_id(&state.db, query.evaluator_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Evaluator not found".to_string()))?;

    let users = User::list_all(&state.db).await.map_err(internal)?;
    let suggested = services::suggest_evaluatees(&evaluator, &users);

    Ok(Json(suggested.into_iter().map(UserProfile::from).collect()))
}

/// The caller's evaluations as evaluator. Evaluatees never see
/// evaluations about them.
#[instrument(skip(state))]
pub async fn list_my_evaluations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<EvaluationSummary>>, (StatusCode, String)> {
    let rows = Evaluation::list_by_evaluator(&state.db, user_id, filter.status)
        .await
        .map_err(internal)?;
    Ok(Json(rows.into_iter().map(EvaluationSummary::from).collect()))
}

#[instrument(skip(state))]
pub async fn list_all_evaluations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<EvaluationSummary>>, (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    let rows = Evaluation::list_all(&state.db, p.limit, p.offset)
        .await
        .map_err(internal)?;
    Ok(Json(rows.into_iter().map(EvaluationSummary::from).collect()))
}

#[instrument(skip(state))]
pub async fn evaluation_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<EvaluationStats>, (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    let counts = repo::count_by_status(&state.db).await.map_err(internal)?;
    Ok(Json(counts.into()))
}

#[instrument(skip(state))]
pub async fn get_evaluation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EvaluationDetails>, (StatusCode, String)> {
    let caller = User::find_by_id(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let evaluation = Evaluation::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Evaluation not found".to_string()))?;

    // Not-found rather than forbidden, so evaluatees cannot probe for
    // evaluations about themselves.
    if caller.role != UserRole::Admin && evaluation.evaluator_id != caller.id {
        return Err((StatusCode::NOT_FOUND, "Evaluation not found".to_string()));
    }

    Ok(Json(evaluation.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_evaluation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEvaluationRequest>,
) -> Result<Json<EvaluationDetails>, (StatusCode, String)> {
    require_admin(&state.db, user_id).await?;

    let evaluation = Evaluation::update_partial(
        &state.db,
        id,
        payload.title.as_deref(),
        payload.description.as_deref(),
        payload.status,
        payload.due_date,
    )
    .await
    .map_err(internal)?
    .ok_or((StatusCode::NOT_FOUND, "Evaluation not found".to_string()))?;

    info!(evaluation_id = %id, "evaluation updated");
    Ok(Json(evaluation.into()))
}

#[instrument(skip(state, payload))]
pub async fn submit_evaluation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<EvaluationDetails>, (StatusCode, String)> {
    let evaluation = Evaluation::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Evaluation not found".to_string()))?;

    if evaluation.evaluator_id != user_id {
        return Err((
            StatusCode::FORBIDDEN,
            "Only the evaluator can submit responses".to_string(),
        ));
    }

    services::validate_responses(&evaluation.questions.0, &payload.responses)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let updated = Evaluation::submit(&state.db, id, &payload.responses)
        .await
        .map_err(internal)?;

    info!(evaluation_id = %id, evaluator_id = %user_id, "evaluation submitted");
    Ok(Json(updated.into()))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
