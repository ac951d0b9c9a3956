use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::evaluations::dto::ResponseItem;
use crate::questions::repo::Question;

/// Relationship between evaluator and evaluatee, derived from their roles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "evaluation_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    Peer,
    ManagerToEmployee,
    EmployeeToManager,
    AdminReview,
    AdminFeedback,
    CrossRole,
    #[sqlx(rename = "self")]
    #[serde(rename = "self")]
    SelfReview,
}

impl EvaluationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationKind::Peer => "peer",
            EvaluationKind::ManagerToEmployee => "manager_to_employee",
            EvaluationKind::EmployeeToManager => "employee_to_manager",
            EvaluationKind::AdminReview => "admin_review",
            EvaluationKind::AdminFeedback => "admin_feedback",
            EvaluationKind::CrossRole => "cross_role",
            EvaluationKind::SelfReview => "self",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "evaluation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

/// Evaluation record. Questions are snapshotted at assignment time so later
/// edits to the bank never change a form already handed out.
#[derive(Debug, Clone, FromRow)]
pub struct Evaluation {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub evaluator_id: Uuid,
    pub evaluatee_id: Uuid,
    pub kind: EvaluationKind,
    pub status: EvaluationStatus,
    pub due_date: OffsetDateTime,
    pub assigned_date: OffsetDateTime,
    pub completed_date: Option<OffsetDateTime>,
    pub questions: Json<Vec<Question>>,
    pub responses: Json<Vec<ResponseItem>>,
    pub created_at: OffsetDateTime,
    pub created_by: Uuid,
}

pub struct NewEvaluation {
    pub title: String,
    pub description: Option<String>,
    pub evaluator_id: Uuid,
    pub evaluatee_id: Uuid,
    pub kind: EvaluationKind,
    pub due_date: OffsetDateTime,
    pub questions: Vec<Question>,
    pub created_by: Uuid,
}

impl Evaluation {
    pub async fn create(db: &PgPool, new: NewEvaluation) -> anyhow::Result<Evaluation> {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            INSERT INTO evaluations
                (title, description, evaluator_id, evaluatee_id, kind, status,
                 due_date, assigned_date, questions, created_by)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, now(), $7, $8)
            RETURNING id, title, description, evaluator_id, evaluatee_id, kind, status,
                      due_date, assigned_date, completed_date, questions, responses,
                      created_at, created_by
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.evaluator_id)
        .bind(new.evaluatee_id)
        .bind(new.kind)
        .bind(new.due_date)
        .bind(Json(&new.questions))
        .bind(new.created_by)
        .fetch_one(db)
        .await?;
        Ok(evaluation)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Evaluation>> {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            SELECT id, title, description, evaluator_id, evaluatee_id, kind, status,
                   due_date, assigned_date, completed_date, questions, responses,
                   created_at, created_by
            FROM evaluations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(evaluation)
    }

    /// Evaluations assigned to one evaluator, optionally narrowed by status.
    pub async fn list_by_evaluator(
        db: &PgPool,
        evaluator_id: Uuid,
        status: Option<EvaluationStatus>,
    ) -> anyhow::Result<Vec<Evaluation>> {
        let rows = sqlx::query_as::<_, Evaluation>(
            r#"
            SELECT id, title, description, evaluator_id, evaluatee_id, kind, status,
                   due_date, assigned_date, completed_date, questions, responses,
                   created_at, created_by
            FROM evaluations
            WHERE evaluator_id = $1
              AND ($2::evaluation_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(evaluator_id)
        .bind(status)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Evaluation>> {
        let rows = sqlx::query_as::<_, Evaluation>(
            r#"
            SELECT id, title, description, evaluator_id, evaluatee_id, kind, status,
                   due_date, assigned_date, completed_date, questions, responses,
                   created_at, created_by
            FROM evaluations
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Partial update of title, description, status and due date.
    pub async fn update_partial(
        db: &PgPool,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<EvaluationStatus>,
        due_date: Option<OffsetDateTime>,
    ) -> anyhow::Result<Option<Evaluation>> {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            UPDATE evaluations
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                due_date = COALESCE($5, due_date)
            WHERE id = $1
            RETURNING id, title, description, evaluator_id, evaluatee_id, kind, status,
                      due_date, assigned_date, completed_date, questions, responses,
                      created_at, created_by
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(due_date)
        .fetch_optional(db)
        .await?;
        Ok(evaluation)
    }

    /// Store responses and close the evaluation.
    pub async fn submit(
        db: &PgPool,
        id: Uuid,
        responses: &[ResponseItem],
    ) -> anyhow::Result<Evaluation> {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            UPDATE evaluations
            SET responses = $2, status = 'completed', completed_date = now()
            WHERE id = $1
            RETURNING id, title, description, evaluator_id, evaluatee_id, kind, status,
                      due_date, assigned_date, completed_date, questions, responses,
                      created_at, created_by
            "#,
        )
        .bind(id)
        .bind(Json(responses))
        .fetch_one(db)
        .await?;
        Ok(evaluation)
    }
}

#[derive(Debug, FromRow)]
pub struct EvaluationCounts {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
}

pub async fn count_by_status(db: &PgPool) -> anyhow::Result<EvaluationCounts> {
    let counts = sqlx::query_as::<_, EvaluationCounts>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = 'pending') AS pending,
            COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
            COUNT(*) FILTER (WHERE status = 'completed') AS completed,
            COUNT(*) FILTER (WHERE status = 'overdue') AS overdue
        FROM evaluations
        "#,
    )
    .fetch_one(db)
    .await?;
    Ok(counts)
}
