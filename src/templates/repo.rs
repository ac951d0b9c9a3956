use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::evaluations::repo::EvaluationKind;
use crate::questions::repo::Question;

/// Reusable bundle of questions for one evaluation kind.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub questions: Json<Vec<Question>>,
    pub kind: EvaluationKind,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: Uuid,
}

impl Template {
    pub async fn create(
        db: &PgPool,
        name: &str,
        description: Option<&str>,
        questions: &[Question],
        kind: EvaluationKind,
        created_by: Uuid,
    ) -> anyhow::Result<Template> {
        let template = sqlx::query_as::<_, Template>(
            r#"
            INSERT INTO templates (name, description, questions, kind, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, questions, kind, created_at, created_by
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(Json(questions))
        .bind(kind)
        .bind(created_by)
        .fetch_one(db)
        .await?;
        Ok(template)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Template>> {
        let template = sqlx::query_as::<_, Template>(
            r#"
            SELECT id, name, description, questions, kind, created_at, created_by
            FROM templates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(template)
    }

    /// Newest templates first.
    pub async fn list_recent(db: &PgPool) -> anyhow::Result<Vec<Template>> {
        let rows = sqlx::query_as::<_, Template>(
            r#"
            SELECT id, name, description, questions, kind, created_at, created_by
            FROM templates
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
