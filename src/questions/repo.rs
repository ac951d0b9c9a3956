use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// How a question is answered: a 1-10 slider or free text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "question_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Slider,
    Paragraph,
}

/// A question in the bank. Also the shape embedded as a snapshot into
/// evaluations and templates, so it round-trips through JSONB.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub kind: QuestionKind,
    pub category: String,
    pub required: bool,
    pub order_index: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: Uuid,
}

impl Question {
    pub async fn create(
        db: &PgPool,
        text: &str,
        kind: QuestionKind,
        category: &str,
        required: bool,
        order_index: i32,
        created_by: Uuid,
    ) -> anyhow::Result<Question> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (text, kind, category, required, order_index, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, text, kind, category, required, order_index, created_at, created_by
            "#,
        )
        .bind(text)
        .bind(kind)
        .bind(category)
        .bind(required)
        .bind(order_index)
        .bind(created_by)
        .fetch_one(db)
        .await?;
        Ok(question)
    }

    /// The whole bank, in display order.
    pub async fn list_ordered(db: &PgPool) -> anyhow::Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, text, kind, category, required, order_index, created_at, created_by
            FROM questions
            ORDER BY order_index ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Fetch a set of questions by id, in display order.
    pub async fn find_by_ids(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, text, kind, category, required, order_index, created_at, created_by
            FROM questions
            WHERE id = ANY($1)
            ORDER BY order_index ASC
            "#,
        )
        .bind(ids)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        text: &str,
        kind: QuestionKind,
        category: &str,
        required: bool,
        order_index: i32,
    ) -> anyhow::Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions
            SET text = $2, kind = $3, category = $4, required = $5, order_index = $6
            WHERE id = $1
            RETURNING id, text, kind, category, required, order_index, created_at, created_by
            "#,
        )
        .bind(id)
        .bind(text)
        .bind(kind)
        .bind(category)
        .bind(required)
        .bind(order_index)
        .fetch_optional(db)
        .await?;
        Ok(question)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
