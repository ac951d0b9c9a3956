use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::evaluations::repo::{Evaluation, EvaluationCounts, EvaluationKind, EvaluationStatus};
use crate::questions::repo::{Question, QuestionKind};

/// Answer value: an integer for slider questions, text for paragraphs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResponseValue {
    Rating(i64),
    Text(String),
}

/// A single answer, keyed by the question it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseItem {
    pub question_id: Uuid,
    pub value: ResponseValue,
    pub kind: QuestionKind,
}

/// Fan-out assignment: one evaluator, many evaluatees.
#[derive(Debug, Deserialize)]
pub struct AssignmentRequest {
    pub evaluator_id: Uuid,
    pub evaluatee_ids: Vec<Uuid>,
    pub template_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub created: Vec<Uuid>,
    pub kind: EvaluationKind,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub evaluator_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<EvaluationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Partial admin update of an evaluation.
#[derive(Debug, Deserialize)]
pub struct UpdateEvaluationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<EvaluationStatus>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub responses: Vec<ResponseItem>,
}

/// List item without the embedded snapshot and responses.
#[derive(Debug, Serialize)]
pub struct EvaluationSummary {
    pub id: Uuid,
    pub title: String,
    pub evaluator_id: Uuid,
    pub evaluatee_id: Uuid,
    pub kind: EvaluationKind,
    pub status: EvaluationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub assigned_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Evaluation> for EvaluationSummary {
    fn from(e: Evaluation) -> Self {
        Self {
            id: e.id,
            title: e.title,
            evaluator_id: e.evaluator_id,
            evaluatee_id: e.evaluatee_id,
            kind: e.kind,
            status: e.status,
            due_date: e.due_date,
            assigned_date: e.assigned_date,
            completed_date: e.completed_date,
            created_at: e.created_at,
        }
    }
}

/// Full evaluation including the question snapshot and responses.
#[derive(Debug, Serialize)]
pub struct EvaluationDetails {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub evaluator_id: Uuid,
    pub evaluatee_id: Uuid,
    pub kind: EvaluationKind,
    pub status: EvaluationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub assigned_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_date: Option<OffsetDateTime>,
    pub questions: Vec<Question>,
    pub responses: Vec<ResponseItem>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: Uuid,
}

impl From<Evaluation> for EvaluationDetails {
    fn from(e: Evaluation) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            evaluator_id: e.evaluator_id,
            evaluatee_id: e.evaluatee_id,
            kind: e.kind,
            status: e.status,
            due_date: e.due_date,
            assigned_date: e.assigned_date,
            completed_date: e.completed_date,
            questions: e.questions.0,
            responses: e.responses.0,
            created_at: e.created_at,
            created_by: e.created_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EvaluationStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
}

impl From<EvaluationCounts> for EvaluationStats {
    fn from(c: EvaluationCounts) -> Self {
        Self {
            total: c.total,
            pending: c.pending,
            in_progress: c.in_progress,
            completed: c.completed,
            overdue: c.overdue,
        }
    }
}

#[cfg(test)]
mod serde_tests {
    use super::*;

    #[test]
    fn evaluation_kind_uses_wire_labels() {
        assert_eq!(
            serde_json::to_string(&EvaluationKind::SelfReview).unwrap(),
            "\"self\""
        );
        assert_eq!(
            serde_json::to_string(&EvaluationKind::ManagerToEmployee).unwrap(),
            "\"manager_to_employee\""
        );
        let parsed: EvaluationKind = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(parsed, EvaluationKind::SelfReview);
    }

    #[test]
    fn response_values_are_untagged() {
        let id = Uuid::new_v4();

        let rating: ResponseItem = serde_json::from_str(&format!(
            r#"{{"question_id":"{id}","value":7,"kind":"slider"}}"#
        ))
        .unwrap();
        assert_eq!(rating.value, ResponseValue::Rating(7));

        let text: ResponseItem = serde_json::from_str(&format!(
            r#"{{"question_id":"{id}","value":"solid work","kind":"paragraph"}}"#
        ))
        .unwrap();
        assert_eq!(text.value, ResponseValue::Text("solid work".to_string()));

        let json = serde_json::to_string(&rating).unwrap();
        assert!(json.contains(":7"));
    }
}
