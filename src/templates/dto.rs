use serde::Deserialize;
use uuid::Uuid;

use crate::evaluations::repo::EvaluationKind;

/// Template creation: the referenced questions are snapshotted into the
/// template at creation time.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub description: Option<String>,
    pub kind: EvaluationKind,
    pub question_ids: Vec<Uuid>,
}
