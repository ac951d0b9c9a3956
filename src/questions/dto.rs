use serde::Deserialize;

use crate::questions::repo::QuestionKind;

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub text: String,
    pub kind: QuestionKind,
    pub category: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub order_index: i32,
}

/// Full update; the edit form always submits every field.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub text: String,
    pub kind: QuestionKind,
    pub category: String,
    pub required: bool,
    pub order_index: i32,
}

fn default_required() -> bool {
    true
}
