use thiserror::Error;
use uuid::Uuid;

use crate::evaluations::dto::{ResponseItem, ResponseValue};
use crate::evaluations::repo::EvaluationKind;
use crate::questions::repo::{Question, QuestionKind};
use crate::users::repo::{User, UserRole};

/// How many bank questions an assignment uses when no template is given.
pub const DEFAULT_QUESTION_COUNT: usize = 5;

/// Derive the evaluation kind from the evaluator/evaluatee role pair.
///
/// The order of the checks matters: a self evaluation wins over everything,
/// and the manager/employee pairings win over the admin fallbacks.
pub fn infer_evaluation_kind(evaluator: &User, evaluatee: &User) -> EvaluationKind {
    if evaluator.id == evaluatee.id {
        return EvaluationKind::SelfReview;
    }
    match (evaluator.role, evaluatee.role) {
        (UserRole::Manager, UserRole::Employee) => EvaluationKind::ManagerToEmployee,
        (UserRole::Employee, UserRole::Manager) => EvaluationKind::EmployeeToManager,
        (a, b) if a == b => EvaluationKind::Peer,
        (UserRole::Admin, _) => EvaluationKind::AdminReview,
        (_, UserRole::Admin) => EvaluationKind::AdminFeedback,
        _ => EvaluationKind::CrossRole,
    }
}

/// "manager_to_employee" becomes "Evaluation: Manager To Employee".
pub fn assignment_title(kind: EvaluationKind) -> String {
    let label = kind
        .as_str()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("Evaluation: {label}")
}

/// Evaluatee suggestions for an evaluator, following the role hierarchy:
/// employees first, then managers, then admins. Admin evaluators see
/// everyone else in stored order. The evaluator is never suggested.
pub fn suggest_evaluatees(evaluator: &User, users: &[User]) -> Vec<User> {
    let others: Vec<&User> = users.iter().filter(|u| u.id != evaluator.id).collect();

    match evaluator.role {
        UserRole::Employee | UserRole::Manager => {
            let mut suggestions = Vec::with_capacity(others.len());
            for role in [UserRole::Employee, UserRole::Manager, UserRole::Admin] {
                suggestions.extend(others.iter().filter(|u| u.role == role).map(|u| (*u).clone()));
            }
            suggestions
        }
        UserRole::Admin => others.into_iter().cloned().collect(),
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    #[error("missing response for required question \"{0}\"")]
    MissingRequired(String),
    #[error("response references unknown question {0}")]
    UnknownQuestion(Uuid),
    #[error("response for \"{0}\" has the wrong value type")]
    WrongValueType(String),
    #[error("slider response for \"{0}\" must be between 1 and 10")]
    SliderOutOfRange(String),
    #[error("paragraph response for \"{0}\" must not be empty")]
    EmptyParagraph(String),
}

/// Check submitted responses against the evaluation's question snapshot.
pub fn validate_responses(
    questions: &[Question],
    responses: &[ResponseItem],
) -> Result<(), ResponseError> {
    for response in responses {
        let question = questions
            .iter()
            .find(|q| q.id == response.question_id)
            .ok_or(ResponseError::UnknownQuestion(response.question_id))?;

        match (question.kind, &response.value) {
            (QuestionKind::Slider, ResponseValue::Rating(value)) => {
                if !(1..=10).contains(value) {
                    return Err(ResponseError::SliderOutOfRange(question.text.clone()));
                }
            }
            (QuestionKind::Paragraph, ResponseValue::Text(text)) => {
                if text.trim().is_empty() {
                    return Err(ResponseError::EmptyParagraph(question.text.clone()));
                }
            }
            _ => return Err(ResponseError::WrongValueType(question.text.clone())),
        }
    }

    for question in questions.iter().filter(|q| q.required) {
        if !responses.iter().any(|r| r.question_id == question.id) {
            return Err(ResponseError::MissingRequired(question.text.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo::Department;
    use time::OffsetDateTime;

    fn make_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{:?}@example.com", role).to_lowercase(),
            password_hash: "x".to_string(),
            display_name: None,
            role,
            department: Some(Department::Tech),
            created_at: OffsetDateTime::from_unix_timestamp(0).unwrap(),
        }
    }

    fn make_question(kind: QuestionKind, required: bool) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "How well does this person collaborate?".to_string(),
            kind,
            category: "Teamwork".to_string(),
            required,
            order_index: 0,
            created_at: OffsetDateTime::from_unix_timestamp(0).unwrap(),
            created_by: Uuid::new_v4(),
        }
    }

    fn rating(question: &Question, value: i64) -> ResponseItem {
        ResponseItem {
            question_id: question.id,
            value: ResponseValue::Rating(value),
            kind: question.kind,
        }
    }

    fn text(question: &Question, value: &str) -> ResponseItem {
        ResponseItem {
            question_id: question.id,
            value: ResponseValue::Text(value.to_string()),
            kind: question.kind,
        }
    }

    #[test]
    fn same_user_is_self_evaluation() {
        let user = make_user(UserRole::Manager);
        assert_eq!(
            infer_evaluation_kind(&user, &user),
            EvaluationKind::SelfReview
        );
    }

    #[test]
    fn manager_evaluating_employee() {
        let manager = make_user(UserRole::Manager);
        let employee = make_user(UserRole::Employee);
        assert_eq!(
            infer_evaluation_kind(&manager, &employee),
            EvaluationKind::ManagerToEmployee
        );
    }

    #[test]
    fn employee_evaluating_manager() {
        let employee = make_user(UserRole::Employee);
        let manager = make_user(UserRole::Manager);
        assert_eq!(
            infer_evaluation_kind(&employee, &manager),
            EvaluationKind::EmployeeToManager
        );
    }

    #[test]
    fn same_role_is_peer() {
        for role in [UserRole::Admin, UserRole::Manager, UserRole::Employee] {
            let a = make_user(role);
            let b = make_user(role);
            assert_eq!(infer_evaluation_kind(&a, &b), EvaluationKind::Peer);
        }
    }

    #[test]
    fn admin_evaluator_is_admin_review() {
        let admin = make_user(UserRole::Admin);
        for role in [UserRole::Manager, UserRole::Employee] {
            let other = make_user(role);
            assert_eq!(
                infer_evaluation_kind(&admin, &other),
                EvaluationKind::AdminReview
            );
        }
    }

    #[test]
    fn admin_evaluatee_is_admin_feedback() {
        let admin = make_user(UserRole::Admin);
        for role in [UserRole::Manager, UserRole::Employee] {
            let other = make_user(role);
            assert_eq!(
                infer_evaluation_kind(&other, &admin),
                EvaluationKind::AdminFeedback
            );
        }
    }

    #[test]
    fn assignment_titles_are_humanized() {
        assert_eq!(
            assignment_title(EvaluationKind::ManagerToEmployee),
            "Evaluation: Manager To Employee"
        );
        assert_eq!(assignment_title(EvaluationKind::Peer), "Evaluation: Peer");
        assert_eq!(
            assignment_title(EvaluationKind::SelfReview),
            "Evaluation: Self"
        );
    }

    #[test]
    fn suggestions_follow_role_hierarchy() {
        let evaluator = make_user(UserRole::Employee);
        let admin = make_user(UserRole::Admin);
        let manager = make_user(UserRole::Manager);
        let employee = make_user(UserRole::Employee);

        let users = vec![
            admin.clone(),
            evaluator.clone(),
            manager.clone(),
            employee.clone(),
        ];
        let suggestions = suggest_evaluatees(&evaluator, &users);

        let ids: Vec<Uuid> = suggestions.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![employee.id, manager.id, admin.id]);
    }

    #[test]
    fn admin_evaluator_gets_everyone_else_in_stored_order() {
        let evaluator = make_user(UserRole::Admin);
        let manager = make_user(UserRole::Manager);
        let employee = make_user(UserRole::Employee);

        let users = vec![manager.clone(), evaluator.clone(), employee.clone()];
        let suggestions = suggest_evaluatees(&evaluator, &users);

        let ids: Vec<Uuid> = suggestions.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![manager.id, employee.id]);
    }

    #[test]
    fn suggestions_never_include_the_evaluator() {
        let evaluator = make_user(UserRole::Manager);
        let users = vec![evaluator.clone()];
        assert!(suggest_evaluatees(&evaluator, &users).is_empty());
    }

    #[test]
    fn valid_responses_pass() {
        let slider = make_question(QuestionKind::Slider, true);
        let paragraph = make_question(QuestionKind::Paragraph, true);
        let responses = vec![rating(&slider, 7), text(&paragraph, "Great teammate.")];
        assert_eq!(
            validate_responses(&[slider, paragraph], &responses),
            Ok(())
        );
    }

    #[test]
    fn missing_required_response_is_rejected() {
        let slider = make_question(QuestionKind::Slider, true);
        let err = validate_responses(&[slider.clone()], &[]).unwrap_err();
        assert_eq!(err, ResponseError::MissingRequired(slider.text));
    }

    #[test]
    fn optional_question_may_be_skipped() {
        let slider = make_question(QuestionKind::Slider, false);
        assert_eq!(validate_responses(&[slider], &[]), Ok(()));
    }

    #[test]
    fn slider_out_of_range_is_rejected() {
        let slider = make_question(QuestionKind::Slider, false);
        for value in [0, 11, -3] {
            let err =
                validate_responses(&[slider.clone()], &[rating(&slider, value)]).unwrap_err();
            assert_eq!(err, ResponseError::SliderOutOfRange(slider.text.clone()));
        }
    }

    #[test]
    fn blank_paragraph_is_rejected() {
        let paragraph = make_question(QuestionKind::Paragraph, true);
        let err =
            validate_responses(&[paragraph.clone()], &[text(&paragraph, "   ")]).unwrap_err();
        assert_eq!(err, ResponseError::EmptyParagraph(paragraph.text));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let slider = make_question(QuestionKind::Slider, true);
        let err =
            validate_responses(&[slider.clone()], &[text(&slider, "seven")]).unwrap_err();
        assert_eq!(err, ResponseError::WrongValueType(slider.text));
    }

    #[test]
    fn unknown_question_id_is_rejected() {
        let slider = make_question(QuestionKind::Slider, false);
        let stray = make_question(QuestionKind::Slider, false);
        let err = validate_responses(&[slider], &[rating(&stray, 5)]).unwrap_err();
        assert_eq!(err, ResponseError::UnknownQuestion(stray.id));
    }
}
