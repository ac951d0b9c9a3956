use std::collections::HashMap;

use axum::http::StatusCode;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::users::dto::CleanupReport;
use crate::users::repo::{User, UserRole};

/// Loads the caller and rejects unless their stored role is admin.
pub async fn require_admin(db: &PgPool, user_id: Uuid) -> Result<User, (StatusCode, String)> {
    let user = User::find_by_id(db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "failed to load requesting user");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    if user.role != UserRole::Admin {
        return Err((StatusCode::FORBIDDEN, "Admin access required".to_string()));
    }

    Ok(user)
}

pub struct CleanupPlan {
    pub delete_ids: Vec<Uuid>,
    pub kept: usize,
}

/// Groups users by email and marks everything but the oldest row of each
/// group for deletion. Ties on created_at keep the earlier input row.
pub fn plan_duplicate_cleanup(users: &[User]) -> CleanupPlan {
    let mut by_email: HashMap<&str, Vec<&User>> = HashMap::new();
    for user in users {
        by_email.entry(user.email.as_str()).or_default().push(user);
    }

    let mut delete_ids = Vec::new();
    let mut kept = 0usize;

    for (email, mut group) in by_email {
        if group.len() > 1 {
            group.sort_by_key(|u| u.created_at);
            let keep = group[0];
            kept += 1;
            for duplicate in &group[1..] {
                delete_ids.push(duplicate.id);
            }
            info!(
                email,
                keep = %keep.id,
                removed = group.len() - 1,
                "duplicate user group"
            );
        } else {
            kept += 1;
        }
    }

    CleanupPlan { delete_ids, kept }
}

/// Duplicate-user cleanup: keep the oldest profile per email, delete the
/// rest in one batched statement.
pub async fn cleanup_duplicate_users(db: &PgPool) -> anyhow::Result<CleanupReport> {
    let users = User::list_all(db).await?;
    let plan = plan_duplicate_cleanup(&users);

    let removed = if plan.delete_ids.is_empty() {
        info!("no duplicate users found");
        0
    } else {
        let n = User::delete_many(db, &plan.delete_ids).await?;
        info!(removed = n, kept = plan.kept, "duplicate user cleanup complete");
        n as usize
    };

    Ok(CleanupReport {
        removed,
        kept: plan.kept,
    })
}

#[cfg(test)]
mod cleanup_tests {
    use super::*;
    use time::OffsetDateTime;

    fn make_user(email: &str, created_at_unix: i64) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "x".to_string(),
            display_name: None,
            role: UserRole::Employee,
            department: None,
            created_at: OffsetDateTime::from_unix_timestamp(created_at_unix).unwrap(),
        }
    }

    #[test]
    fn no_duplicates_means_no_deletes() {
        let users = vec![make_user("a@example.com", 1), make_user("b@example.com", 2)];
        let plan = plan_duplicate_cleanup(&users);
        assert!(plan.delete_ids.is_empty());
        assert_eq!(plan.kept, 2);
    }

    #[test]
    fn keeps_the_oldest_of_each_group() {
        let oldest = make_user("dup@example.com", 10);
        let newer = make_user("dup@example.com", 20);
        let newest = make_user("dup@example.com", 30);
        let other = make_user("solo@example.com", 5);

        let users = vec![newer.clone(), oldest.clone(), newest.clone(), other];
        let plan = plan_duplicate_cleanup(&users);

        assert_eq!(plan.kept, 2);
        assert_eq!(plan.delete_ids.len(), 2);
        assert!(plan.delete_ids.contains(&newer.id));
        assert!(plan.delete_ids.contains(&newest.id));
        assert!(!plan.delete_ids.contains(&oldest.id));
    }

    #[test]
    fn created_at_tie_keeps_earlier_input_row() {
        let first = make_user("tie@example.com", 100);
        let second = make_user("tie@example.com", 100);

        let users = vec![first.clone(), second.clone()];
        let plan = plan_duplicate_cleanup(&users);

        assert_eq!(plan.delete_ids, vec![second.id]);
        assert_eq!(plan.kept, 1);
    }

    #[test]
    fn counts_cover_every_email_once() {
        let users = vec![
            make_user("a@example.com", 1),
            make_user("a@example.com", 2),
            make_user("a@example.com", 3),
            make_user("b@example.com", 1),
            make_user("b@example.com", 2),
            make_user("c@example.com", 1),
        ];
        let plan = plan_duplicate_cleanup(&users);
        assert_eq!(plan.kept, 3);
        assert_eq!(plan.delete_ids.len(), 3);
    }
}
