use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::{Department, User, UserCounts, UserRole};

/// Public part of the user returned to clients.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub department: Option<Department>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            department: user.department,
            created_at: user.created_at,
        }
    }
}

/// Self-service profile update.
#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub display_name: Option<String>,
    pub department: Option<Department>,
}

/// Admin-side user update.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub role: UserRole,
    pub department: Option<Department>,
}

#[derive(Debug, Deserialize)]
pub struct RoleFilter {
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub total: i64,
    pub admins: i64,
    pub managers: i64,
    pub employees: i64,
    pub tech: i64,
    pub content: i64,
    pub admin_department: i64,
    pub sales: i64,
}

impl From<UserCounts> for UserStats {
    fn from(c: UserCounts) -> Self {
        Self {
            total: c.total,
            admins: c.admins,
            managers: c.managers,
            employees: c.employees,
            tech: c.tech,
            content: c.content,
            admin_department: c.admin_department,
            sales: c.sales,
        }
    }
}

/// Outcome of the duplicate-user cleanup.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub kept: usize,
}
