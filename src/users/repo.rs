use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Role a user holds in the organisation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Employee,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "department")]
pub enum Department {
    Tech,
    Content,
    Admin,
    Sales,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub display_name: Option<String>,
    pub role: UserRole,
    pub department: Option<Department>,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, display_name, role, department, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by email. With duplicate rows present, the oldest wins.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, display_name, role, department, created_at
            FROM users
            WHERE email = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password. New accounts start as employees.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        display_name: Option<&str>,
        department: Option<Department>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, display_name, department)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, display_name, role, department, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .bind(department)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// All users, oldest first. Cleanup relies on this ordering to break
    /// created_at ties in favour of the earlier row.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, display_name, role, department, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_role(db: &PgPool, role: UserRole) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, display_name, role, department, created_at
            FROM users
            WHERE role = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(role)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Partial self-service profile update.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        display_name: Option<&str>,
        department: Option<Department>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                department = COALESCE($3, department)
            WHERE id = $1
            RETURNING id, email, password_hash, display_name, role, department, created_at
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(department)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Full admin-side update of name, role and department.
    pub async fn update_admin(
        db: &PgPool,
        id: Uuid,
        display_name: Option<&str>,
        role: UserRole,
        department: Option<Department>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET display_name = $2, role = $3, department = $4
            WHERE id = $1
            RETURNING id, email, password_hash, display_name, role, department, created_at
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(role)
        .bind(department)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn set_role(db: &PgPool, id: Uuid, role: UserRole) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $2
            WHERE id = $1
            RETURNING id, email, password_hash, display_name, role, department, created_at
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Delete a batch of users in one transactional statement.
    pub async fn delete_many(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut tx = db.begin().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, FromRow)]
pub struct UserCounts {
    pub total: i64,
    pub admins: i64,
    pub managers: i64,
    pub employees: i64,
    pub tech: i64,
    pub content: i64,
    pub admin_department: i64,
    pub sales: i64,
}

pub async fn count_by_role_and_department(db: &PgPool) -> anyhow::Result<UserCounts> {
    let counts = sqlx::query_as::<_, UserCounts>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE role = 'admin') AS admins,
            COUNT(*) FILTER (WHERE role = 'manager') AS managers,
            COUNT(*) FILTER (WHERE role = 'employee') AS employees,
            COUNT(*) FILTER (WHERE department = 'Tech') AS tech,
            COUNT(*) FILTER (WHERE department = 'Content') AS content,
            COUNT(*) FILTER (WHERE department = 'Admin') AS admin_department,
            COUNT(*) FILTER (WHERE department = 'Sales') AS sales
        FROM users
        "#,
    )
    .fetch_one(db)
    .await?;
    Ok(counts)
}

#[cfg(test)]
mod serde_tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            password_hash: "argon2-secret".to_string(),
            display_name: Some("User".to_string()),
            role: UserRole::Employee,
            department: Some(Department::Sales),
            created_at: OffsetDateTime::from_unix_timestamp(0).unwrap(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2-secret"));
        assert!(json.contains("user@example.com"));
    }

    #[test]
    fn roles_and_departments_use_stored_labels() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Department::Tech).unwrap(),
            "\"Tech\""
        );
    }
}
