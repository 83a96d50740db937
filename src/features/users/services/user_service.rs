use std::str::FromStr;

use sqlx::{FromRow, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::permissions::Role;
use crate::features::users::dtos::UserAccessDto;
use crate::shared::constants::ACCESS_NOLOGIN;

#[derive(Debug, FromRow)]
struct UserRow {
    id: i32,
    email: String,
    staff_name: Option<String>,
    active: bool,
    roles: Vec<String>,
}

const USER_WITH_ROLES: &str = r#"
    SELECT u.id, u.email, u.staff_name, u.active,
           COALESCE(
               array_agg(r.name ORDER BY r.id) FILTER (WHERE r.name IS NOT NULL),
               '{}'
           ) AS roles
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

/// Known role names; anything else in the table is skipped
fn parse_roles(user_id: i32, names: &[String]) -> Vec<Role> {
    names
        .iter()
        .filter_map(|name| match Role::from_str(name) {
            Ok(role) => Some(role),
            Err(_) => {
                tracing::warn!("Ignoring unknown role '{}' for user {}", name, user_id);
                None
            }
        })
        .collect()
}

/// Access level shown to admins: inactive accounts are `nologin`, no role reads as observer
pub fn access_label(active: bool, roles: &[String]) -> String {
    if !active {
        return ACCESS_NOLOGIN.to_string();
    }
    roles
        .first()
        .cloned()
        .unwrap_or_else(|| Role::Observer.as_str().to_string())
}

/// `None` means deactivate
pub fn parse_access(access: &str) -> Result<Option<Role>> {
    let access = access.trim().to_lowercase();
    if access == ACCESS_NOLOGIN {
        return Ok(None);
    }
    Role::from_str(&access)
        .map(Some)
        .map_err(|_| AppError::Validation(format!("Unknown access level: {}", access)))
}

impl From<UserRow> for UserAccessDto {
    fn from(row: UserRow) -> Self {
        Self {
            access: access_label(row.active, &row.roles),
            id: row.id,
            email: row.email,
            staff_name: row.staff_name,
        }
    }
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_row(&self, user_id: i32) -> Result<Option<UserRow>> {
        let sql = format!("{} WHERE u.id = $1 GROUP BY u.id", USER_WITH_ROLES);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load user {}: {:?}", user_id, e);
                AppError::Database(e)
            })
    }

    /// The request's user, or `None` when unknown or deactivated
    pub async fn find_active_user(&self, user_id: i32) -> Result<Option<AuthenticatedUser>> {
        let Some(row) = self.find_row(user_id).await? else {
            return Ok(None);
        };
        if !row.active {
            tracing::debug!("User {} is not active", user_id);
            return Ok(None);
        }

        Ok(Some(AuthenticatedUser {
            id: row.id,
            roles: parse_roles(row.id, &row.roles),
            email: row.email,
            staff_name: row.staff_name,
        }))
    }

    pub async fn list_all_users(&self) -> Result<Vec<UserAccessDto>> {
        let sql = format!("{} GROUP BY u.id ORDER BY u.email", USER_WITH_ROLES);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(UserAccessDto::from).collect())
    }

    /// `nologin` deactivates; a role name reactivates and replaces all roles
    pub async fn set_user_access(&self, user_id: i32, access: &str) -> Result<UserAccessDto> {
        let role = parse_access(access)?;

        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        match role {
            None => {
                sqlx::query("UPDATE users SET active = FALSE WHERE id = $1")
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
            Some(role) => {
                sqlx::query("UPDATE users SET active = TRUE WHERE id = $1")
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query(
                    "INSERT INTO user_roles (user_id, role_id) SELECT $1, id FROM roles WHERE name = $2",
                )
                .bind(user_id)
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to update access for user {}: {:?}", user_id, e);
            AppError::Database(e)
        })?;

        tracing::info!("Set access of user {} to {}", user_id, access);

        self.find_row(user_id)
            .await?
            .map(UserAccessDto::from)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }
}
