use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::db::with_transaction;
use crate::modules::users::model::{AdminUpdateUserDto, ChangePasswordDto, UpdateProfileDto, User};
use crate::utils::errors::AppError;
use crate::utils::pagination::{FilterValue, Pagination};
use crate::utils::password::{hash_password, verify_password};

const USER_COLUMNS: &str =
    "id, username, email, password, full_name, phone, role, status, created_at, updated_at";

/// Trims an optional text field; empty input persists as NULL.
pub(crate) fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub struct UserService;

impl UserService {
    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn get_user(db: &PgPool, id: i64) -> Result<User, AppError> {
        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Combined uniqueness probe over username and email, optionally
    /// excluding one row (the row being updated).
    pub(crate) async fn username_or_email_taken(
        db: &PgPool,
        username: &str,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        let existing: Option<i64> = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT id FROM users WHERE (username = $1 OR email = $2) AND id != $3",
                )
                .bind(username)
                .bind(email)
                .bind(id)
                .fetch_optional(db)
                .await?
            }
            None => sqlx::query_scalar("SELECT id FROM users WHERE username = $1 OR email = $2")
                .bind(username)
                .bind(email)
                .fetch_optional(db)
                .await?,
        };
        Ok(existing.is_some())
    }

    #[instrument(skip_all, fields(user_id = id))]
    pub async fn update_profile(
        db: &PgPool,
        id: i64,
        dto: UpdateProfileDto,
    ) -> Result<User, AppError> {
        Self::apply_update(db, id, AdminUpdateUserDto::from_profile(dto)).await
    }

    #[instrument(skip_all, fields(user_id = id))]
    pub async fn admin_update_user(
        db: &PgPool,
        id: i64,
        dto: AdminUpdateUserDto,
    ) -> Result<User, AppError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        if exists.is_none() {
            return Err(AppError::not_found("User not found"));
        }

        Self::apply_update(db, id, dto).await
    }

    /// Partial update: a parameterized mutation is accumulated from a fixed
    /// checklist of optional fields. Zero accumulated fields rejects before
    /// anything is written; `updated_at` is refreshed on every accepted
    /// update.
    async fn apply_update(db: &PgPool, id: i64, dto: AdminUpdateUserDto) -> Result<User, AppError> {
        let email = dto.email.as_deref().map(|e| e.trim().to_lowercase());

        if dto.username.is_some() || email.is_some() {
            let taken = Self::username_or_email_taken(
                db,
                dto.username.as_deref().unwrap_or(""),
                email.as_deref().unwrap_or(""),
                Some(id),
            )
            .await?;
            if taken {
                return Err(AppError::conflict("Username or email already exists"));
            }
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut fields = qb.separated(", ");
        let mut touched = false;

        if let Some(username) = &dto.username {
            fields.push("username = ");
            fields.push_bind_unseparated(username.trim().to_string());
            touched = true;
        }
        if let Some(email) = &email {
            fields.push("email = ");
            fields.push_bind_unseparated(email.clone());
            touched = true;
        }
        if let Some(full_name) = &dto.full_name {
            fields.push("full_name = ");
            fields.push_bind_unseparated(normalize_optional(full_name));
            touched = true;
        }
        if let Some(phone) = &dto.phone {
            fields.push("phone = ");
            fields.push_bind_unseparated(normalize_optional(phone));
            touched = true;
        }
        if let Some(role) = dto.role {
            fields.push("role = ");
            fields.push_bind_unseparated(role);
            touched = true;
        }
        if let Some(status) = dto.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status);
            touched = true;
        }

        if !touched {
            return Err(AppError::bad_request("No fields to update"));
        }

        fields.push("updated_at = NOW()");
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(format!(" RETURNING {USER_COLUMNS}"));

        let user = qb.build_query_as::<User>().fetch_one(db).await?;
        Ok(user)
    }

    #[instrument(skip_all, fields(user_id = id))]
    pub async fn change_password(
        db: &PgPool,
        id: i64,
        dto: ChangePasswordDto,
        bcrypt_cost: u32,
    ) -> Result<(), AppError> {
        with_transaction(db, move |tx| {
            Box::pin(async move {
                let current_hash: Option<String> =
                    sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
                        .bind(id)
                        .fetch_optional(&mut **tx)
                        .await?;
                let current_hash =
                    current_hash.ok_or_else(|| AppError::not_found("User not found"))?;

                if !verify_password(&dto.current_password, &current_hash)? {
                    return Err(AppError::bad_request("Current password is incorrect"));
                }

                let new_hash = hash_password(&dto.new_password, bcrypt_cost)?;
                sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
                    .bind(new_hash)
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;

                Ok(())
            })
        })
        .await
    }

    /// Paginated, searched, sorted, and filtered listing over every row
    /// including inactive accounts. The total is counted independently of
    /// the page slice.
    #[instrument(skip_all)]
    pub async fn list_users(
        db: &PgPool,
        pagination: &Pagination,
    ) -> Result<(Vec<User>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        Self::push_list_conditions(&mut count_qb, pagination);
        let total: i64 = count_qb.build_query_scalar().fetch_one(db).await?;

        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        Self::push_list_conditions(&mut qb, pagination);

        let (sort_by, order) = pagination
            .sorting
            .as_ref()
            .map(|s| (s.sort_by.as_str(), s.order.as_sql()))
            .unwrap_or(("created_at", "DESC"));
        // sort_by has passed the allow-list; safe to splice.
        qb.push(format!(" ORDER BY {sort_by} {order}"));
        qb.push(" LIMIT ");
        qb.push_bind(pagination.limit);
        qb.push(" OFFSET ");
        qb.push_bind(pagination.offset);

        let users = qb.build_query_as::<User>().fetch_all(db).await?;
        Ok((users, total))
    }

    /// Shared WHERE clause for the count and data queries, so the total is
    /// always computed over the same row set as the page slice.
    fn push_list_conditions(qb: &mut QueryBuilder<'_, Postgres>, pagination: &Pagination) {
        let mut has_where = false;

        if let Some(search) = &pagination.search {
            let pattern = format!("%{search}%");
            qb.push(" WHERE (username ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR email ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR full_name ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
            has_where = true;
        }

        for (key, value) in &pagination.filters {
            let (column, cast) = match key.as_str() {
                "role" => ("role", "user_role"),
                "status" => ("status", "user_status"),
                _ => continue,
            };
            let FilterValue::Text(text) = value else {
                continue;
            };
            qb.push(if has_where { " AND " } else { " WHERE " });
            qb.push(column);
            qb.push(" = ");
            qb.push_bind(text.clone());
            qb.push(format!("::{cast}"));
            has_where = true;
        }
    }

    #[instrument(skip_all, fields(user_id = id, acting_id = acting_admin_id))]
    pub async fn delete_user(db: &PgPool, id: i64, acting_admin_id: i64) -> Result<(), AppError> {
        if id == acting_admin_id {
            return Err(AppError::bad_request("Cannot delete your own account"));
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        if exists.is_none() {
            return Err(AppError::not_found("User not found"));
        }

        // Logical delete: the row is kept, only the status flips.
        sqlx::query("UPDATE users SET status = 'inactive', updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}
