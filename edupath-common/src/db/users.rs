//! User persistence
//!
//! Users are created on first successful identity verification and are never
//! deleted by the application.

use sqlx::SqlitePool;
use tracing::info;

use crate::api::UserProfileUpdate;
use crate::db::models::{School, SchoolMajor, User};
use crate::{Error, Result};

const USER_COLUMNS: &str = "id, uid, email, is_active, first_name, last_name, phone_number, gender, school_id, school_major_id";

/// Load user by primary key
pub async fn get_user(pool: &SqlitePool, user_id: i64) -> Result<User> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))
}

/// Load user by external subject id
pub async fn find_user_by_uid(pool: &SqlitePool, uid: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE uid = ?");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(uid)
        .fetch_optional(pool)
        .await?)
}

/// Load user by email
pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?)
}

/// Resolve the local user for a verified external identity
///
/// Looks the user up by email. Missing users are created active; an existing
/// row without a subject id gets `uid` back-filled. Concurrent first logins for
/// the same email converge on a single row.
pub async fn get_or_create_user(pool: &SqlitePool, uid: &str, email: &str) -> Result<User> {
    if let Some(user) = find_user_by_email(pool, email).await? {
        if user.uid.is_none() {
            sqlx::query("UPDATE users SET uid = ? WHERE id = ? AND uid IS NULL")
                .bind(uid)
                .bind(user.id)
                .execute(pool)
                .await?;
            info!(user_id = user.id, "Linked existing user to external identity");
            return get_user(pool, user.id).await;
        }
        return Ok(user);
    }

    let result = sqlx::query(
        "INSERT INTO users (uid, email, is_active) VALUES (?, ?, 1) ON CONFLICT(email) DO NOTHING",
    )
    .bind(uid)
    .bind(email)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        info!(user_id = result.last_insert_rowid(), "Created user on first login");
    }

    find_user_by_email(pool, email)
        .await?
        .ok_or_else(|| Error::Internal(format!("User {} vanished after insert", email)))
}

/// Apply a partial profile update and return the stored user
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    update: &UserProfileUpdate,
) -> Result<User> {
    if let Some(school_id) = update.school_id {
        get_school(pool, school_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("School {} not found", school_id)))?;
    }
    if let Some(school_major_id) = update.school_major_id {
        get_school_major(pool, school_major_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("School major {} not found", school_major_id)))?;
    }

    let result = sqlx::query(
        r#"
        UPDATE users SET
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            phone_number = COALESCE(?, phone_number),
            gender = COALESCE(?, gender),
            school_id = COALESCE(?, school_id),
            school_major_id = COALESCE(?, school_major_id)
        WHERE id = ?
        "#,
    )
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.phone_number)
    .bind(&update.gender)
    .bind(update.school_id)
    .bind(update.school_major_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User {} not found", user_id)));
    }

    get_user(pool, user_id).await
}

pub async fn get_school(pool: &SqlitePool, school_id: i64) -> Result<Option<School>> {
    Ok(sqlx::query_as::<_, School>(
        "SELECT id, npsn, school_name, school_province, school_city FROM schools WHERE id = ?",
    )
    .bind(school_id)
    .fetch_optional(pool)
    .await?)
}

pub async fn get_school_major(
    pool: &SqlitePool,
    school_major_id: i64,
) -> Result<Option<SchoolMajor>> {
    Ok(sqlx::query_as::<_, SchoolMajor>(
        "SELECT id, school_major_name FROM school_major WHERE id = ?",
    )
    .bind(school_major_id)
    .fetch_optional(pool)
    .await?)
}
