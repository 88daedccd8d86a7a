//! Append-only topic rating log

use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::UserTopicRating;
use crate::{Error, Result};

/// Append a rating row
pub async fn insert_rating(
    conn: &mut SqliteConnection,
    user_id: i64,
    topic_id: i64,
    rating: i64,
) -> Result<UserTopicRating> {
    let id =
        sqlx::query("INSERT INTO user_topic_rating (user_id, topic_id, rating) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(topic_id)
            .bind(rating)
            .execute(conn)
            .await?
            .last_insert_rowid();

    Ok(UserTopicRating {
        id,
        user_id,
        rating,
        topic_id,
    })
}

/// All ratings by a user, oldest first
pub async fn list_ratings_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<UserTopicRating>> {
    Ok(sqlx::query_as::<_, UserTopicRating>(
        "SELECT id, user_id, rating, topic_id FROM user_topic_rating WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_rating(pool: &SqlitePool, rating_id: i64) -> Result<UserTopicRating> {
    sqlx::query_as::<_, UserTopicRating>(
        "SELECT id, user_id, rating, topic_id FROM user_topic_rating WHERE id = ?",
    )
    .bind(rating_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("UserTopicRating {} not found", rating_id)))
}
