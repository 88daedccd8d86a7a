//! Topic reads
//!
//! Topics and their weight vectors are immutable after seeding.

use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::Topic;
use crate::fields::FIELD_COUNT;
use crate::weights::WeightVector;
use crate::{Error, Result};

/// Load topic with its weight vector (if any)
pub async fn get_topic(pool: &SqlitePool, topic_id: i64) -> Result<Topic> {
    let mut topic = sqlx::query_as::<_, Topic>(
        r#"
        SELECT id, topic_name, topic_category_id, short_introduction,
               topic_image, topic_image2, topic_explanation
        FROM topics
        WHERE id = ?
        "#,
    )
    .bind(topic_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Topic {} not found", topic_id)))?;

    let mut conn = pool.acquire().await?;
    topic.topic_weight = load_topic_weight(&mut conn, topic_id).await?;

    Ok(topic)
}

/// Check that a topic row exists
pub async fn topic_exists(pool: &SqlitePool, topic_id: i64) -> Result<bool> {
    Ok(sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM topics WHERE id = ?)")
        .bind(topic_id)
        .fetch_one(pool)
        .await?)
}

/// Load a topic's weight vector; `None` unless all components are present
pub async fn load_topic_weight(
    conn: &mut SqliteConnection,
    topic_id: i64,
) -> Result<Option<WeightVector>> {
    let rows: Vec<(i64, f64)> = sqlx::query_as(
        "SELECT field_index, weight FROM topic_weights WHERE topic_id = ? ORDER BY field_index",
    )
    .bind(topic_id)
    .fetch_all(conn)
    .await?;

    if rows.len() != FIELD_COUNT {
        return Ok(None);
    }

    WeightVector::from_components(rows.into_iter().map(|(_, w)| w).collect()).map(Some)
}
