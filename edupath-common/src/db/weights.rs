//! User topic weight storage
//!
//! The preference vector is owned by the user and only ever changed through
//! [`accumulate_user_weight`], which performs the addition inside SQLite.
//! There is no application-side read-modify-write, so concurrent ratings for
//! the same user cannot lose an update.

use sqlx::{SqliteConnection, SqlitePool};

use crate::fields::FIELD_COUNT;
use crate::weights::WeightVector;
use crate::Result;

/// Add `rating * topic_weight` to the user's vector
///
/// Returns `false` (and writes nothing) when the topic has no weight vector,
/// i.e. fewer than `FIELD_COUNT` rows in `topic_weights`. A user without a
/// vector starts from zero.
pub async fn accumulate_user_weight(
    conn: &mut SqliteConnection,
    user_id: i64,
    topic_id: i64,
    rating: i64,
) -> Result<bool> {
    // Write statements come first so the transaction takes the write lock
    // up front. Materializes the zero vector for components the user lacks.
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO user_topic_weights (user_id, field_index, weight)
        SELECT ?, field_index, 0.0 FROM topic_weights
        WHERE topic_id = ?
          AND (SELECT COUNT(*) FROM topic_weights WHERE topic_id = ?) = ?
        "#,
    )
    .bind(user_id)
    .bind(topic_id)
    .bind(topic_id)
    .bind(FIELD_COUNT as i64)
    .execute(&mut *conn)
    .await?;

    let updated = sqlx::query(
        r#"
        UPDATE user_topic_weights
        SET weight = weight + ? * (
            SELECT tw.weight FROM topic_weights tw
            WHERE tw.topic_id = ? AND tw.field_index = user_topic_weights.field_index
        )
        WHERE user_id = ?
          AND field_index IN (SELECT field_index FROM topic_weights WHERE topic_id = ?)
          AND (SELECT COUNT(*) FROM topic_weights WHERE topic_id = ?) = ?
        "#,
    )
    .bind(rating)
    .bind(topic_id)
    .bind(user_id)
    .bind(topic_id)
    .bind(topic_id)
    .bind(FIELD_COUNT as i64)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(updated > 0)
}

/// Load the user's accumulated vector; `None` when absent
pub async fn load_user_weight(pool: &SqlitePool, user_id: i64) -> Result<Option<WeightVector>> {
    let rows: Vec<(i64, f64)> = sqlx::query_as(
        "SELECT field_index, weight FROM user_topic_weights WHERE user_id = ? ORDER BY field_index",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Ok(None);
    }

    let mut components = vec![0.0; FIELD_COUNT];
    for (index, weight) in rows {
        if let Some(slot) = components.get_mut(index as usize) {
            *slot = weight;
        }
    }

    WeightVector::from_components(components).map(Some)
}
