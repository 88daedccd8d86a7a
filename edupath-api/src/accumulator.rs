//! Topic rating and weight accumulation
//!
//! A rating is appended to the log and `rating * topic_weight` is added to the
//! user's weight vector in the same transaction. Topics without a weight
//! vector still get the rating recorded; only the accumulation is skipped.

use edupath_common::db::models::UserTopicRating;
use edupath_common::db::{ratings, topics, users, weights};
use edupath_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

pub fn validate_rating(rating: i64) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(Error::InvalidInput(format!(
            "rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, rating
        )));
    }
    Ok(())
}

/// Record a rating and fold it into the user's weight vector
pub async fn record_rating(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
    rating: i64,
) -> Result<UserTopicRating> {
    validate_rating(rating)?;

    users::get_user(pool, user_id).await?;
    if !topics::topic_exists(pool, topic_id).await? {
        return Err(Error::NotFound(format!("Topic {} not found", topic_id)));
    }

    // First statement is a write, so the transaction holds SQLite's write
    // lock for its whole duration and concurrent ratings serialize
    let mut tx = pool.begin().await?;
    let record = ratings::insert_rating(&mut *tx, user_id, topic_id, rating).await?;
    let accumulated =
        weights::accumulate_user_weight(&mut *tx, user_id, topic_id, rating).await?;
    tx.commit().await?;

    if accumulated {
        info!(user_id, topic_id, rating, rating_id = record.id, "Rating recorded");
    } else {
        warn!(
            user_id,
            topic_id,
            rating_id = record.id,
            "Topic has no weight vector; rating recorded without accumulation"
        );
    }

    Ok(record)
}
