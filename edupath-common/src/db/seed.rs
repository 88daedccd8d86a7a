//! Reference data seeding
//!
//! Schools, colleges, majors and topics (with their weight vectors) are
//! read-only to the application. They are loaded from a JSON document at
//! startup; rows are upserted by id so reseeding the same file is harmless.

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use std::path::Path;
use tracing::info;

use crate::db::models::{
    College, CollegeDetail, Course, FutureProspect, Major, MajorLink, Personality, School,
    SchoolMajor, Topic, TopicCategory,
};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub schools: Vec<School>,
    pub school_majors: Vec<SchoolMajor>,
    pub colleges: Vec<College>,
    pub majors: Vec<Major>,
    pub college_details: Vec<CollegeDetail>,
    pub courses: Vec<Course>,
    pub personalities: Vec<Personality>,
    pub future_prospects: Vec<FutureProspect>,
    pub major_courses: Vec<MajorLink>,
    pub major_prospects: Vec<MajorLink>,
    pub major_personalities: Vec<MajorLink>,
    pub topic_categories: Vec<TopicCategory>,
    pub topics: Vec<Topic>,
}

/// Counts of rows written by [`seed_reference_data`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub rows: usize,
    pub topics_with_weight: usize,
}

pub fn load_seed_file(path: &Path) -> Result<SeedData> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse seed file {}: {}", path.display(), e)))
}

/// Upsert all reference rows in a single transaction
pub async fn seed_reference_data(pool: &SqlitePool, data: &SeedData) -> Result<SeedSummary> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for s in &data.schools {
        sqlx::query(
            "INSERT OR REPLACE INTO schools (id, npsn, school_name, school_province, school_city) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(s.id)
        .bind(&s.npsn)
        .bind(&s.school_name)
        .bind(&s.school_province)
        .bind(&s.school_city)
        .execute(&mut *tx)
        .await?;
        summary.rows += 1;
    }

    for m in &data.school_majors {
        sqlx::query("INSERT OR REPLACE INTO school_major (id, school_major_name) VALUES (?, ?)")
            .bind(m.id)
            .bind(&m.school_major_name)
            .execute(&mut *tx)
            .await?;
        summary.rows += 1;
    }

    for c in &data.colleges {
        sqlx::query(
            "INSERT OR REPLACE INTO college (id, college_name, college_province, college_city) VALUES (?, ?, ?, ?)",
        )
        .bind(c.id)
        .bind(&c.college_name)
        .bind(&c.college_province)
        .bind(&c.college_city)
        .execute(&mut *tx)
        .await?;
        summary.rows += 1;
    }

    for m in &data.majors {
        sqlx::query(
            "INSERT OR REPLACE INTO major (id, major_name, major_definition, major_image) VALUES (?, ?, ?, ?)",
        )
        .bind(m.id)
        .bind(&m.major_name)
        .bind(&m.major_definition)
        .bind(&m.major_image)
        .execute(&mut *tx)
        .await?;
        summary.rows += 1;
    }

    for d in &data.college_details {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO college_detail
                (id, college_id, major_id, capacity, interest, portofolio_type)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(d.id)
        .bind(d.college_id)
        .bind(d.major_id)
        .bind(d.capacity)
        .bind(d.interest)
        .bind(&d.portofolio_type)
        .execute(&mut *tx)
        .await?;
        summary.rows += 1;
    }

    for c in &data.courses {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO course
                (id, course_name, course_image, course_definition, course_explain)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(c.id)
        .bind(&c.course_name)
        .bind(&c.course_image)
        .bind(&c.course_definition)
        .bind(&c.course_explain)
        .execute(&mut *tx)
        .await?;
        summary.rows += 1;
    }

    for p in &data.personalities {
        sqlx::query("INSERT OR REPLACE INTO personality (id, personality_name) VALUES (?, ?)")
            .bind(p.id)
            .bind(&p.personality_name)
            .execute(&mut *tx)
            .await?;
        summary.rows += 1;
    }

    for f in &data.future_prospects {
        sqlx::query(
            "INSERT OR REPLACE INTO future_prospect (id, future_prospect_name, description) VALUES (?, ?, ?)",
        )
        .bind(f.id)
        .bind(&f.future_prospect_name)
        .bind(&f.description)
        .execute(&mut *tx)
        .await?;
        summary.rows += 1;
    }

    for (table, column, links) in [
        ("major_course", "course_id", &data.major_courses),
        ("major_prospect", "prospect_id", &data.major_prospects),
        ("major_personality", "personality_id", &data.major_personalities),
    ] {
        let sql =
            format!("INSERT OR REPLACE INTO {table} (id, major_id, {column}) VALUES (?, ?, ?)");
        for link in links {
            sqlx::query(&sql)
                .bind(link.id)
                .bind(link.major_id)
                .bind(link.target_id)
                .execute(&mut *tx)
                .await?;
            summary.rows += 1;
        }
    }

    for c in &data.topic_categories {
        sqlx::query("INSERT OR REPLACE INTO topic_category (id, topic_category_name) VALUES (?, ?)")
            .bind(c.id)
            .bind(&c.topic_category_name)
            .execute(&mut *tx)
            .await?;
        summary.rows += 1;
    }

    for topic in &data.topics {
        if seed_topic(&mut tx, topic).await? {
            summary.topics_with_weight += 1;
        }
        summary.rows += 1;
    }

    tx.commit().await?;

    info!(
        rows = summary.rows,
        topics_with_weight = summary.topics_with_weight,
        "Reference data seeded"
    );
    Ok(summary)
}

/// Upsert one topic and replace its weight rows; returns whether it has a vector
async fn seed_topic(conn: &mut SqliteConnection, topic: &Topic) -> Result<bool> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO topics
            (id, topic_name, topic_category_id, short_introduction,
             topic_image, topic_image2, topic_explanation)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(topic.id)
    .bind(&topic.topic_name)
    .bind(topic.topic_category_id)
    .bind(&topic.short_introduction)
    .bind(&topic.topic_image)
    .bind(&topic.topic_image2)
    .bind(&topic.topic_explanation)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM topic_weights WHERE topic_id = ?")
        .bind(topic.id)
        .execute(&mut *conn)
        .await?;

    let Some(weight) = &topic.topic_weight else {
        return Ok(false);
    };

    for (index, value) in weight.as_slice().iter().enumerate() {
        sqlx::query("INSERT INTO topic_weights (topic_id, field_index, weight) VALUES (?, ?, ?)")
            .bind(topic.id)
            .bind(index as i64)
            .bind(value)
            .execute(&mut *conn)
            .await?;
    }

    Ok(true)
}
