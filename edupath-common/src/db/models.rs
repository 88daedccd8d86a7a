//! Database models

use serde::{Deserialize, Serialize};

use crate::weights::WeightVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// External identity provider subject id
    pub uid: Option<String>,
    pub email: String,
    pub is_active: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub school_id: Option<i64>,
    pub school_major_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct School {
    pub id: i64,
    pub npsn: Option<String>,
    pub school_name: Option<String>,
    pub school_province: Option<String>,
    pub school_city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SchoolMajor {
    pub id: i64,
    pub school_major_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct College {
    pub id: i64,
    pub college_name: Option<String>,
    pub college_province: Option<String>,
    pub college_city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CollegeDetail {
    pub id: i64,
    pub college_id: i64,
    pub major_id: i64,
    pub capacity: Option<i64>,
    pub interest: Option<i64>,
    pub portofolio_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Major {
    pub id: i64,
    pub major_name: Option<String>,
    pub major_definition: Option<String>,
    pub major_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub course_name: Option<String>,
    pub course_image: Option<String>,
    pub course_definition: Option<String>,
    pub course_explain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Personality {
    pub id: i64,
    pub personality_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FutureProspect {
    pub id: i64,
    pub future_prospect_name: Option<String>,
    pub description: Option<String>,
}

/// Join row shared by `major_course`, `major_prospect` and `major_personality`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MajorLink {
    pub id: i64,
    pub major_id: i64,
    /// course_id, prospect_id or personality_id depending on the table
    pub target_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopicCategory {
    pub id: i64,
    pub topic_category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    pub id: i64,
    pub topic_name: Option<String>,
    pub topic_category_id: Option<i64>,
    pub short_introduction: Option<String>,
    pub topic_image: Option<String>,
    pub topic_image2: Option<String>,
    pub topic_explanation: Option<String>,
    /// Loaded from `topic_weights`; `None` when the topic has no vector
    #[sqlx(skip)]
    #[serde(default)]
    pub topic_weight: Option<WeightVector>,
}

/// One append-only rating event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserTopicRating {
    pub id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub topic_id: i64,
}
