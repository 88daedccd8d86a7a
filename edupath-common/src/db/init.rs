//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates every table
//! idempotently. Reference tables are filled by [`crate::db::seed`].

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every pooled connection
///
/// Rating writes for the same user serialize on SQLite's write lock; waiting
/// writers block up to this long instead of failing with SQLITE_BUSY.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Per-connection options: the pool applies them to every connection it opens
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // Reference data
    create_schools_tables(pool).await?;
    create_college_tables(pool).await?;
    create_major_tables(pool).await?;
    create_topic_tables(pool).await?;

    // User-owned data
    create_users_table(pool).await?;
    create_rating_tables(pool).await?;
    create_revoked_tokens_table(pool).await?;

    info!("Database schema ready");
    Ok(())
}

async fn create_schools_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schools (
            id INTEGER PRIMARY KEY,
            npsn TEXT,
            school_name TEXT,
            school_province TEXT,
            school_city TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS school_major (
            id INTEGER PRIMARY KEY,
            school_major_name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_college_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS college (
            id INTEGER PRIMARY KEY,
            college_name TEXT,
            college_province TEXT,
            college_city TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // major table is created by create_major_tables; SQLite resolves the
    // reference lazily so creation order does not matter
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS college_detail (
            id INTEGER PRIMARY KEY,
            college_id INTEGER NOT NULL REFERENCES college(id),
            major_id INTEGER NOT NULL REFERENCES major(id),
            capacity INTEGER,
            interest INTEGER,
            portofolio_type TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_college_detail_major ON college_detail(major_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_major_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS major (
            id INTEGER PRIMARY KEY,
            major_name TEXT,
            major_definition TEXT,
            major_image TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS course (
            id INTEGER PRIMARY KEY,
            course_name TEXT,
            course_image TEXT,
            course_definition TEXT,
            course_explain TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS personality (
            id INTEGER PRIMARY KEY,
            personality_name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS future_prospect (
            id INTEGER PRIMARY KEY,
            future_prospect_name TEXT,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Linking tables
    for (table, column, target) in [
        ("major_course", "course_id", "course"),
        ("major_prospect", "prospect_id", "future_prospect"),
        ("major_personality", "personality_id", "personality"),
    ] {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY,
                major_id INTEGER NOT NULL REFERENCES major(id),
                {column} INTEGER NOT NULL REFERENCES {target}(id)
            )
            "#
        );
        sqlx::query(&sql).execute(pool).await?;
    }

    Ok(())
}

async fn create_topic_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topic_category (
            id INTEGER PRIMARY KEY,
            topic_category_name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            id INTEGER PRIMARY KEY,
            topic_name TEXT,
            topic_category_id INTEGER,
            short_introduction TEXT,
            topic_image TEXT,
            topic_image2 TEXT,
            topic_explanation TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One row per (topic, field); a topic without rows has no weight vector
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topic_weights (
            topic_id INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            field_index INTEGER NOT NULL CHECK (field_index >= 0 AND field_index < 17),
            weight REAL NOT NULL,
            PRIMARY KEY (topic_id, field_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT UNIQUE,
            email TEXT NOT NULL UNIQUE,
            is_active INTEGER NOT NULL DEFAULT 1,
            first_name TEXT,
            last_name TEXT,
            phone_number TEXT,
            gender TEXT,
            school_id INTEGER REFERENCES schools(id),
            school_major_id INTEGER REFERENCES school_major(id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_rating_tables(pool: &SqlitePool) -> Result<()> {
    // Append-only rating log
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_topic_rating (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            topic_id INTEGER NOT NULL REFERENCES topics(id),
            rating INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_user_topic_rating_user ON user_topic_rating(user_id)",
    )
    .execute(pool)
    .await?;

    // Accumulated preference vector; no rows means the vector is absent
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_topic_weights (
            user_id INTEGER NOT NULL REFERENCES users(id),
            field_index INTEGER NOT NULL CHECK (field_index >= 0 AND field_index < 17),
            weight REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, field_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_revoked_tokens_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS revoked_tokens (
            token TEXT PRIMARY KEY,
            expires_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
