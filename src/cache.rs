use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::models::CachedRecommendation;

/// Persistent label cache, keyed by student id with upsert semantics.
/// No eviction or expiry: rows live until the store owner removes them,
/// and a retrained model does not invalidate existing entries.
#[async_trait]
pub trait RecommendationCache: Send + Sync {
    async fn fetch(&self, student_id: i64) -> anyhow::Result<Option<CachedRecommendation>>;
    async fn store(
        &self,
        student_id: i64,
        study_method: i32,
        engagement: i32,
    ) -> anyhow::Result<()>;
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS student_recommendations (
            id_student BIGINT PRIMARY KEY,
            predicted_study_method INT NOT NULL,
            engagement_level INT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub struct PgCache {
    pool: PgPool,
}

impl PgCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecommendationCache for PgCache {
    async fn fetch(&self, student_id: i64) -> anyhow::Result<Option<CachedRecommendation>> {
        let row = sqlx::query(
            "SELECT predicted_study_method, engagement_level \
             FROM student_recommendations WHERE id_student = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        // Decode failures surface as None fields; the engine demotes such
        // rows to a cache miss rather than erroring.
        Ok(row.map(|row| CachedRecommendation {
            predicted_study_method: row
                .try_get::<Option<i32>, _>("predicted_study_method")
                .ok()
                .flatten(),
            engagement_level: row.try_get::<Option<i32>, _>("engagement_level").ok().flatten(),
        }))
    }

    async fn store(
        &self,
        student_id: i64,
        study_method: i32,
        engagement: i32,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO student_recommendations
            (id_student, predicted_study_method, engagement_level)
            VALUES ($1, $2, $3)
            ON CONFLICT (id_student) DO UPDATE
            SET predicted_study_method = EXCLUDED.predicted_study_method,
                engagement_level = EXCLUDED.engagement_level
            "#,
        )
        .bind(student_id)
        .bind(study_method)
        .bind(engagement)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
