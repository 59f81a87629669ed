use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::Date;

/// Stand-alone address-book record; unrelated to authenticated users.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Date,
}

impl UserProfile {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, first_name, last_name, email, birth_date
            FROM user_profiles
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, first_name, last_name, email, birth_date
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn create(
        db: &PgPool,
        first_name: &str,
        last_name: &str,
        email: &str,
        birth_date: Date,
    ) -> anyhow::Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (first_name, last_name, email, birth_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, email, birth_date
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(birth_date)
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    /// Replaces all profile fields; returns false when no row matched.
    pub async fn update(
        db: &PgPool,
        id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
        birth_date: Date,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_profiles
            SET first_name = $2, last_name = $3, email = $4, birth_date = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(birth_date)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
