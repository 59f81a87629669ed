use sqlx::{FromRow, PgPool};

/// To-do item row; every item belongs to exactly one user.
#[derive(Debug, Clone, FromRow)]
pub struct TodoItem {
    pub id: i64,
    pub title: String,
    pub is_done: bool,
    pub user_id: i64,
}

impl TodoItem {
    pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<TodoItem>> {
        let rows = sqlx::query_as::<_, TodoItem>(
            r#"
            SELECT id, title, is_done, user_id
            FROM todo_items
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// An item owned by someone else is indistinguishable from a missing one.
    pub async fn find_owned(db: &PgPool, user_id: i64, id: i64) -> anyhow::Result<Option<TodoItem>> {
        let item = sqlx::query_as::<_, TodoItem>(
            r#"
            SELECT id, title, is_done, user_id
            FROM todo_items
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(item)
    }

    pub async fn create(
        db: &PgPool,
        user_id: i64,
        title: &str,
        is_done: bool,
    ) -> anyhow::Result<TodoItem> {
        let item = sqlx::query_as::<_, TodoItem>(
            r#"
            INSERT INTO todo_items (title, is_done, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, is_done, user_id
            "#,
        )
        .bind(title)
        .bind(is_done)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(item)
    }

    /// Replaces title and done flag; returns false when no owned row matched.
    pub async fn update_owned(
        db: &PgPool,
        user_id: i64,
        id: i64,
        title: &str,
        is_done: bool,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE todo_items
            SET title = $3, is_done = $4
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(is_done)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_owned(db: &PgPool, user_id: i64, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM todo_items
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
