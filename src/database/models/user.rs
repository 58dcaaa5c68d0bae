use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One bot user: which group (and optional subgroup) they study in and
/// whether they subscribed to the daily mailing.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub group_id: i64,
    /// `0` means no subgroup filter. `1`/`2` are legacy positional
    /// selectors kept for rows written by early versions.
    pub sub_group: i64,
    /// `HH:MM` local time of the daily mailing, NULL when unsubscribed.
    pub mailing_time: Option<String>,
}

impl User {
    pub async fn find(pool: &sqlx::SqlitePool, user_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, group_id, sub_group, mailing_time FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Inserts the user or replaces their group configuration.
    pub async fn upsert(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        group_id: i64,
        sub_group: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (user_id, group_id, sub_group) VALUES (?, ?, ?)
             ON CONFLICT (user_id)
             DO UPDATE SET group_id = excluded.group_id, sub_group = excluded.sub_group",
        )
        .bind(user_id)
        .bind(group_id)
        .bind(sub_group)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &sqlx::SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_mailing_time(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        mailing_time: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET mailing_time = ? WHERE user_id = ?")
            .bind(mailing_time)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Users subscribed to the daily mailing.
    pub async fn mailing_list(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, group_id, sub_group, mailing_time FROM users
             WHERE mailing_time IS NOT NULL ORDER BY user_id",
        )
        .fetch_all(pool)
        .await
    }
}
