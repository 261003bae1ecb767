use teloxide::types::UserId;
use crate::repository;

repository!(Users,
    /// Registers the user once; repeated calls for the same id are no-ops.
    pub async fn record(&self, uid: UserId) -> anyhow::Result<()> {
        let uid: i64 = uid.0.try_into()?;
        sqlx::query("INSERT INTO Users(uid) VALUES ($1) ON CONFLICT (uid) DO NOTHING")
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
,
    pub async fn list_all(&self) -> anyhow::Result<Vec<UserId>> {
        sqlx::query_scalar::<_, i64>("SELECT uid FROM Users ORDER BY created_at, uid")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|uid| uid.try_into()
                .map(UserId)
                .map_err(|e| anyhow::anyhow!("invalid uid {uid} in the database: {e}")))
            .collect()
    }
,
    pub async fn count(&self) -> anyhow::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM Users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.into())
    }
);
