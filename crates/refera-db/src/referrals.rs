use async_trait::async_trait;
use chrono::{DateTime, Utc};
use refera_core::models::{NewReferral, Referral, ReferralStatus};
use refera_core::AppError;
use refera_intake::ReferralStore;
use sqlx::PgPool;
use uuid::Uuid;

/// Row shape for the `referrals` table. Status is stored as text and parsed
/// on the way out so an unknown value surfaces as an error instead of a
/// silent default.
#[derive(Debug, sqlx::FromRow)]
struct ReferralRow {
    id: Uuid,
    file_path: String,
    file_name: String,
    file_size: i64,
    mime_type: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReferralRow {
    fn into_referral(self) -> Result<Referral, AppError> {
        let status = self
            .status
            .parse::<ReferralStatus>()
            .map_err(AppError::Internal)?;

        Ok(Referral {
            id: self.id,
            file_path: self.file_path,
            file_name: self.file_name,
            file_size: self.file_size,
            mime_type: self.mime_type,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct ReferralRepository {
    pool: PgPool,
}

impl ReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new referral with status `pending`.
    pub async fn create_referral(&self, referral: NewReferral) -> Result<Referral, AppError> {
        let row = sqlx::query_as::<_, ReferralRow>(
            r#"
            INSERT INTO referrals (file_path, file_name, file_size, mime_type, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, file_path, file_name, file_size, mime_type, status, created_at, updated_at
            "#,
        )
        .bind(&referral.file_path)
        .bind(&referral.file_name)
        .bind(referral.file_size)
        .bind(&referral.mime_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create referral: {}", e);
            AppError::Internal("Failed to create referral".to_string())
        })?;

        let referral = row.into_referral()?;
        tracing::info!("Created referral {} ({})", referral.id, referral.file_name);
        Ok(referral)
    }

    /// Get a referral by ID
    pub async fn get_referral_by_id(&self, id: Uuid) -> Result<Option<Referral>, AppError> {
        let row = sqlx::query_as::<_, ReferralRow>(
            r#"
            SELECT id, file_path, file_name, file_size, mime_type, status, created_at, updated_at
            FROM referrals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch referral by ID: {}", e);
            AppError::Internal("Failed to fetch referral".to_string())
        })?;

        row.map(ReferralRow::into_referral).transpose()
    }

    /// Set a referral's status to `failed`, keeping the record.
    pub async fn mark_referral_failed(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE referrals
            SET status = 'failed', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark referral as failed: {}", e);
            AppError::Internal("Failed to update referral status".to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Referral not found".to_string()));
        }

        tracing::info!("Marked referral {} as failed", id);
        Ok(())
    }
}

#[async_trait]
impl ReferralStore for ReferralRepository {
    async fn create(&self, referral: NewReferral) -> Result<Referral, AppError> {
        self.create_referral(referral).await
    }

    async fn mark_failed(&self, id: Uuid) -> Result<(), AppError> {
        self.mark_referral_failed(id).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Referral>, AppError> {
        self.get_referral_by_id(id).await
    }
}
