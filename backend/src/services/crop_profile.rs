//! Crop profile storage
//!
//! Profiles are researched per crop and state and keyed by
//! `crop_profile_key`, e.g. `rice_maharashtra`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::CropProfile;
use sqlx::{types::Json, PgPool};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CropProfileService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CropProfileRecord {
    pub key: String,
    pub profile: CropProfile,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CropProfileRow {
    key: String,
    profile: Json<CropProfile>,
    updated_at: DateTime<Utc>,
}

impl From<CropProfileRow> for CropProfileRecord {
    fn from(row: CropProfileRow) -> Self {
        Self {
            key: row.key,
            profile: row.profile.0,
            updated_at: row.updated_at,
        }
    }
}

impl CropProfileService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn find(&self, key: &str) -> AppResult<Option<CropProfile>> {
        let row = sqlx::query_as::<_, CropProfileRow>(
            "SELECT key, profile, updated_at FROM crop_profiles WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| r.profile.0))
    }

    pub async fn get(&self, key: &str) -> AppResult<CropProfileRecord> {
        sqlx::query_as::<_, CropProfileRow>(
            "SELECT key, profile, updated_at FROM crop_profiles WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?
        .map(CropProfileRecord::from)
        .ok_or_else(|| AppError::NotFound(format!("Crop profile '{}'", key)))
    }

    /// Store a profile under its derived key, replacing any previous version
    pub async fn upsert(&self, profile: CropProfile) -> AppResult<CropProfileRecord> {
        shared::validate_crop_profile(&profile)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        let key = profile.key();
        let row = sqlx::query_as::<_, CropProfileRow>(
            r#"
            INSERT INTO crop_profiles (key, profile)
            VALUES ($1, $2)
            ON CONFLICT (key)
            DO UPDATE SET profile = EXCLUDED.profile, updated_at = NOW()
            RETURNING key, profile, updated_at
            "#,
        )
        .bind(&key)
        .bind(Json(&profile))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(%key, seasons = profile.seasons.len(), "Crop profile saved");
        Ok(row.into())
    }
}
