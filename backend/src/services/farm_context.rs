//! Farm context storage
//!
//! One context per farmer, stored as JSONB. The context is the policy's view
//! of the farm: location, crop, day of cycle and current climate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::FarmContext;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct FarmContextService {
    db: PgPool,
}

/// Stored farm context with its bookkeeping columns
#[derive(Debug, Clone, Serialize)]
pub struct FarmContextRecord {
    pub farmer_id: Uuid,
    #[serde(flatten)]
    pub context: FarmContext,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct FarmContextRow {
    farmer_id: Uuid,
    context: Json<FarmContext>,
    updated_at: DateTime<Utc>,
}

impl From<FarmContextRow> for FarmContextRecord {
    fn from(row: FarmContextRow) -> Self {
        Self {
            farmer_id: row.farmer_id,
            context: row.context.0,
            updated_at: row.updated_at,
        }
    }
}

/// Input for advancing the crop cycle
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDayInput {
    #[validate(range(min = 1, message = "Day of cycle starts at 1"))]
    pub day_of_cycle: u32,
}

impl FarmContextService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch(&self, farmer_id: Uuid) -> AppResult<Option<FarmContextRecord>> {
        let row = sqlx::query_as::<_, FarmContextRow>(
            r#"
            SELECT farmer_id, context, updated_at
            FROM farm_contexts
            WHERE farmer_id = $1
            "#,
        )
        .bind(farmer_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(FarmContextRecord::from))
    }

    pub async fn get(&self, farmer_id: Uuid) -> AppResult<Option<FarmContext>> {
        Ok(self.fetch(farmer_id).await?.map(|r| r.context))
    }

    pub async fn get_record(&self, farmer_id: Uuid) -> AppResult<FarmContextRecord> {
        self.fetch(farmer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Farm context".to_string()))
    }

    /// Create or replace the farmer's context
    pub async fn upsert(
        &self,
        farmer_id: Uuid,
        context: FarmContext,
    ) -> AppResult<FarmContextRecord> {
        shared::validate_farm_context(&context)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        let row = sqlx::query_as::<_, FarmContextRow>(
            r#"
            INSERT INTO farm_contexts (farmer_id, context)
            VALUES ($1, $2)
            ON CONFLICT (farmer_id)
            DO UPDATE SET context = EXCLUDED.context, updated_at = NOW()
            RETURNING farmer_id, context, updated_at
            "#,
        )
        .bind(farmer_id)
        .bind(Json(&context))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            %farmer_id,
            crop = %context.crop.name,
            season = %context.crop.season,
            "Farm context saved"
        );

        Ok(row.into())
    }

    /// Set `day_of_cycle` without touching the rest of the context
    pub async fn update_day(&self, farmer_id: Uuid, input: UpdateDayInput) -> AppResult<FarmContextRecord> {
        input.validate()?;
        let day = i32::try_from(input.day_of_cycle).map_err(|_| AppError::Validation {
            field: "day_of_cycle".to_string(),
            message: "Day of cycle is too large".to_string(),
        })?;

        let row = sqlx::query_as::<_, FarmContextRow>(
            r#"
            UPDATE farm_contexts
            SET context = jsonb_set(context, '{day_of_cycle}', to_jsonb($2::int)),
                updated_at = NOW()
            WHERE farmer_id = $1
            RETURNING farmer_id, context, updated_at
            "#,
        )
        .bind(farmer_id)
        .bind(day)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm context".to_string()))?;

        tracing::debug!(%farmer_id, day, "Advanced crop cycle day");
        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FarmContextRow {
        let context: FarmContext = serde_json::from_value(serde_json::json!({
            "location": {"state": "Punjab", "city": "Ludhiana"},
            "crop": {"name": "Wheat", "season": "rabi"},
            "day_of_cycle": 12
        }))
        .unwrap();

        FarmContextRow {
            farmer_id: Uuid::new_v4(),
            context: Json(context),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_carries_stored_context() {
        let row = row();
        let farmer_id = row.farmer_id;
        let record = FarmContextRecord::from(row);

        assert_eq!(record.farmer_id, farmer_id);
        assert_eq!(record.context.day_of_cycle, Some(12));
        assert_eq!(record.context.crop.name, "Wheat");
    }

    #[test]
    fn test_record_serializes_context_inline() {
        let json = serde_json::to_value(FarmContextRecord::from(row())).unwrap();
        assert_eq!(json["day_of_cycle"], 12);
        assert_eq!(json["crop"]["season"], "Rabi");
        assert!(json.get("context").is_none());
    }

    #[test]
    fn test_day_input_starts_at_one() {
        assert!(UpdateDayInput { day_of_cycle: 0 }.validate().is_err());
        assert!(UpdateDayInput { day_of_cycle: 1 }.validate().is_ok());
    }
}
