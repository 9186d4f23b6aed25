//! [`PlanStore`] backed by the `meal_plans` table.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use mealplan_db::models::MealPlanRow;
use mealplan_db::queries::meal_plans as db;

use super::{PlanStore, StoreError};
use crate::plan::model::{MealPlan, Nutrition, Week};

/// Stores each plan as one row with its days as a JSONB document.
#[derive(Debug, Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_row(plan: &MealPlan) -> anyhow::Result<MealPlanRow> {
    let days = serde_json::to_value(&plan.days)
        .with_context(|| format!("failed to encode days of meal plan {}", plan.id))?;
    let nutrition_summary = plan
        .nutrition_summary
        .map(serde_json::to_value)
        .transpose()
        .with_context(|| format!("failed to encode nutrition summary of meal plan {}", plan.id))?;

    Ok(MealPlanRow {
        id: plan.id,
        owner_id: plan.owner_id,
        title: plan.title.clone(),
        week_start_date: plan.week_start_date,
        days: Json(days),
        nutrition_summary: nutrition_summary.map(Json),
        generated_by: plan.generated_by,
        is_active: plan.is_active,
        revision: plan.revision,
        created_at: plan.created_at,
        updated_at: plan.updated_at,
    })
}

/// The primary key is the only unique constraint on `meal_plans`.
fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(sqlx::Error::as_database_error)
        .is_some_and(|db_err| db_err.is_unique_violation())
}

fn from_row(row: MealPlanRow) -> anyhow::Result<MealPlan> {
    let days: Week = serde_json::from_value(row.days.0)
        .with_context(|| format!("meal plan {} has a malformed days document", row.id))?;
    let nutrition_summary = row
        .nutrition_summary
        .map(|Json(value)| serde_json::from_value::<Nutrition>(value))
        .transpose()
        .with_context(|| format!("meal plan {} has a malformed nutrition summary", row.id))?;

    Ok(MealPlan {
        id: row.id,
        owner_id: row.owner_id,
        title: row.title,
        week_start_date: row.week_start_date,
        days,
        nutrition_summary,
        generated_by: row.generated_by,
        is_active: row.is_active,
        revision: row.revision,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn insert(&self, plan: &MealPlan) -> Result<(), StoreError> {
        let row = to_row(plan)?;
        match db::insert_meal_plan(&self.pool, &row).await {
            Ok(()) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::AlreadyExists(plan.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self, id: Uuid) -> Result<Option<MealPlan>, StoreError> {
        let row = db::get_meal_plan(&self.pool, id).await?;
        Ok(row.map(from_row).transpose()?)
    }

    async fn update(&self, plan: &MealPlan, expected_revision: i64) -> Result<(), StoreError> {
        let row = to_row(plan)?;
        if db::update_meal_plan(&self.pool, &row, expected_revision).await? > 0 {
            return Ok(());
        }

        match db::get_revision(&self.pool, plan.id).await? {
            None => Err(StoreError::NotFound(plan.id)),
            Some(found) => {
                tracing::warn!(
                    plan_id = %plan.id,
                    expected_revision,
                    found,
                    "meal plan update lost a revision race"
                );
                Err(StoreError::Conflict {
                    plan: plan.id,
                    expected: expected_revision,
                    found,
                })
            }
        }
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<MealPlan>, StoreError> {
        let rows = db::list_meal_plans_for_owner(&self.pool, owner_id).await?;
        let plans = rows
            .into_iter()
            .map(from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(plans)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(db::soft_delete_meal_plan(&self.pool, id).await?)
    }
}
