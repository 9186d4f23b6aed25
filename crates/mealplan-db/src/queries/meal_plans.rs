//! Database query functions for the `meal_plans` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::MealPlanRow;

/// Insert a new meal plan row exactly as given.
pub async fn insert_meal_plan(pool: &PgPool, row: &MealPlanRow) -> Result<()> {
    sqlx::query(
        "INSERT INTO meal_plans \
             (id, owner_id, title, week_start_date, days, nutrition_summary, \
              generated_by, is_active, revision, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(row.id)
    .bind(row.owner_id)
    .bind(&row.title)
    .bind(row.week_start_date)
    .bind(&row.days)
    .bind(&row.nutrition_summary)
    .bind(row.generated_by)
    .bind(row.is_active)
    .bind(row.revision)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(pool)
    .await
    .with_context(|| format!("failed to insert meal plan {}", row.id))?;

    Ok(())
}

/// Fetch a meal plan by its ID, active or not.
pub async fn get_meal_plan(pool: &PgPool, id: Uuid) -> Result<Option<MealPlanRow>> {
    let row = sqlx::query_as::<_, MealPlanRow>("SELECT * FROM meal_plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch meal plan")?;

    Ok(row)
}

/// List an owner's active meal plans, newest first.
pub async fn list_meal_plans_for_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<MealPlanRow>> {
    let rows = sqlx::query_as::<_, MealPlanRow>(
        "SELECT * FROM meal_plans \
         WHERE owner_id = $1 AND is_active \
         ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .context("failed to list meal plans")?;

    Ok(rows)
}

/// Overwrite a meal plan document, guarded by its previous revision.
///
/// Returns the number of rows affected: `0` means the plan does not exist
/// or somebody else wrote a newer revision first.
pub async fn update_meal_plan(
    pool: &PgPool,
    row: &MealPlanRow,
    expected_revision: i64,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE meal_plans \
         SET title = $1, \
             week_start_date = $2, \
             days = $3, \
             nutrition_summary = $4, \
             generated_by = $5, \
             is_active = $6, \
             revision = $7, \
             updated_at = $8 \
         WHERE id = $9 AND revision = $10",
    )
    .bind(&row.title)
    .bind(row.week_start_date)
    .bind(&row.days)
    .bind(&row.nutrition_summary)
    .bind(row.generated_by)
    .bind(row.is_active)
    .bind(row.revision)
    .bind(row.updated_at)
    .bind(row.id)
    .bind(expected_revision)
    .execute(pool)
    .await
    .with_context(|| format!("failed to update meal plan {}", row.id))?;

    Ok(result.rows_affected())
}

/// Fetch only the current revision of a plan. Used to explain a failed
/// guarded update.
pub async fn get_revision(pool: &PgPool, id: Uuid) -> Result<Option<i64>> {
    let revision: Option<i64> =
        sqlx::query_scalar("SELECT revision FROM meal_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch meal plan revision")?;

    Ok(revision)
}

/// Mark a plan inactive. Returns `false` if no active plan had that ID.
pub async fn soft_delete_meal_plan(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE meal_plans \
         SET is_active = FALSE, revision = revision + 1, updated_at = now() \
         WHERE id = $1 AND is_active",
    )
    .bind(id)
    .execute(pool)
    .await
    .context("failed to delete meal plan")?;

    Ok(result.rows_affected() > 0)
}
