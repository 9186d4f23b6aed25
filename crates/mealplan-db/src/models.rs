use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Who produced a meal plan.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GeneratedBy {
    /// Assembled by the user slot by slot.
    #[default]
    Manual,
    /// Accepted from a recommendation service result.
    Ai,
}

impl fmt::Display for GeneratedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Manual => "manual",
            Self::Ai => "ai",
        };
        f.pad(s)
    }
}

impl FromStr for GeneratedBy {
    type Err = GeneratedByParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "ai" => Ok(Self::Ai),
            other => Err(GeneratedByParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`GeneratedBy`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid plan origin: {0:?} (expected manual or ai)")]
pub struct GeneratedByParseError(pub String);

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row of the `meal_plans` table.
///
/// `days` and `nutrition_summary` are opaque JSON here; their shape belongs
/// to the domain model in `mealplan-core`.
#[derive(Debug, Clone, FromRow)]
pub struct MealPlanRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub week_start_date: Option<NaiveDate>,
    pub days: Json<serde_json::Value>,
    pub nutrition_summary: Option<Json<serde_json::Value>>,
    pub generated_by: GeneratedBy,
    pub is_active: bool,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
