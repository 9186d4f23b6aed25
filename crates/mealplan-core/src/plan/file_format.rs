//! TOML format for plan files.
//!
//! A plan file describes a week of meals:
//!
//! ```toml
//! [plan]
//! title = "Cutting week"          # optional, generated from week_start
//! week_start = "2024-01-15"
//!
//! [[meals]]
//! day = "monday"
//! meal_type = "breakfast"
//! meal_id = "oatmeal-01"
//! name = "Oatmeal"
//! calories = 300
//! protein = 10
//! carbs = 40
//! fats = 8
//! ```
//!
//! Exported files also carry `[plan].id` and a per-meal `entry` id. A meal
//! with `entry` set keeps that existing entry (and its adherence) when the
//! file is applied with `plan update`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{AdherenceStatus, MealPlan};

/// Top-level structure of a plan file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanFile {
    pub plan: PlanFileMeta,
    #[serde(default)]
    pub meals: Vec<MealToml>,
}

/// `[plan]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanFileMeta {
    /// Set once the plan exists in the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// ISO date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<String>,
    /// `manual` or `ai`.
    #[serde(default = "default_generated_by")]
    pub generated_by: String,
}

/// A single `[[meals]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealToml {
    pub day: String,
    pub meal_type: String,
    /// Existing entry to keep; other meal fields are then ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Uuid>,
    #[serde(default)]
    pub meal_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
    /// Informational on export; ignored when read back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fn default_generated_by() -> String {
    "manual".to_string()
}

impl PlanFile {
    /// Export a stored plan, entry ids included.
    pub fn from_plan(plan: &MealPlan) -> Self {
        let meals = plan
            .days()
            .iter()
            .flat_map(|day| {
                day.meals().iter().map(move |entry| MealToml {
                    day: day.day().to_string(),
                    meal_type: entry.meal_type().to_string(),
                    entry: Some(entry.id()),
                    meal_id: entry.meal.id.clone(),
                    name: entry.meal.name.clone(),
                    calories: entry.meal.nutrition.calories,
                    protein: entry.meal.nutrition.protein,
                    carbs: entry.meal.nutrition.carbs,
                    fats: entry.meal.nutrition.fats,
                    status: match entry.status() {
                        AdherenceStatus::Planned => None,
                        other => Some(other.to_string()),
                    },
                })
            })
            .collect();

        Self {
            plan: PlanFileMeta {
                id: Some(plan.id),
                title: Some(plan.title.clone()),
                week_start: plan.week_start_date.map(|d| d.to_string()),
                generated_by: plan.generated_by.to_string(),
            },
            meals,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::plan::builder::PlanBuilder;
    use crate::plan::model::{GeneratedBy, MealRef, MealType, Nutrition, Weekday};

    #[test]
    fn deserialize_minimal_file() {
        let toml_str = r#"
[plan]
week_start = "2024-01-15"

[[meals]]
day = "monday"
meal_type = "lunch"
meal_id = "salad"
"#;
        let file: PlanFile = toml::from_str(toml_str).expect("should parse");
        assert_eq!(file.plan.id, None);
        assert_eq!(file.plan.title, None);
        assert_eq!(file.plan.generated_by, "manual");
        assert_eq!(file.meals.len(), 1);
        assert_eq!(file.meals[0].calories, 0.0);
        assert_eq!(file.meals[0].entry, None);
    }

    #[test]
    fn deserialize_file_without_meals() {
        let file: PlanFile = toml::from_str("[plan]\ntitle = \"Empty\"\n").expect("should parse");
        assert!(file.meals.is_empty());
    }

    #[test]
    fn export_carries_ids_and_status() {
        let mut plan = MealPlan::new(
            Uuid::new_v4(),
            "Export me",
            NaiveDate::from_ymd_opt(2024, 1, 15),
            GeneratedBy::Ai,
            Utc::now(),
        );
        let entry = PlanBuilder::add_meal(
            &mut plan,
            Weekday::Wednesday,
            MealType::Dinner,
            MealRef::new("stew", "Beef stew", Nutrition::new(650.0, 40.0, 30.0, 25.0)),
        );

        let file = PlanFile::from_plan(&plan);
        assert_eq!(file.plan.id, Some(plan.id));
        assert_eq!(file.plan.week_start.as_deref(), Some("2024-01-15"));
        assert_eq!(file.plan.generated_by, "ai");
        assert_eq!(file.meals.len(), 1);
        assert_eq!(file.meals[0].entry, Some(entry));
        assert_eq!(file.meals[0].day, "wednesday");
        assert_eq!(file.meals[0].status, None);

        let text = toml::to_string_pretty(&file).expect("should serialize");
        let back: PlanFile = toml::from_str(&text).expect("should parse");
        assert_eq!(back, file);
    }
}
