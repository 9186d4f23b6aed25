//! Plan file parser.
//!
//! Parses a plan file into [`ParsedPlan`] and checks that day and meal type
//! names, the week start date and the plan origin are valid. Whether the
//! resulting plan is acceptable (title, meals) is decided later by
//! [`super::PlanBuilder::validate`].

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use super::builder::{MealSelection, PlannedMeal};
use super::file_format::PlanFile;
use super::model::{GeneratedBy, MealRef, MealType, Nutrition, Weekday};

/// Errors that can occur while parsing a plan file.
#[derive(Debug, Error)]
pub enum PlanFileError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid day {value:?} on meal #{index} (expected monday through sunday)")]
    InvalidDay { index: usize, value: String },

    #[error("invalid meal_type {value:?} on meal #{index} (expected breakfast, lunch, dinner, or snack)")]
    InvalidMealType { index: usize, value: String },

    #[error("meal #{index} needs either an entry id or a meal_id")]
    MissingMealId { index: usize },

    #[error("invalid week_start {0:?} (expected YYYY-MM-DD)")]
    InvalidWeekStart(String),

    #[error("invalid generated_by {0:?} (expected manual or ai)")]
    InvalidGeneratedBy(String),
}

/// A plan file turned into domain values.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPlan {
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub week_start_date: Option<NaiveDate>,
    pub generated_by: GeneratedBy,
    pub selections: Vec<MealSelection>,
}

/// Parse and check a plan file.
pub fn parse_plan_file(content: &str) -> Result<ParsedPlan, PlanFileError> {
    let file: PlanFile = toml::from_str(content)?;
    convert(file)
}

fn convert(file: PlanFile) -> Result<ParsedPlan, PlanFileError> {
    let week_start_date = file
        .plan
        .week_start
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| PlanFileError::InvalidWeekStart(s.to_owned()))
        })
        .transpose()?;

    let generated_by = file
        .plan
        .generated_by
        .parse::<GeneratedBy>()
        .map_err(|_| PlanFileError::InvalidGeneratedBy(file.plan.generated_by.clone()))?;

    let mut selections = Vec::with_capacity(file.meals.len());
    for (index, meal) in file.meals.into_iter().enumerate() {
        let day = meal
            .day
            .parse::<Weekday>()
            .map_err(|_| PlanFileError::InvalidDay {
                index,
                value: meal.day.clone(),
            })?;
        let meal_type = meal
            .meal_type
            .parse::<MealType>()
            .map_err(|_| PlanFileError::InvalidMealType {
                index,
                value: meal.meal_type.clone(),
            })?;

        let planned = match meal.entry {
            Some(entry) => PlannedMeal::Keep(entry),
            None if meal.meal_id.trim().is_empty() => {
                return Err(PlanFileError::MissingMealId { index });
            }
            None => PlannedMeal::New(MealRef::new(
                meal.meal_id.trim(),
                meal.name,
                Nutrition::new(meal.calories, meal.protein, meal.carbs, meal.fats),
            )),
        };

        selections.push(MealSelection {
            day,
            meal_type,
            meal: planned,
        });
    }

    Ok(ParsedPlan {
        id: file.plan.id,
        title: file.plan.title,
        week_start_date,
        generated_by,
        selections,
    })
}
