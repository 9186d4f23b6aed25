//! Plan structure: the model, building and validation, default titles and
//! the plan file format.

pub mod builder;
pub mod file_format;
pub mod model;
pub mod parser;
pub mod title;

pub use builder::{MealSelection, PlanBuilder, PlannedMeal};
pub use file_format::{MealToml, PlanFile, PlanFileMeta};
pub use model::{
    Adherence, AdherenceStatus, DayPlan, EntryRef, GeneratedBy, MealEntry, MealPlan, MealRef,
    MealType, Nutrition, Week, WeekShapeError, Weekday,
};
pub use parser::{ParsedPlan, PlanFileError, parse_plan_file};
pub use title::{FALLBACK_TITLE, default_title, next_week_start};
