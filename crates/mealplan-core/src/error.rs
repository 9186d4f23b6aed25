//! Error types returned by the meal-plan core.

use thiserror::Error;
use uuid::Uuid;

use crate::plan::model::{AdherenceStatus, EntryRef, MealType, Weekday};
use crate::store::StoreError;

/// A single reason a plan (or an edit to it) is not acceptable.
///
/// Violations are always correctable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("plan title is required")]
    BlankTitle,

    #[error("week start date is required")]
    MissingWeekStart,

    #[error("a plan must contain at least one meal")]
    NoMeals,

    #[error("meal {meal_id:?} on {day} {meal_type} has an invalid {field} value")]
    InvalidNutrition {
        day: Weekday,
        meal_type: MealType,
        meal_id: String,
        field: &'static str,
    },

    #[error("replacement text must not be blank")]
    BlankReplacement,

    #[error("entry {0} is not part of this plan")]
    UnknownEntry(Uuid),

    #[error("entry {0} is selected more than once")]
    DuplicateEntry(Uuid),
}

/// Errors surfaced by plan building, adherence updates and [`crate::service::PlanService`].
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<Violation>),

    #[error("cannot mark entry {entry} as {to}: it is already {from}")]
    InvalidTransition {
        entry: Uuid,
        from: AdherenceStatus,
        to: AdherenceStatus,
    },

    #[error("no {meal_type} entry at index {index} on {day} (slot holds {len})")]
    IndexOutOfRange {
        day: Weekday,
        meal_type: MealType,
        index: usize,
        len: usize,
    },

    #[error("meal plan {0} not found")]
    PlanNotFound(Uuid),

    #[error("entry {entry} not found in meal plan {plan}")]
    EntryNotFound { plan: Uuid, entry: EntryRef },

    #[error("{count} {meal_type} entries on {day}; address the entry by id")]
    AmbiguousSlot {
        day: Weekday,
        meal_type: MealType,
        count: usize,
    },

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl PlanError {
    /// The violations carried by a validation error; empty for other kinds.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Validation(v) => v,
            _ => &[],
        }
    }

    /// Whether the caller can fix the request and retry.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<Violation> for PlanError {
    fn from(violation: Violation) -> Self {
        Self::Validation(vec![violation])
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_violation() {
        let err = PlanError::Validation(vec![Violation::BlankTitle, Violation::NoMeals]);
        assert_eq!(
            err.to_string(),
            "validation failed: plan title is required; a plan must contain at least one meal"
        );
        assert_eq!(err.violations().len(), 2);
        assert!(err.is_validation());
    }

    #[test]
    fn single_violation_converts() {
        let err: PlanError = Violation::BlankReplacement.into();
        assert_eq!(err.violations(), &[Violation::BlankReplacement]);
    }

    #[test]
    fn store_errors_pass_through_verbatim() {
        let id = Uuid::new_v4();
        let err: PlanError = StoreError::Conflict {
            plan: id,
            expected: 3,
            found: 4,
        }
        .into();
        assert!(!err.is_validation());
        assert!(err.to_string().contains("expected revision 3"));
    }
}
