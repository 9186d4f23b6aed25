//! Assembly and validation of a plan's day × slot × entry structure.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{PlanError, Violation};

use super::model::{MealEntry, MealPlan, MealRef, MealType, Week, Weekday};

/// What goes into one slot when a plan is (re)built from selections.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedMeal {
    /// Keep an existing entry, with its adherence, by id.
    Keep(Uuid),
    /// Add a new `planned` entry for this catalog meal.
    New(MealRef),
}

/// One selection: a meal placed in a (day, slot).
#[derive(Debug, Clone, PartialEq)]
pub struct MealSelection {
    pub day: Weekday,
    pub meal_type: MealType,
    pub meal: PlannedMeal,
}

impl MealSelection {
    pub fn new_meal(day: Weekday, meal_type: MealType, meal: MealRef) -> Self {
        Self {
            day,
            meal_type,
            meal: PlannedMeal::New(meal),
        }
    }

    pub fn keep(day: Weekday, meal_type: MealType, entry: Uuid) -> Self {
        Self {
            day,
            meal_type,
            meal: PlannedMeal::Keep(entry),
        }
    }
}

/// Plan structure operations.
///
/// A slot may hold any number of entries, including the same meal twice.
/// Nothing here touches adherence.
pub struct PlanBuilder;

impl PlanBuilder {
    /// Append a new `planned` entry to a slot and return its id.
    pub fn add_meal(plan: &mut MealPlan, day: Weekday, meal_type: MealType, meal: MealRef) -> Uuid {
        let entry = MealEntry::new(meal_type, meal);
        let id = entry.id();
        plan.days.day_mut(day).meals_mut().push(entry);
        id
    }

    /// Remove the `index`-th entry of a slot (counting only entries of that
    /// meal type, in insertion order) and return it.
    pub fn remove_meal(
        plan: &mut MealPlan,
        day: Weekday,
        meal_type: MealType,
        index: usize,
    ) -> Result<MealEntry, PlanError> {
        let meals = plan.days.day_mut(day).meals_mut();
        let position = meals
            .iter()
            .enumerate()
            .filter(|(_, e)| e.meal_type() == meal_type)
            .map(|(pos, _)| pos)
            .nth(index);

        match position {
            Some(pos) => Ok(meals.remove(pos)),
            None => Err(PlanError::IndexOutOfRange {
                day,
                meal_type,
                index,
                len: meals.iter().filter(|e| e.meal_type() == meal_type).count(),
            }),
        }
    }

    /// Everything wrong with the plan, in a stable order. Empty means valid.
    pub fn validate(plan: &MealPlan) -> Vec<Violation> {
        let mut violations = Vec::new();

        if plan.title.trim().is_empty() {
            violations.push(Violation::BlankTitle);
        }
        if plan.week_start_date.is_none() {
            violations.push(Violation::MissingWeekStart);
        }
        if Self::total_meal_count(plan) == 0 {
            violations.push(Violation::NoMeals);
        }

        for day in plan.days.iter() {
            for entry in day.meals() {
                if let Some(field) = entry.meal.nutrition.invalid_field() {
                    violations.push(Violation::InvalidNutrition {
                        day: day.day(),
                        meal_type: entry.meal_type(),
                        meal_id: entry.meal.id.clone(),
                        field,
                    });
                }
            }
        }

        violations
    }

    /// [`Self::validate`] as a `Result`.
    pub fn ensure_valid(plan: &MealPlan) -> Result<(), PlanError> {
        let violations = Self::validate(plan);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(PlanError::Validation(violations))
        }
    }

    pub fn total_meal_count(plan: &MealPlan) -> usize {
        plan.days.iter().map(|d| d.meals().len()).sum()
    }

    pub fn days_with_meals_count(plan: &MealPlan) -> usize {
        plan.days.iter().filter(|d| !d.is_empty()).count()
    }

    pub fn slot_count(plan: &MealPlan, day: Weekday, meal_type: MealType) -> usize {
        plan.days.day(day).slot(meal_type).count()
    }

    /// Replace the plan's structure with `selections`, in order.
    ///
    /// `Keep` selections carry the existing entry over untouched (adherence,
    /// snapshot and timestamp), re-slotting it if the selection names a
    /// different day or meal type. Entries not kept are dropped. On error the
    /// plan is left unchanged.
    pub fn apply_selections(
        plan: &mut MealPlan,
        selections: &[MealSelection],
    ) -> Result<(), PlanError> {
        let mut week = Week::new();
        let mut kept = HashSet::new();
        let mut violations = Vec::new();

        for selection in selections {
            let entry = match &selection.meal {
                PlannedMeal::New(meal) => MealEntry::new(selection.meal_type, meal.clone()),
                PlannedMeal::Keep(id) => {
                    if !kept.insert(*id) {
                        violations.push(Violation::DuplicateEntry(*id));
                        continue;
                    }
                    match plan.entry(*id) {
                        Some(existing) => {
                            let mut entry = existing.clone();
                            entry.set_meal_type(selection.meal_type);
                            entry
                        }
                        None => {
                            violations.push(Violation::UnknownEntry(*id));
                            continue;
                        }
                    }
                }
            };
            week.day_mut(selection.day).meals_mut().push(entry);
        }

        if !violations.is_empty() {
            return Err(PlanError::Validation(violations));
        }

        plan.days = week;
        Ok(())
    }
}
