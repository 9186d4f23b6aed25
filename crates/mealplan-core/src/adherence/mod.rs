//! Adherence state machine for meal entries.
//!
//! ```text
//! planned -> eaten
//! planned -> skipped
//! planned -> replaced
//! ```
//!
//! All three targets are terminal. A failed transition leaves the entry
//! untouched.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{PlanError, Violation};
use crate::plan::model::{AdherenceStatus, EntryRef, MealEntry, MealPlan};

/// A user-reported outcome for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdherenceAction {
    Eaten,
    Skipped,
    Replaced { with: String },
}

impl AdherenceAction {
    /// The status this action moves an entry to.
    pub fn target(&self) -> AdherenceStatus {
        match self {
            Self::Eaten => AdherenceStatus::Eaten,
            Self::Skipped => AdherenceStatus::Skipped,
            Self::Replaced { .. } => AdherenceStatus::Replaced,
        }
    }
}

pub struct AdherenceStateMachine;

impl AdherenceStateMachine {
    /// Whether `from -> to` is an edge of the adherence graph.
    pub fn is_valid_transition(from: AdherenceStatus, to: AdherenceStatus) -> bool {
        matches!(
            (from, to),
            (AdherenceStatus::Planned, AdherenceStatus::Eaten)
                | (AdherenceStatus::Planned, AdherenceStatus::Skipped)
                | (AdherenceStatus::Planned, AdherenceStatus::Replaced)
        )
    }

    pub fn mark_eaten(entry: &mut MealEntry, now: DateTime<Utc>) -> Result<(), PlanError> {
        Self::settle(entry, AdherenceStatus::Eaten, None, now)
    }

    pub fn mark_skipped(entry: &mut MealEntry, now: DateTime<Utc>) -> Result<(), PlanError> {
        Self::settle(entry, AdherenceStatus::Skipped, None, now)
    }

    /// Mark the entry replaced by `replacement`, stored trimmed.
    ///
    /// The transition is checked before the text, so a settled entry reports
    /// `InvalidTransition` even when the text is also blank.
    pub fn replace(
        entry: &mut MealEntry,
        replacement: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PlanError> {
        Self::check(entry, AdherenceStatus::Replaced)?;
        let text = replacement.trim();
        if text.is_empty() {
            return Err(Violation::BlankReplacement.into());
        }
        Self::settle(entry, AdherenceStatus::Replaced, Some(text.to_owned()), now)
    }

    /// Dispatch `action` to the matching operation.
    pub fn apply(
        entry: &mut MealEntry,
        action: &AdherenceAction,
        now: DateTime<Utc>,
    ) -> Result<(), PlanError> {
        match action {
            AdherenceAction::Eaten => Self::mark_eaten(entry, now),
            AdherenceAction::Skipped => Self::mark_skipped(entry, now),
            AdherenceAction::Replaced { with } => Self::replace(entry, with, now),
        }
    }

    fn check(entry: &MealEntry, to: AdherenceStatus) -> Result<(), PlanError> {
        let from = entry.status();
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(PlanError::InvalidTransition {
                entry: entry.id(),
                from,
                to,
            })
        }
    }

    fn settle(
        entry: &mut MealEntry,
        to: AdherenceStatus,
        replaced_with: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), PlanError> {
        Self::check(entry, to)?;
        entry.adherence_mut().settle(to, replaced_with, now);
        Ok(())
    }
}

/// Find the entry `target` names in `plan`.
///
/// A slot reference only resolves when the slot holds exactly one entry.
pub fn resolve_entry(plan: &MealPlan, target: &EntryRef) -> Result<Uuid, PlanError> {
    let not_found = || PlanError::EntryNotFound {
        plan: plan.id,
        entry: *target,
    };

    match *target {
        EntryRef::Id(id) => plan.entry(id).map(MealEntry::id).ok_or_else(not_found),
        EntryRef::Slot { day, meal_type } => {
            let mut slot = plan.days().day(day).slot(meal_type);
            match (slot.next(), slot.next()) {
                (None, _) => Err(not_found()),
                (Some(entry), None) => Ok(entry.id()),
                (Some(_), Some(_)) => Err(PlanError::AmbiguousSlot {
                    day,
                    meal_type,
                    count: plan.days().day(day).slot(meal_type).count(),
                }),
            }
        }
    }
}

/// Apply `action` to the entry `target` names, in place.
pub fn apply_to_plan(
    plan: &mut MealPlan,
    target: &EntryRef,
    action: &AdherenceAction,
    now: DateTime<Utc>,
) -> Result<Uuid, PlanError> {
    let id = resolve_entry(plan, target)?;
    let plan_id = plan.id;
    let entry = plan
        .days
        .entry_mut(id)
        .ok_or(PlanError::EntryNotFound {
            plan: plan_id,
            entry: *target,
        })?;
    AdherenceStateMachine::apply(entry, action, now)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::plan::model::{MealRef, MealType, Nutrition};

    fn entry() -> MealEntry {
        MealEntry::new(
            MealType::Breakfast,
            MealRef::new("oats", "Oatmeal", Nutrition::new(300.0, 10.0, 40.0, 8.0)),
        )
    }

    #[test]
    fn valid_transitions() {
        use AdherenceStatus::*;
        assert!(AdherenceStateMachine::is_valid_transition(Planned, Eaten));
        assert!(AdherenceStateMachine::is_valid_transition(Planned, Skipped));
        assert!(AdherenceStateMachine::is_valid_transition(Planned, Replaced));
    }

    #[test]
    fn invalid_transitions() {
        use AdherenceStatus::*;
        let all = [Planned, Eaten, Skipped, Replaced];
        for from in [Eaten, Skipped, Replaced] {
            for to in all {
                assert!(
                    !AdherenceStateMachine::is_valid_transition(from, to),
                    "{from} -> {to} should be rejected"
                );
            }
        }
        assert!(!AdherenceStateMachine::is_valid_transition(Planned, Planned));
    }

    #[test]
    fn mark_eaten_stamps_time() {
        let mut e = entry();
        let now = Utc::now();
        AdherenceStateMachine::mark_eaten(&mut e, now).unwrap();
        assert_eq!(e.status(), AdherenceStatus::Eaten);
        assert_eq!(e.adherence().updated_at(), Some(now));
        assert_eq!(e.adherence().replaced_with(), None);
    }

    #[test]
    fn second_transition_fails_and_leaves_entry_alone() {
        let mut e = entry();
        AdherenceStateMachine::mark_skipped(&mut e, Utc::now()).unwrap();
        let before = e.clone();

        let err = AdherenceStateMachine::mark_eaten(&mut e, Utc::now()).unwrap_err();
        assert!(
            matches!(
                err,
                PlanError::InvalidTransition {
                    from: AdherenceStatus::Skipped,
                    to: AdherenceStatus::Eaten,
                    ..
                }
            ),
            "got: {err}"
        );
        assert_eq!(e, before);
    }

    #[test]
    fn replace_trims_text() {
        let mut e = entry();
        AdherenceStateMachine::replace(&mut e, " Oatmeal ", Utc::now()).unwrap();
        assert_eq!(e.status(), AdherenceStatus::Replaced);
        assert_eq!(e.adherence().replaced_with(), Some("Oatmeal"));
    }

    #[test]
    fn replace_rejects_blank_text() {
        for text in ["", "   ", "\t\n"] {
            let mut e = entry();
            let err = AdherenceStateMachine::replace(&mut e, text, Utc::now()).unwrap_err();
            assert_eq!(err.violations(), &[Violation::BlankReplacement]);
            assert_eq!(e.status(), AdherenceStatus::Planned);
            assert_eq!(e.adherence().updated_at(), None);
        }
    }

    #[test]
    fn replace_on_settled_entry_is_a_transition_error() {
        let mut e = entry();
        AdherenceStateMachine::mark_eaten(&mut e, Utc::now()).unwrap();
        let err = AdherenceStateMachine::replace(&mut e, "", Utc::now()).unwrap_err();
        assert!(matches!(err, PlanError::InvalidTransition { .. }), "got: {err}");
    }

    #[test]
    fn clock_skew_does_not_move_stamp_backwards() {
        let mut e = entry();
        let now = Utc::now();
        AdherenceStateMachine::mark_eaten(&mut e, now).unwrap();
        // A failed attempt with an earlier clock must not touch the stamp.
        let _ = AdherenceStateMachine::mark_eaten(&mut e, now - Duration::hours(1));
        assert_eq!(e.adherence().updated_at(), Some(now));
    }

    #[test]
    fn action_targets() {
        assert_eq!(AdherenceAction::Eaten.target(), AdherenceStatus::Eaten);
        assert_eq!(
            AdherenceAction::Replaced { with: "x".into() }.target(),
            AdherenceStatus::Replaced
        );
    }
}
