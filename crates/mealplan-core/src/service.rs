//! Plan service layer.
//!
//! Every mutation follows the same cycle: load the whole plan, apply one
//! builder or adherence operation, validate, then write the whole plan back
//! guarded by the revision it was loaded at.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adherence::{self, AdherenceAction};
use crate::error::PlanError;
use crate::nutrition::{self, PlanSummary, PlansOverview};
use crate::plan::builder::{MealSelection, PlanBuilder};
use crate::plan::model::{EntryRef, GeneratedBy, MealPlan};
use crate::plan::parser::ParsedPlan;
use crate::plan::title;
use crate::store::{PlanStore, StoreError};

/// Input for [`PlanService::create_plan`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlan {
    /// Generated from the week start date when absent or blank.
    pub title: Option<String>,
    pub week_start_date: Option<NaiveDate>,
    pub selections: Vec<MealSelection>,
    pub generated_by: GeneratedBy,
}

impl From<ParsedPlan> for NewPlan {
    fn from(parsed: ParsedPlan) -> Self {
        Self {
            title: parsed.title,
            week_start_date: parsed.week_start_date,
            selections: parsed.selections,
            generated_by: parsed.generated_by,
        }
    }
}

/// Input for [`PlanService::update_plan`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanUpdate {
    pub title: Option<String>,
    pub week_start_date: Option<NaiveDate>,
    /// The complete new structure. Existing entries survive only when
    /// named with [`crate::plan::PlannedMeal::Keep`].
    pub selections: Option<Vec<MealSelection>>,
}

impl From<ParsedPlan> for PlanUpdate {
    fn from(parsed: ParsedPlan) -> Self {
        Self {
            title: parsed.title,
            week_start_date: parsed.week_start_date,
            selections: Some(parsed.selections),
        }
    }
}

/// Plan operations scoped to an owner.
///
/// A plan owned by someone else, or soft-deleted, is reported as
/// [`PlanError::PlanNotFound`].
#[derive(Clone)]
pub struct PlanService {
    store: Arc<dyn PlanStore>,
}

impl PlanService {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self { store }
    }

    /// Build, validate and store a new plan.
    pub async fn create_plan(&self, owner_id: Uuid, new: NewPlan) -> Result<MealPlan, PlanError> {
        let now = Utc::now();
        let title = match new.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_owned(),
            _ => new
                .week_start_date
                .map(title::default_title)
                .unwrap_or_else(|| title::FALLBACK_TITLE.to_owned()),
        };
        warn_if_not_anchor(new.week_start_date);

        let mut plan = MealPlan::new(owner_id, title, new.week_start_date, new.generated_by, now);
        PlanBuilder::apply_selections(&mut plan, &new.selections)?;
        PlanBuilder::ensure_valid(&plan)?;
        plan.nutrition_summary = Some(nutrition::weekly_totals(&plan));

        self.store.insert(&plan).await?;

        info!(
            plan_id = %plan.id,
            owner_id = %owner_id,
            meals = PlanBuilder::total_meal_count(&plan),
            generated_by = %plan.generated_by,
            "meal plan created"
        );
        Ok(plan)
    }

    /// Change a plan's title, week or structure without touching the
    /// adherence of entries that are kept.
    ///
    /// When the week moves and the title was still the generated one for
    /// the old week, the title follows the new week.
    pub async fn update_plan(
        &self,
        owner_id: Uuid,
        plan_id: Uuid,
        update: PlanUpdate,
    ) -> Result<MealPlan, PlanError> {
        let mut plan = self.load_owned(owner_id, plan_id).await?;
        let expected = plan.revision;
        let prior_week = plan.week_start_date;
        let mut new_title = update.title.map(|t| t.trim().to_owned());

        if let Some(new_week) = update.week_start_date {
            let title_untouched = new_title.as_deref().is_none_or(|t| t == plan.title);
            if title_untouched && prior_week != Some(new_week) {
                if let Some(refreshed) = title::refreshed_title(&plan.title, prior_week, new_week) {
                    debug!(plan_id = %plan_id, title = %refreshed, "refreshing generated title");
                    new_title = Some(refreshed);
                }
            }
            warn_if_not_anchor(Some(new_week));
            plan.week_start_date = Some(new_week);
        }
        if let Some(t) = new_title {
            plan.title = t;
        }
        if let Some(selections) = &update.selections {
            PlanBuilder::apply_selections(&mut plan, selections)?;
        }
        PlanBuilder::ensure_valid(&plan)?;

        let plan = self.commit(plan, expected, Utc::now()).await?;
        info!(plan_id = %plan_id, revision = plan.revision, "meal plan updated");
        Ok(plan)
    }

    /// Record an adherence outcome for one entry and persist it.
    pub async fn apply_adherence(
        &self,
        owner_id: Uuid,
        plan_id: Uuid,
        target: &EntryRef,
        action: AdherenceAction,
    ) -> Result<MealPlan, PlanError> {
        let mut plan = self.load_owned(owner_id, plan_id).await?;
        let expected = plan.revision;
        let now = Utc::now();

        let entry_id = adherence::apply_to_plan(&mut plan, target, &action, now)?;
        let plan = self.commit(plan, expected, now).await?;

        info!(
            plan_id = %plan_id,
            entry_id = %entry_id,
            status = %action.target(),
            "adherence recorded"
        );
        Ok(plan)
    }

    pub async fn mark_eaten(
        &self,
        owner_id: Uuid,
        plan_id: Uuid,
        target: &EntryRef,
    ) -> Result<MealPlan, PlanError> {
        self.apply_adherence(owner_id, plan_id, target, AdherenceAction::Eaten)
            .await
    }

    pub async fn mark_skipped(
        &self,
        owner_id: Uuid,
        plan_id: Uuid,
        target: &EntryRef,
    ) -> Result<MealPlan, PlanError> {
        self.apply_adherence(owner_id, plan_id, target, AdherenceAction::Skipped)
            .await
    }

    pub async fn replace(
        &self,
        owner_id: Uuid,
        plan_id: Uuid,
        target: &EntryRef,
        replacement: &str,
    ) -> Result<MealPlan, PlanError> {
        let action = AdherenceAction::Replaced {
            with: replacement.to_owned(),
        };
        self.apply_adherence(owner_id, plan_id, target, action).await
    }

    pub async fn get_plan(&self, owner_id: Uuid, plan_id: Uuid) -> Result<MealPlan, PlanError> {
        self.load_owned(owner_id, plan_id).await
    }

    /// Active plans of the owner, newest first.
    pub async fn list_plans(&self, owner_id: Uuid) -> Result<Vec<MealPlan>, PlanError> {
        let plans = self.store.list_for_owner(owner_id).await?;
        debug!(owner_id = %owner_id, count = plans.len(), "listed meal plans");
        Ok(plans)
    }

    /// Soft-delete a plan.
    pub async fn delete_plan(&self, owner_id: Uuid, plan_id: Uuid) -> Result<(), PlanError> {
        self.load_owned(owner_id, plan_id).await?;
        if !self.store.soft_delete(plan_id).await? {
            return Err(PlanError::PlanNotFound(plan_id));
        }
        info!(plan_id = %plan_id, "meal plan deleted");
        Ok(())
    }

    /// Totals and adherence figures, recomputed from the entries.
    pub async fn get_summary(&self, owner_id: Uuid, plan_id: Uuid) -> Result<PlanSummary, PlanError> {
        let plan = self.load_owned(owner_id, plan_id).await?;
        let summary = nutrition::plan_summary(&plan);

        if let Some(cached) = plan.nutrition_summary {
            if cached != summary.weekly_totals {
                warn!(
                    plan_id = %plan_id,
                    cached_calories = cached.calories,
                    computed_calories = summary.weekly_totals.calories,
                    "stored nutrition summary is stale"
                );
            }
        }
        Ok(summary)
    }

    /// Plan, meal and completion figures across the owner's active plans.
    pub async fn overview(&self, owner_id: Uuid) -> Result<PlansOverview, PlanError> {
        let plans = self.store.list_for_owner(owner_id).await?;
        Ok(nutrition::plans_overview(&plans))
    }

    async fn load_owned(&self, owner_id: Uuid, plan_id: Uuid) -> Result<MealPlan, PlanError> {
        match self.store.load(plan_id).await? {
            Some(plan) if plan.owner_id == owner_id && plan.is_active => Ok(plan),
            Some(plan) => {
                debug!(
                    plan_id = %plan_id,
                    active = plan.is_active,
                    "meal plan not visible to caller"
                );
                Err(PlanError::PlanNotFound(plan_id))
            }
            None => Err(PlanError::PlanNotFound(plan_id)),
        }
    }

    /// Refresh the derived fields and write the plan back.
    async fn commit(
        &self,
        mut plan: MealPlan,
        expected_revision: i64,
        now: DateTime<Utc>,
    ) -> Result<MealPlan, PlanError> {
        plan.nutrition_summary = Some(nutrition::weekly_totals(&plan));
        plan.revision = expected_revision + 1;
        plan.updated_at = now.max(plan.updated_at);

        match self.store.update(&plan, expected_revision).await {
            Ok(()) => Ok(plan),
            Err(StoreError::NotFound(id)) => Err(PlanError::PlanNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}

fn warn_if_not_anchor(week_start: Option<NaiveDate>) {
    if let Some(date) = week_start {
        if !title::is_week_anchor(date) {
            warn!(week_start = %date, "week start date is not a Monday");
        }
    }
}
