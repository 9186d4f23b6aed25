//! Nutrition and adherence arithmetic.
//!
//! Everything here is pure and works off the nutrition snapshot stored on
//! each entry. Totals include every entry regardless of adherence: they
//! describe what was planned, not what was eaten.

use serde::Serialize;

use crate::plan::builder::PlanBuilder;
use crate::plan::model::{AdherenceStatus, DayPlan, MealEntry, MealPlan, Nutrition};

/// Element-wise sum of the entries' nutrition.
pub fn sum_entries<'a, I>(entries: I) -> Nutrition
where
    I: IntoIterator<Item = &'a MealEntry>,
{
    entries.into_iter().map(|e| &e.meal.nutrition).sum()
}

pub fn daily_totals(day: &DayPlan) -> Nutrition {
    sum_entries(day.meals())
}

pub fn weekly_totals(plan: &MealPlan) -> Nutrition {
    sum_entries(plan.entries())
}

/// Weekly totals spread over the days that have meals; zero when none do.
pub fn daily_average(weekly: Nutrition, days_with_meals: usize) -> Nutrition {
    weekly.divided_by(days_with_meals)
}

/// Entry counts by adherence status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdherenceStats {
    pub eaten: usize,
    pub skipped: usize,
    pub replaced: usize,
    pub planned: usize,
    pub total: usize,
}

impl AdherenceStats {
    fn record(&mut self, status: AdherenceStatus) {
        match status {
            AdherenceStatus::Planned => self.planned += 1,
            AdherenceStatus::Eaten => self.eaten += 1,
            AdherenceStatus::Skipped => self.skipped += 1,
            AdherenceStatus::Replaced => self.replaced += 1,
        }
        self.total += 1;
    }

    /// Entries that count as followed (eaten or replaced).
    pub fn followed(&self) -> usize {
        self.eaten + self.replaced
    }
}

impl std::ops::Add for AdherenceStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            eaten: self.eaten + rhs.eaten,
            skipped: self.skipped + rhs.skipped,
            replaced: self.replaced + rhs.replaced,
            planned: self.planned + rhs.planned,
            total: self.total + rhs.total,
        }
    }
}

pub fn adherence_stats(plan: &MealPlan) -> AdherenceStats {
    let mut stats = AdherenceStats::default();
    for entry in plan.entries() {
        stats.record(entry.status());
    }
    stats
}

/// Percentage of followed entries, rounded half up; 0 for an empty plan.
pub fn completion_rate(stats: &AdherenceStats) -> u32 {
    completion_percent(stats.followed(), stats.total)
}

fn completion_percent(followed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // round(100 * f / t) with halves going up, in integers.
    let followed = followed as u64;
    let total = total as u64;
    let pct = (200 * followed + total) / (2 * total);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

/// Derived figures for one plan, computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanSummary {
    pub weekly_totals: Nutrition,
    pub daily_average: Nutrition,
    pub days_with_meals: usize,
    pub total_meals: usize,
    pub adherence: AdherenceStats,
    pub completion_rate: u32,
}

pub fn plan_summary(plan: &MealPlan) -> PlanSummary {
    let weekly = weekly_totals(plan);
    let days_with_meals = PlanBuilder::days_with_meals_count(plan);
    let adherence = adherence_stats(plan);
    PlanSummary {
        weekly_totals: weekly,
        daily_average: daily_average(weekly, days_with_meals),
        days_with_meals,
        total_meals: PlanBuilder::total_meal_count(plan),
        adherence,
        completion_rate: completion_rate(&adherence),
    }
}

/// Figures across all of an owner's active plans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlansOverview {
    pub total_plans: usize,
    pub total_meals: usize,
    pub completion_rate: u32,
}

pub fn plans_overview<'a, I>(plans: I) -> PlansOverview
where
    I: IntoIterator<Item = &'a MealPlan>,
{
    let mut total_plans = 0;
    let mut stats = AdherenceStats::default();
    for plan in plans {
        total_plans += 1;
        stats = stats + adherence_stats(plan);
    }
    PlansOverview {
        total_plans,
        total_meals: stats.total,
        completion_rate: completion_rate(&stats),
    }
}
