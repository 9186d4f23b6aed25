//! `mealplan summary` and `mealplan overview`: nutrition and adherence figures.

use anyhow::Result;
use uuid::Uuid;

use mealplan_core::nutrition::{self, PlanSummary, PlansOverview};
use mealplan_core::plan::Nutrition;
use mealplan_core::service::PlanService;

/// Print totals, daily averages and adherence for one plan.
pub async fn run_summary(
    service: &PlanService,
    owner_id: Uuid,
    plan_arg: &str,
    json: bool,
) -> Result<()> {
    let plan_id = crate::resolve::resolve_plan_id(plan_arg)?;
    let plan = service.get_plan(owner_id, plan_id).await?;
    let summary = service.get_summary(owner_id, plan_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Plan: {} ({})", plan.title, plan.id);
    println!();
    print!("{}", format_summary(&summary));
    println!();

    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>10}",
        "DAY", "CALORIES", "PROTEIN", "CARBS", "FATS"
    );
    println!("{}", "-".repeat(54));
    for day in plan.days().iter().filter(|d| !d.is_empty()) {
        let totals = nutrition::daily_totals(day);
        println!(
            "{:<10} {:>10.0} {:>10.1} {:>10.1} {:>10.1}",
            day.day(),
            totals.calories,
            totals.protein,
            totals.carbs,
            totals.fats
        );
    }

    Ok(())
}

/// Print plan, meal and completion figures across the owner's active plans.
pub async fn run_overview(service: &PlanService, owner_id: Uuid, json: bool) -> Result<()> {
    let overview = service.overview(owner_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
    } else {
        print!("{}", format_overview(&overview));
    }
    Ok(())
}

fn format_nutrition(n: &Nutrition) -> String {
    format!(
        "{:.0} kcal, {:.1} g protein, {:.1} g carbs, {:.1} g fats",
        n.calories, n.protein, n.carbs, n.fats
    )
}

fn format_summary(summary: &PlanSummary) -> String {
    let a = &summary.adherence;
    format!(
        "Weekly totals:  {}\n\
         Daily average:  {} (over {} day(s))\n\
         Meals:          {} planned, {} eaten, {} replaced, {} skipped ({} total)\n\
         Completion:     {}%\n",
        format_nutrition(&summary.weekly_totals),
        format_nutrition(&summary.daily_average),
        summary.days_with_meals,
        a.planned,
        a.eaten,
        a.replaced,
        a.skipped,
        a.total,
        summary.completion_rate,
    )
}

fn format_overview(overview: &PlansOverview) -> String {
    format!(
        "Active plans:   {}\n\
         Meals planned:  {}\n\
         Completion:     {}%\n",
        overview.total_plans, overview.total_meals, overview.completion_rate
    )
}

#[cfg(test)]
mod tests {
    use mealplan_core::nutrition::AdherenceStats;

    use super::*;

    #[test]
    fn summary_text() {
        let summary = PlanSummary {
            weekly_totals: Nutrition::new(1300.0, 60.0, 160.0, 38.0),
            daily_average: Nutrition::new(650.0, 30.0, 80.0, 19.0),
            days_with_meals: 2,
            total_meals: 3,
            adherence: AdherenceStats {
                eaten: 1,
                skipped: 0,
                replaced: 0,
                planned: 2,
                total: 3,
            },
            completion_rate: 33,
        };
        let text = format_summary(&summary);
        assert!(text.contains("Weekly totals:  1300 kcal, 60.0 g protein"));
        assert!(text.contains("(over 2 day(s))"));
        assert!(text.contains("2 planned, 1 eaten, 0 replaced, 0 skipped (3 total)"));
        assert!(text.ends_with("Completion:     33%\n"));
    }

    #[test]
    fn overview_text() {
        let text = format_overview(&PlansOverview {
            total_plans: 2,
            total_meals: 9,
            completion_rate: 44,
        });
        assert_eq!(
            text,
            "Active plans:   2\nMeals planned:  9\nCompletion:     44%\n"
        );
    }
}
