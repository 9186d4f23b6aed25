//! `mealplan eat|skip|replace` commands: record what happened to a planned meal.

use anyhow::Result;
use uuid::Uuid;

use mealplan_core::adherence::{AdherenceAction, resolve_entry};
use mealplan_core::nutrition;
use mealplan_core::service::PlanService;

use crate::plan_cmds::{describe, format_entry};
use crate::resolve;

/// Record `action` for the entry named by `entry_arg` in `plan_arg`.
pub async fn run_adherence(
    service: &PlanService,
    owner_id: Uuid,
    plan_arg: &str,
    entry_arg: &str,
    action: AdherenceAction,
) -> Result<()> {
    let plan_id = resolve::resolve_plan_id(plan_arg)?;
    let target = resolve::parse_entry_arg(entry_arg)?;

    let plan = service
        .apply_adherence(owner_id, plan_id, &target, action)
        .await
        .map_err(describe)?;

    let entry_id = resolve_entry(&plan, &target)?;
    if let (Some(entry), Some(day)) = (plan.entry(entry_id), plan.days().day_of(entry_id)) {
        println!("{day}: {}", format_entry(entry));
    }

    let stats = nutrition::adherence_stats(&plan);
    println!(
        "Completion: {}% ({} of {} meals followed)",
        nutrition::completion_rate(&stats),
        stats.followed(),
        stats.total
    );

    Ok(())
}
