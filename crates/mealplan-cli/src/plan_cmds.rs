//! CLI handlers for `mealplan plan` subcommands.
//!
//! Implements:
//! - `mealplan plan create <file>`          -- create a plan from a TOML file
//! - `mealplan plan show [plan]`            -- show plan details or list all plans
//! - `mealplan plan update <plan> <file>`   -- re-apply a plan file to a stored plan
//! - `mealplan plan delete <plan>`          -- soft-delete a plan
//! - `mealplan plan export <plan>`          -- write a stored plan as TOML

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use uuid::Uuid;

use mealplan_core::PlanError;
use mealplan_core::nutrition;
use mealplan_core::plan::{
    AdherenceStatus, MealEntry, MealPlan, ParsedPlan, PlanBuilder, PlanFile, next_week_start,
    parse_plan_file,
};
use mealplan_core::service::{NewPlan, PlanService, PlanUpdate};

use crate::PlanCommands;
use crate::resolve::{resolve_plan_id, write_plan_id_to_file};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(
    command: PlanCommands,
    service: &PlanService,
    owner_id: Uuid,
) -> Result<()> {
    match command {
        PlanCommands::Create { file, next_week } => {
            cmd_create(service, owner_id, &file, next_week).await
        }
        PlanCommands::Show { plan, json } => match plan {
            Some(p) => cmd_show_one(service, owner_id, &p, json).await,
            None => cmd_show_all(service, owner_id, json).await,
        },
        PlanCommands::Update { plan, file } => cmd_update(service, owner_id, &plan, &file).await,
        PlanCommands::Delete { plan } => cmd_delete(service, owner_id, &plan).await,
        PlanCommands::Export { plan, output } => {
            cmd_export(service, owner_id, &plan, output.as_deref()).await
        }
    }
}

/// Turn a service error into a message listing every violation.
pub fn describe(err: PlanError) -> anyhow::Error {
    match err {
        PlanError::Validation(violations) => {
            let lines: Vec<String> = violations.iter().map(|v| format!("  - {v}")).collect();
            anyhow!("plan is not valid:\n{}", lines.join("\n"))
        }
        other => other.into(),
    }
}

fn read_plan_file(file_path: &str) -> Result<ParsedPlan> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read plan file: {file_path}"))?;
    parse_plan_file(&content).with_context(|| format!("failed to parse plan file: {file_path}"))
}

// -----------------------------------------------------------------------
// mealplan plan create <file>
// -----------------------------------------------------------------------

/// Read a plan file, create the plan, write its id back into the file and
/// print a summary.
async fn cmd_create(
    service: &PlanService,
    owner_id: Uuid,
    file_path: &str,
    next_week: bool,
) -> Result<()> {
    let mut parsed = read_plan_file(file_path)?;

    if let Some(id) = parsed.id {
        bail!(
            "plan file {file_path:?} already belongs to plan {id}.\n\
             Use `mealplan plan update {id} {file_path}` to change it."
        );
    }
    if next_week && parsed.week_start_date.is_none() {
        parsed.week_start_date = Some(next_week_start(Utc::now().date_naive()));
    }

    let plan = service
        .create_plan(owner_id, NewPlan::from(parsed))
        .await
        .map_err(describe)?;

    write_plan_id_to_file(file_path, plan.id)?;

    println!("Plan created successfully.");
    println!();
    print_header(&plan);
    println!();
    println!("Plan ID written to {file_path}.");

    Ok(())
}

// -----------------------------------------------------------------------
// mealplan plan show (list all)
// -----------------------------------------------------------------------

/// List the owner's active plans.
async fn cmd_show_all(service: &PlanService, owner_id: Uuid, json: bool) -> Result<()> {
    let plans = service.list_plans(owner_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    if plans.is_empty() {
        println!("No plans found. Use `mealplan plan create <file>` to create one.");
        return Ok(());
    }

    let id_w = 36;
    let title_w = plans
        .iter()
        .map(|p| p.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);
    let week_w = 10;
    let meals_w = 5;
    let done_w = 4;

    println!(
        "{:<id_w$}  {:<title_w$}  {:<week_w$}  {:>meals_w$}  {:>done_w$}  CREATED",
        "ID", "TITLE", "WEEK", "MEALS", "DONE",
    );

    for plan in &plans {
        let week = plan
            .week_start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let stats = nutrition::adherence_stats(plan);
        let done = format!("{}%", nutrition::completion_rate(&stats));
        let created = plan.created_at.format("%Y-%m-%d %H:%M");
        println!(
            "{:<id_w$}  {:<title_w$}  {:<week_w$}  {:>meals_w$}  {:>done_w$}  {}",
            plan.id, plan.title, week, stats.total, done, created,
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// mealplan plan show <plan>
// -----------------------------------------------------------------------

/// Show one plan day by day.
async fn cmd_show_one(
    service: &PlanService,
    owner_id: Uuid,
    plan_arg: &str,
    json: bool,
) -> Result<()> {
    let plan_id = resolve_plan_id(plan_arg)?;
    let plan = service.get_plan(owner_id, plan_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    print_header(&plan);

    for day in plan.days().iter() {
        if day.is_empty() {
            continue;
        }
        let totals = nutrition::daily_totals(day);
        println!();
        println!("{}  ({:.0} kcal)", capitalize(day.day().as_str()), totals.calories);
        for entry in day.meals() {
            println!("  {}", format_entry(entry));
        }
    }

    Ok(())
}

fn print_header(plan: &MealPlan) {
    println!("Plan: {}", plan.title);
    println!("  ID:           {}", plan.id);
    match plan.week_start_date {
        Some(d) => println!("  Week of:      {d}"),
        None => println!("  Week of:      -"),
    }
    println!("  Origin:       {}", plan.generated_by);
    println!("  Revision:     {}", plan.revision);
    println!(
        "  Created:      {}",
        plan.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Meals:        {} over {} day(s)",
        PlanBuilder::total_meal_count(plan),
        PlanBuilder::days_with_meals_count(plan)
    );
}

/// One line per entry: status, slot, meal, calories, entry id.
pub fn format_entry(entry: &MealEntry) -> String {
    let name = if entry.meal.name.is_empty() {
        entry.meal.id.as_str()
    } else {
        entry.meal.name.as_str()
    };
    let mut line = format!(
        "[{:<8}] {:<9}  {:<28}  {:>6.0} kcal  {}",
        entry.status(),
        entry.meal_type(),
        truncate(name, 28),
        entry.meal.nutrition.calories,
        entry.id()
    );
    if entry.status() == AdherenceStatus::Replaced {
        if let Some(with) = entry.adherence().replaced_with() {
            line.push_str(&format!("\n             replaced with: {with}"));
        }
    }
    line
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// -----------------------------------------------------------------------
// mealplan plan update <plan> <file>
// -----------------------------------------------------------------------

/// Apply a plan file to an existing plan. Meals carrying an `entry` id keep
/// their adherence; all others are added as new.
async fn cmd_update(
    service: &PlanService,
    owner_id: Uuid,
    plan_arg: &str,
    file_path: &str,
) -> Result<()> {
    let plan_id = resolve_plan_id(plan_arg)?;
    let parsed = read_plan_file(file_path)?;

    if let Some(file_id) = parsed.id {
        if file_id != plan_id {
            bail!("plan file {file_path:?} belongs to plan {file_id}, not {plan_id}");
        }
    }

    let plan = service
        .update_plan(owner_id, plan_id, PlanUpdate::from(parsed))
        .await
        .map_err(describe)?;

    println!("Plan updated.");
    println!();
    print_header(&plan);

    Ok(())
}

// -----------------------------------------------------------------------
// mealplan plan delete <plan>
// -----------------------------------------------------------------------

async fn cmd_delete(service: &PlanService, owner_id: Uuid, plan_arg: &str) -> Result<()> {
    let plan_id = resolve_plan_id(plan_arg)?;
    service.delete_plan(owner_id, plan_id).await?;
    println!("Plan {plan_id} deleted.");
    Ok(())
}

// -----------------------------------------------------------------------
// mealplan plan export <plan> [--output <file>]
// -----------------------------------------------------------------------

/// Write a stored plan as a plan file to a file or stdout.
async fn cmd_export(
    service: &PlanService,
    owner_id: Uuid,
    plan_arg: &str,
    output: Option<&str>,
) -> Result<()> {
    let plan_id = resolve_plan_id(plan_arg)?;
    let plan = service.get_plan(owner_id, plan_id).await?;

    let toml_content = toml::to_string_pretty(&PlanFile::from_plan(&plan))
        .context("failed to serialize plan")?;

    match output {
        Some(path) => {
            std::fs::write(path, &toml_content)
                .with_context(|| format!("failed to write to {path}"))?;
            println!("Plan exported to {path}");
        }
        None => {
            print!("{toml_content}");
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
