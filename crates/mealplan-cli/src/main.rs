mod adherence_cmds;
mod config;
mod plan_cmds;
mod report_cmd;
mod resolve;
#[cfg(test)]
mod test_util;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use mealplan_core::adherence::AdherenceAction;
use mealplan_core::service::PlanService;
use mealplan_core::store::PgPlanStore;
use mealplan_db::config::DbConfig;
use mealplan_db::pool;

use config::MealplanConfig;

#[derive(Parser)]
#[command(name = "mealplan", about = "Weekly meal plans, meal adherence and nutrition summaries")]
struct Cli {
    /// Database URL (overrides MEALPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Owner ID to act as (overrides MEALPLAN_OWNER_ID env var)
    #[arg(long, global = true)]
    owner: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a mealplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the mealplan database (requires config file or env vars)
    DbInit,
    /// Plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Mark a planned meal as eaten
    Eat {
        /// Plan ID or plan file
        plan: String,
        /// Entry ID or day:meal_type (e.g. monday:lunch)
        entry: String,
    },
    /// Mark a planned meal as skipped
    Skip {
        /// Plan ID or plan file
        plan: String,
        /// Entry ID or day:meal_type
        entry: String,
    },
    /// Record that something else was eaten instead of a planned meal
    Replace {
        /// Plan ID or plan file
        plan: String,
        /// Entry ID or day:meal_type
        entry: String,
        /// What was eaten instead
        #[arg(long = "with")]
        with: String,
    },
    /// Show nutrition totals and adherence for a plan
    Summary {
        /// Plan ID or plan file
        plan: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show figures across all active plans
    Overview {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a plan from a TOML file
    Create {
        /// Path to the plan TOML file
        file: String,
        /// Use next Monday when the file has no week_start
        #[arg(long)]
        next_week: bool,
    },
    /// Show plan details (or list all plans)
    Show {
        /// Plan ID or plan file (omit to list all)
        plan: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Apply a plan file to an existing plan
    Update {
        /// Plan ID or plan file
        plan: String,
        /// Path to the plan TOML file
        file: String,
    },
    /// Delete a plan
    Delete {
        /// Plan ID or plan file
        plan: String,
    },
    /// Export a plan as TOML
    Export {
        /// Plan ID or plan file
        plan: String,
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
}

/// Execute the `mealplan init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let owner_id = Uuid::new_v4();

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        owner: config::OwnerSection { id: owner_id },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  owner.id = {owner_id}");
    println!();
    println!("Next: run `mealplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `mealplan db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let db_config = config::resolve_db_config(cli_db_url);

    println!("Initializing mealplan database...");

    if pool::ensure_database_exists(&db_config).await? {
        println!("Created database {}.", db_config.database_name().unwrap_or("?"));
    }
    let db_pool = pool::create_pool(&db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let (active, deleted) = pool::plan_counts(&db_pool).await?;
    println!("Database ready. meal_plans: {active} active, {deleted} deleted");

    db_pool.close().await;

    println!("mealplan db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        command => {
            let resolved = MealplanConfig::resolve(cli.database_url.as_deref(), cli.owner)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let service = PlanService::new(Arc::new(PgPlanStore::new(db_pool.clone())));
            let result = run_command(command, &service, resolved.owner_id).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}

/// Run a command that needs the plan service.
async fn run_command(command: Commands, service: &PlanService, owner_id: Uuid) -> anyhow::Result<()> {
    match command {
        Commands::Plan { command } => {
            plan_cmds::run_plan_command(command, service, owner_id).await
        }
        Commands::Eat { plan, entry } => {
            adherence_cmds::run_adherence(service, owner_id, &plan, &entry, AdherenceAction::Eaten)
                .await
        }
        Commands::Skip { plan, entry } => {
            adherence_cmds::run_adherence(
                service,
                owner_id,
                &plan,
                &entry,
                AdherenceAction::Skipped,
            )
            .await
        }
        Commands::Replace { plan, entry, with } => {
            adherence_cmds::run_adherence(
                service,
                owner_id,
                &plan,
                &entry,
                AdherenceAction::Replaced { with },
            )
            .await
        }
        Commands::Summary { plan, json } => {
            report_cmd::run_summary(service, owner_id, &plan, json).await
        }
        Commands::Overview { json } => report_cmd::run_overview(service, owner_id, json).await,
        Commands::Init { .. } | Commands::DbInit => {
            anyhow::bail!("init and db-init do not operate on plans")
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_replace_with_text() {
        let cli = Cli::try_parse_from([
            "mealplan",
            "replace",
            "plan.toml",
            "monday:lunch",
            "--with",
            "Leftover pasta",
        ])
        .unwrap();
        match cli.command {
            Commands::Replace { plan, entry, with } => {
                assert_eq!(plan, "plan.toml");
                assert_eq!(entry, "monday:lunch");
                assert_eq!(with, "Leftover pasta");
            }
            _ => panic!("expected replace"),
        }
    }

    #[test]
    fn global_owner_flag() {
        let owner = Uuid::new_v4();
        let owner_arg = owner.to_string();
        let cli = Cli::try_parse_from(["mealplan", "overview", "--owner", owner_arg.as_str()])
            .unwrap();
        assert_eq!(cli.owner, Some(owner));
    }
}
