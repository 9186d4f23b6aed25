//! Command-line argument resolution.
//!
//! A `<plan>` argument is a plan UUID or a plan file that already carries
//! `[plan].id`. An `<entry>` argument is an entry UUID or `day:meal_type`.
//! After `plan create`, the new id is written back into the plan file with
//! `toml_edit`, leaving comments and layout alone.

use std::cmp::Ordering;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use toml_edit::{DocumentMut, Item, Key};
use uuid::Uuid;

use mealplan_core::plan::{EntryRef, PlanFile};

/// Resolve a `<plan>` argument to a plan id.
///
/// A valid UUID wins. Anything else is read as a plan file when it exists or
/// looks like one (`*.toml`, or containing a path separator).
pub fn resolve_plan_id(input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }

    let path = Path::new(input);
    if path.is_file() || names_plan_file(path) {
        return plan_id_in_file(path);
    }
    Err(anyhow!(
        "{input:?} is neither a plan id nor a plan file"
    ))
}

/// Parse an `<entry>` argument.
pub fn parse_entry_arg(input: &str) -> Result<EntryRef> {
    input
        .parse::<EntryRef>()
        .with_context(|| format!("invalid entry {input:?}; use an entry id or day:meal_type"))
}

fn names_plan_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml") || path.components().count() > 1
}

fn plan_id_in_file(path: &Path) -> Result<Uuid> {
    let shown = path.display();
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read plan file {shown}"))?;
    let file: PlanFile =
        toml::from_str(&content).with_context(|| format!("{shown} is not a plan file"))?;

    file.plan.id.with_context(|| {
        format!("{shown} has no [plan].id yet; run `mealplan plan create {shown}` first")
    })
}

/// Set `[plan].id` in a plan file, placing it first in the table. Any id
/// already present is overwritten.
pub fn write_plan_id_to_file(path: impl AsRef<Path>, plan_id: Uuid) -> Result<()> {
    let path = path.as_ref();
    let shown = path.display();
    let content = std::fs::read_to_string(path).with_context(|| format!("failed to read {shown}"))?;

    let mut doc = content
        .parse::<DocumentMut>()
        .with_context(|| format!("{shown} is not valid TOML"))?;
    let plan = doc
        .get_mut("plan")
        .and_then(Item::as_table_mut)
        .with_context(|| format!("{shown} has no [plan] table"))?;

    plan.insert("id", toml_edit::value(plan_id.to_string()));
    plan.sort_values_by(|a: &Key, _, b: &Key, _| id_first(a, b));

    std::fs::write(path, doc.to_string()).with_context(|| format!("failed to write {shown}"))
}

fn id_first(a: &Key, b: &Key) -> Ordering {
    (a.get() != "id").cmp(&(b.get() != "id"))
}
