//! Integration tests for the `meal_plans` queries and migrations.
//!
//! These need PostgreSQL: either `MEALPLAN_TEST_PG_URL` or a Docker daemon
//! for testcontainers.

use chrono::{NaiveDate, Utc};
use serde_json::json;
use sqlx::Row;
use sqlx::types::Json;
use uuid::Uuid;

use mealplan_db::models::{GeneratedBy, MealPlanRow};
use mealplan_db::pool;
use mealplan_db::queries::meal_plans as db;
use mealplan_test_utils::{create_test_db, drop_test_db};

fn row(owner_id: Uuid) -> MealPlanRow {
    let now = Utc::now();
    MealPlanRow {
        id: Uuid::new_v4(),
        owner_id,
        title: "Meal Plan: Jan 15-21, 2024".into(),
        week_start_date: NaiveDate::from_ymd_opt(2024, 1, 15),
        days: Json(json!([{ "day": "monday", "meals": [] }])),
        nutrition_summary: None,
        generated_by: GeneratedBy::Manual,
        is_active: true,
        revision: 0,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn migrations_create_table_and_are_idempotent() {
    let (pg, db_name) = create_test_db().await;

    pool::run_migrations(&pg)
        .await
        .expect("re-running migrations should be a no-op");

    let exists: bool = sqlx::query(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = 'meal_plans')",
    )
    .fetch_one(&pg)
    .await
    .unwrap()
    .get(0);
    assert!(exists);

    pg.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn insert_get_and_list() {
    let (pg, db_name) = create_test_db().await;
    let owner = Uuid::new_v4();

    let mut older = row(owner);
    older.created_at -= chrono::Duration::days(1);
    let newer = row(owner);
    let foreign = row(Uuid::new_v4());
    for r in [&older, &newer, &foreign] {
        db::insert_meal_plan(&pg, r).await.unwrap();
    }

    let fetched = db::get_meal_plan(&pg, newer.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, newer.title);
    assert_eq!(fetched.days.0, newer.days.0);
    assert_eq!(fetched.generated_by, GeneratedBy::Manual);

    let listed: Vec<Uuid> = db::list_meal_plans_for_owner(&pg, owner)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(listed, vec![newer.id, older.id]);

    assert!(db::get_meal_plan(&pg, Uuid::new_v4()).await.unwrap().is_none());

    pg.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_is_guarded_by_revision() {
    let (pg, db_name) = create_test_db().await;
    let mut r = row(Uuid::new_v4());
    db::insert_meal_plan(&pg, &r).await.unwrap();

    r.title = "Renamed".into();
    r.generated_by = GeneratedBy::Ai;
    r.nutrition_summary = Some(Json(json!({ "calories": 800.0 })));
    r.revision = 1;
    assert_eq!(db::update_meal_plan(&pg, &r, 0).await.unwrap(), 1);

    // Same expected revision again: somebody already moved it on.
    assert_eq!(db::update_meal_plan(&pg, &r, 0).await.unwrap(), 0);
    assert_eq!(db::get_revision(&pg, r.id).await.unwrap(), Some(1));

    let stored = db::get_meal_plan(&pg, r.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Renamed");
    assert_eq!(stored.generated_by, GeneratedBy::Ai);
    assert!(stored.nutrition_summary.is_some());

    pg.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn soft_delete_hides_plan() {
    let (pg, db_name) = create_test_db().await;
    let owner = Uuid::new_v4();
    let r = row(owner);
    db::insert_meal_plan(&pg, &r).await.unwrap();

    assert!(db::soft_delete_meal_plan(&pg, r.id).await.unwrap());
    assert!(!db::soft_delete_meal_plan(&pg, r.id).await.unwrap());
    assert!(db::list_meal_plans_for_owner(&pg, owner).await.unwrap().is_empty());

    let stored = db::get_meal_plan(&pg, r.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
    assert_eq!(stored.revision, 1);

    let (active, inactive) = pool::plan_counts(&pg).await.unwrap();
    assert_eq!((active, inactive), (0, 1));

    pg.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn generated_by_is_checked() {
    let (pg, db_name) = create_test_db().await;
    let r = row(Uuid::new_v4());

    let result = sqlx::query(
        "INSERT INTO meal_plans (id, owner_id, title, days, generated_by) \
         VALUES ($1, $2, 'x', '[]', 'oracle')",
    )
    .bind(r.id)
    .bind(r.owner_id)
    .execute(&pg)
    .await;
    assert!(result.is_err(), "CHECK constraint should reject unknown origin");

    pg.close().await;
    drop_test_db(&db_name).await;
}
