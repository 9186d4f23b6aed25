//! Persistence seam for meal plans.
//!
//! [`PlanService`](crate::service::PlanService) only ever reads and writes
//! whole plan documents through [`PlanStore`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::plan::model::MealPlan;

pub use memory::InMemoryPlanStore;
pub use postgres::PgPlanStore;

/// Errors reported by a [`PlanStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("meal plan {0} not found")]
    NotFound(Uuid),

    #[error("meal plan {plan} was modified concurrently: expected revision {expected}, found {found}")]
    Conflict { plan: Uuid, expected: i64, found: i64 },

    #[error("meal plan {0} already exists")]
    AlreadyExists(Uuid),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Document store for meal plans, keyed by plan id.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Store a new plan.
    async fn insert(&self, plan: &MealPlan) -> Result<(), StoreError>;

    /// Load a plan by id, including inactive ones.
    async fn load(&self, id: Uuid) -> Result<Option<MealPlan>, StoreError>;

    /// Overwrite a plan whose stored revision is `expected_revision`.
    ///
    /// Fails with [`StoreError::Conflict`] when the stored revision differs.
    async fn update(&self, plan: &MealPlan, expected_revision: i64) -> Result<(), StoreError>;

    /// Active plans of `owner_id`, newest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<MealPlan>, StoreError>;

    /// Mark a plan inactive. Returns `false` when no active plan matched.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
