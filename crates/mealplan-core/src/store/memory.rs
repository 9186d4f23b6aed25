//! Process-local [`PlanStore`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{PlanStore, StoreError};
use crate::plan::model::MealPlan;

/// Plans kept in a map behind a mutex. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: Mutex<HashMap<Uuid, MealPlan>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn plans(&self) -> MutexGuard<'_, HashMap<Uuid, MealPlan>> {
        self.plans.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn insert(&self, plan: &MealPlan) -> Result<(), StoreError> {
        let mut plans = self.plans();
        if plans.contains_key(&plan.id) {
            return Err(StoreError::AlreadyExists(plan.id));
        }
        plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<MealPlan>, StoreError> {
        Ok(self.plans().get(&id).cloned())
    }

    async fn update(&self, plan: &MealPlan, expected_revision: i64) -> Result<(), StoreError> {
        let mut plans = self.plans();
        let stored = plans.get_mut(&plan.id).ok_or(StoreError::NotFound(plan.id))?;
        if stored.revision != expected_revision {
            return Err(StoreError::Conflict {
                plan: plan.id,
                expected: expected_revision,
                found: stored.revision,
            });
        }
        *stored = plan.clone();
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<MealPlan>, StoreError> {
        let mut owned: Vec<MealPlan> = self
            .plans()
            .values()
            .filter(|p| p.owner_id == owner_id && p.is_active)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut plans = self.plans();
        match plans.get_mut(&id) {
            Some(plan) if plan.is_active => {
                plan.is_active = false;
                plan.revision += 1;
                plan.updated_at = Utc::now().max(plan.updated_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::plan::model::GeneratedBy;

    fn plan(owner: Uuid) -> MealPlan {
        MealPlan::new(
            owner,
            "t",
            NaiveDate::from_ymd_opt(2024, 1, 15),
            GeneratedBy::Manual,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn insert_twice_is_rejected() {
        let store = InMemoryPlanStore::new();
        let p = plan(Uuid::new_v4());
        store.insert(&p).await.unwrap();
        let err = store.insert(&p).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(id) if id == p.id));
    }

    #[tokio::test]
    async fn update_checks_revision() {
        let store = InMemoryPlanStore::new();
        let mut p = plan(Uuid::new_v4());
        store.insert(&p).await.unwrap();

        p.title = "renamed".into();
        p.revision = 1;
        store.update(&p, 0).await.unwrap();

        let err = store.update(&p, 0).await.unwrap_err();
        assert!(
            matches!(err, StoreError::Conflict { expected: 0, found: 1, .. }),
            "got: {err}"
        );
        assert_eq!(store.load(p.id).await.unwrap().unwrap().title, "renamed");
    }

    #[tokio::test]
    async fn update_missing_plan_is_not_found() {
        let store = InMemoryPlanStore::new();
        let p = plan(Uuid::new_v4());
        let err = store.update(&p, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_scoped_and_newest_first() {
        let store = InMemoryPlanStore::new();
        let owner = Uuid::new_v4();
        let mut older = plan(owner);
        older.created_at -= Duration::days(7);
        let newer = plan(owner);
        let foreign = plan(Uuid::new_v4());
        for p in [&older, &newer, &foreign] {
            store.insert(p).await.unwrap();
        }

        let ids: Vec<Uuid> = store
            .list_for_owner(owner)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn soft_delete_hides_plan_once() {
        let store = InMemoryPlanStore::new();
        let owner = Uuid::new_v4();
        let p = plan(owner);
        store.insert(&p).await.unwrap();

        assert!(store.soft_delete(p.id).await.unwrap());
        assert!(!store.soft_delete(p.id).await.unwrap());
        assert!(store.list_for_owner(owner).await.unwrap().is_empty());

        let stored = store.load(p.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert_eq!(stored.revision, 1);
    }
}
