//! Storage-agnostic plan access.
//!
//! [`PlanStore`] is what callers program against; the JSON file store
//! ([`Database`]) is one implementation, a store that talks to a running
//! server over HTTP is another.

use anyhow::Result;
use async_trait::async_trait;

use crate::db::Database;
use crate::models::{Identity, NewPlan, Plan, PlanPatch};

#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Short human-readable description of where plans live.
    fn describe(&self) -> String;

    async fn list(&self, date: &str, who: &Identity) -> Result<Vec<Plan>>;

    async fn insert(&self, who: &Identity, input: NewPlan) -> Result<Plan>;

    /// `None` when no plan with `id` is owned by `who`.
    async fn update(&self, id: &str, who: &Identity, patch: PlanPatch) -> Result<Option<Plan>>;

    async fn delete(&self, id: &str, who: &Identity) -> Result<bool>;
}

#[async_trait]
impl PlanStore for Database {
    fn describe(&self) -> String {
        match self.path() {
            Some(path) => format!("file {}", path.display()),
            None => "memory".to_string(),
        }
    }

    async fn list(&self, date: &str, who: &Identity) -> Result<Vec<Plan>> {
        self.list_plans(date, who)
    }

    async fn insert(&self, who: &Identity, input: NewPlan) -> Result<Plan> {
        self.insert_plan(who, input)
    }

    async fn update(&self, id: &str, who: &Identity, patch: PlanPatch) -> Result<Option<Plan>> {
        self.update_plan(id, who, patch)
    }

    async fn delete(&self, id: &str, who: &Identity) -> Result<bool> {
        self.delete_plan(id, who)
    }
}
