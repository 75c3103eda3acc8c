use anyhow::Result;
use chrono::Utc;

use super::{new_id, Database};
use crate::models::{Identity, NewPlan, Plan, PlanPatch};

impl Database {
    /// Plans for `date` owned by `who`, ordered by creation time.
    pub fn list_plans(&self, date: &str, who: &Identity) -> Result<Vec<Plan>> {
        self.read(|doc| doc.plans_for(date, who))
    }

    pub fn get_plan(&self, id: &str, who: &Identity) -> Result<Option<Plan>> {
        self.read(|doc| doc.find_plan(id, who).cloned())
    }

    pub fn insert_plan(&self, who: &Identity, input: NewPlan) -> Result<Plan> {
        let plan = Plan::new(new_id(), who.clone(), input, Utc::now());
        self.write(|doc| {
            doc.collection_mut(who).push(plan.clone());
            Some(())
        })?;

        tracing::debug!(id = %plan.id, owner = %who, date = %plan.plan_date, "inserted plan");
        Ok(plan)
    }

    /// `None` when no plan with this id belongs to `who`, including when the
    /// id exists under another identity.
    pub fn update_plan(&self, id: &str, who: &Identity, patch: PlanPatch) -> Result<Option<Plan>> {
        let updated = self.write(|doc| {
            let plan = doc.find_plan_mut(id, who)?;
            plan.apply(patch, Utc::now());
            Some(plan.clone())
        })?;

        match &updated {
            Some(plan) => tracing::debug!(id = %plan.id, owner = %who, "updated plan"),
            None => tracing::debug!(id, owner = %who, "update matched no plan"),
        }
        Ok(updated)
    }

    pub fn delete_plan(&self, id: &str, who: &Identity) -> Result<bool> {
        let removed = self.write(|doc| doc.remove_plan(id, who))?.is_some();
        tracing::debug!(id, owner = %who, removed, "delete plan");
        Ok(removed)
    }
}
