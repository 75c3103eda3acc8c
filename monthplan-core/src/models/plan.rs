use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coerce::{
    deserialize_completed, deserialize_optional_completed, deserialize_present,
    deserialize_present_quantity, deserialize_quantity, serialize_quantity,
};
use super::Identity;

/// A single tracked activity for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub exercise_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(
        default,
        serialize_with = "serialize_quantity",
        deserialize_with = "deserialize_quantity"
    )]
    pub quantity: f64,
    pub plan_date: String,
    #[serde(default, deserialize_with = "deserialize_completed")]
    pub completed: bool,
    #[serde(flatten)]
    pub owner: Identity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    pub fn new(id: String, owner: Identity, input: NewPlan, now: DateTime<Utc>) -> Self {
        let content = input.display_content();
        Self {
            id,
            content,
            exercise_type: input.exercise_type,
            unit: input.unit,
            quantity: input.quantity,
            plan_date: input.plan_date,
            completed: false,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the fields present in `patch` and bump `updated_at`.
    pub fn apply(&mut self, patch: PlanPatch, now: DateTime<Utc>) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(exercise_type) = patch.exercise_type {
            self.exercise_type = exercise_type;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = now;
    }

    pub fn is_owned_by(&self, who: &Identity) -> bool {
        &self.owner == who
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlan {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub exercise_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(
        default,
        serialize_with = "serialize_quantity",
        deserialize_with = "deserialize_quantity"
    )]
    pub quantity: f64,
    pub plan_date: String,
}

impl NewPlan {
    pub fn exercise(
        exercise_type: impl Into<String>,
        unit: Option<String>,
        quantity: f64,
        plan_date: impl Into<String>,
    ) -> Self {
        Self {
            content: None,
            exercise_type: Some(exercise_type.into()),
            unit,
            quantity,
            plan_date: plan_date.into(),
        }
    }

    /// `content` falls back to the exercise type, then to an empty string.
    pub fn display_content(&self) -> String {
        self.content
            .clone()
            .or_else(|| self.exercise_type.clone())
            .unwrap_or_default()
    }

    /// Whether there is anything to show for this plan.
    pub fn has_content(&self) -> bool {
        !self.display_content().is_empty()
    }
}

/// Partial update. Absent keys leave the record untouched; for the nullable
/// `exercise_type` and `unit` an explicit `null` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub exercise_type: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present_quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_completed",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed: Option<bool>,
}

impl PlanPatch {
    pub fn completed(done: bool) -> Self {
        Self {
            completed: Some(done),
            ..Default::default()
        }
    }
}
