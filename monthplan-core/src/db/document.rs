use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{Identity, Plan, Profile, User};

/// The whole persisted store: four record collections in one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "lenient_records")]
    pub users: Vec<User>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub profiles: Vec<Profile>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub plans: Vec<Plan>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub public_plans: Vec<Plan>,
}

/// A collection that is `null` or missing reads as empty, and a record that
/// does not fit its shape is dropped with a warning instead of failing the
/// whole document.
fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed record");
                None
            }
        })
        .collect())
}

impl Document {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// User-owned plans live in `plans`, session-owned ones in `public_plans`.
    pub fn collection(&self, who: &Identity) -> &Vec<Plan> {
        match who {
            Identity::User(_) => &self.plans,
            Identity::Session(_) => &self.public_plans,
        }
    }

    pub fn collection_mut(&mut self, who: &Identity) -> &mut Vec<Plan> {
        match who {
            Identity::User(_) => &mut self.plans,
            Identity::Session(_) => &mut self.public_plans,
        }
    }

    /// Plans for one date and owner, oldest first.
    pub fn plans_for(&self, date: &str, who: &Identity) -> Vec<Plan> {
        let mut plans: Vec<Plan> = self
            .collection(who)
            .iter()
            .filter(|p| p.plan_date == date && p.is_owned_by(who))
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        plans
    }

    pub fn find_plan(&self, id: &str, who: &Identity) -> Option<&Plan> {
        self.collection(who)
            .iter()
            .find(|p| p.id == id && p.is_owned_by(who))
    }

    pub fn find_plan_mut(&mut self, id: &str, who: &Identity) -> Option<&mut Plan> {
        self.collection_mut(who)
            .iter_mut()
            .find(|p| p.id == id && p.is_owned_by(who))
    }

    pub fn remove_plan(&mut self, id: &str, who: &Identity) -> Option<Plan> {
        let plans = self.collection_mut(who);
        let idx = plans
            .iter()
            .position(|p| p.id == id && p.is_owned_by(who))?;
        Some(plans.remove(idx))
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Replace the profile with the same id, or append a new one.
    pub fn upsert_profile(&mut self, profile: Profile) {
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }
}
