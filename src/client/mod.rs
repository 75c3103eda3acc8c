//! Plan access for clients, independent of where the plans live.
//!
//! [`connect`] picks a [`PlanStore`] from whatever is configured: a running
//! server, a local store file, or (with nothing configured) process memory.

mod http;

pub use http::HttpStore;

use std::sync::Arc;

use anyhow::Result;

use crate::config::ClientConfig;
use crate::db::Database;
use crate::models::Identity;
use crate::store::PlanStore;

pub fn connect(config: &ClientConfig) -> Result<Arc<dyn PlanStore>> {
    let store: Arc<dyn PlanStore> = if let Some(base) = &config.api_base {
        Arc::new(HttpStore::new(base.clone(), config.token.clone()))
    } else if let Some(path) = &config.db_path {
        Arc::new(Database::open(path)?)
    } else {
        tracing::warn!("no API or store file configured, plans will not outlive this process");
        Arc::new(Database::open_memory())
    };

    tracing::debug!(backend = %store.describe(), "connected plan store");
    Ok(store)
}

/// A fresh anonymous session id.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Client-side identity: an explicit user, else the given session, else a
/// newly generated session.
pub fn client_identity(user_id: Option<String>, session_id: Option<String>) -> Identity {
    Identity::from_parts(user_id.as_deref(), session_id.as_deref())
        .unwrap_or_else(|| Identity::Session(new_session_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPlan;
    use tempfile::TempDir;

    #[tokio::test]
    async fn nothing_configured_falls_back_to_memory() {
        let store = connect(&ClientConfig::default()).unwrap();
        assert_eq!(store.describe(), "memory");
    }

    #[tokio::test]
    async fn store_file_is_used_when_no_api() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let config = ClientConfig {
            db_path: Some(path.clone()),
            ..Default::default()
        };

        let who = Identity::Session("s1".into());
        let store = connect(&config).unwrap();
        store
            .insert(&who, NewPlan::exercise("yoga", None, 1.0, "2024-05-01"))
            .await
            .unwrap();

        let again = connect(&config).unwrap();
        assert!(again.describe().starts_with("file "));
        assert_eq!(again.list("2024-05-01", &who).await.unwrap().len(), 1);
    }

    #[test]
    fn api_takes_precedence() {
        let config = ClientConfig {
            api_base: Some("http://127.0.0.1:4000/api".into()),
            db_path: Some("/nonexistent/db.json".into()),
            token: None,
        };
        let store = connect(&config).unwrap();
        assert_eq!(store.describe(), "api http://127.0.0.1:4000/api");
    }

    #[test]
    fn generated_sessions_are_unique() {
        let a = client_identity(None, None);
        let b = client_identity(None, Some(String::new()));
        assert!(a.is_anonymous() && b.is_anonymous());
        assert_ne!(a, b);
        assert_eq!(
            client_identity(Some("u1".into()), Some("s1".into())),
            Identity::User("u1".into())
        );
    }
}
