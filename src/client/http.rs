use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::api::{DeleteResponse, HealthStatus};
use crate::models::{Identity, NewPlan, Plan, PlanPatch};
use crate::store::PlanStore;

/// Plans kept by a running monthplan server, reached over its JSON API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl HttpStore {
    /// `base` is the API root, e.g. `http://127.0.0.1:4000/api`.
    pub fn new(base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base).with_context(|| format!("invalid API URL {}", self.base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("API URL {} cannot have a path", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let request = self.http.request(method, self.url(segments)?);
        Ok(match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let resp = self.request(Method::GET, &["health"])?.send().await?;
        read_json(resp).await
    }
}

/// Query/body parameters naming the owner, as the API expects them.
fn owner_params(who: &Identity) -> (&'static str, &str) {
    match who {
        Identity::User(id) => ("userId", id),
        Identity::Session(id) => ("sessionId", id),
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }

    let message = resp
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| status.to_string());
    Err(anyhow!("server returned {status}: {message}"))
}

#[async_trait]
impl PlanStore for HttpStore {
    fn describe(&self) -> String {
        format!("api {}", self.base)
    }

    async fn list(&self, date: &str, who: &Identity) -> Result<Vec<Plan>> {
        let (key, id) = owner_params(who);
        let resp = self
            .request(Method::GET, &["plans"])?
            .query(&[("date", date), (key, id)])
            .send()
            .await?;
        read_json(resp).await
    }

    async fn insert(&self, who: &Identity, input: NewPlan) -> Result<Plan> {
        let (key, id) = owner_params(who);
        let mut body = json!({
            "content": input.content,
            "exercise_type": input.exercise_type,
            "unit": input.unit,
            "quantity": input.quantity,
            "date": input.plan_date,
        });
        body[key] = json!(id);

        let resp = self.request(Method::POST, &["plans"])?.json(&body).send().await?;
        read_json(resp).await
    }

    async fn update(&self, id: &str, who: &Identity, patch: PlanPatch) -> Result<Option<Plan>> {
        let (key, owner) = owner_params(who);
        let mut body = json!({ "updates": patch });
        body[key] = json!(owner);

        let resp = self
            .request(Method::PUT, &["plans", id])?
            .json(&body)
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(resp).await.map(Some)
    }

    async fn delete(&self, id: &str, who: &Identity) -> Result<bool> {
        let (key, owner) = owner_params(who);
        let resp = self
            .request(Method::DELETE, &["plans", id])?
            .query(&[(key, owner)])
            .send()
            .await?;
        let body: DeleteResponse = read_json(resp).await?;
        Ok(body.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_and_escaped() {
        let store = HttpStore::new("http://127.0.0.1:4000/api/", None);
        assert_eq!(store.base(), "http://127.0.0.1:4000/api");
        assert_eq!(
            store.url(&["plans", "a b/c"]).unwrap().as_str(),
            "http://127.0.0.1:4000/api/plans/a%20b%2Fc"
        );
    }

    #[test]
    fn owner_params_follow_identity() {
        assert_eq!(owner_params(&Identity::User("u1".into())), ("userId", "u1"));
        assert_eq!(owner_params(&Identity::Session("s1".into())), ("sessionId", "s1"));
    }
}
