use serde::{Deserialize, Serialize};

/// The owner a plan is scoped to: an authenticated user or an anonymous
/// client session.
///
/// Serialized as a single `user_id` or `session_id` key, which is how it
/// appears inside a flattened [`Plan`](super::Plan) record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    #[serde(rename = "user_id")]
    User(String),
    #[serde(rename = "session_id")]
    Session(String),
}

impl Identity {
    /// Pick an identity from optional request parameters. Empty strings
    /// count as absent and a user id takes precedence over a session id.
    pub fn from_parts(user_id: Option<&str>, session_id: Option<&str>) -> Option<Self> {
        let non_empty = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_owned);
        non_empty(user_id)
            .map(Self::User)
            .or_else(|| non_empty(session_id).map(Self::Session))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::User(id) | Self::Session(id) => id,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User(id) => Some(id),
            Self::Session(_) => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Session(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Session(_) => "session",
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_wins_over_session() {
        let who = Identity::from_parts(Some("u1"), Some("s1"));
        assert_eq!(who, Some(Identity::User("u1".into())));
    }

    #[test]
    fn empty_strings_are_absent() {
        assert_eq!(
            Identity::from_parts(Some(""), Some("s1")),
            Some(Identity::Session("s1".into()))
        );
        assert_eq!(Identity::from_parts(Some(""), Some("")), None);
        assert_eq!(Identity::from_parts(None, None), None);
    }
}
