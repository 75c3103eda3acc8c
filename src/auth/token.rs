use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Token payload. `uid` is the user id; times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(config: &AuthConfig, user_id: &str) -> Result<String, Error> {
    let now = Utc::now();
    let claims = Claims {
        uid: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + config.token_ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// Checks the signature and expiry.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn issued_token_verifies() {
        let config = AuthConfig::with_secret("test-secret");
        let token = issue_token(&config, "u1").unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.uid, "u1");
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&AuthConfig::with_secret("one"), "u1").unwrap();
        assert!(verify_token(&AuthConfig::with_secret("two"), &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AuthConfig {
            token_ttl: Duration::hours(-2),
            ..AuthConfig::with_secret("test-secret")
        };
        let token = issue_token(&config, "u1").unwrap();
        assert!(verify_token(&config, &token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify_token(&AuthConfig::default(), "not.a.token").is_err());
    }
}
