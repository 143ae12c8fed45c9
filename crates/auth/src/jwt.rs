//! JWT session token generation and validation.

use chrono::{Duration, Utc};
use common::UserId;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AuthError, AuthResult, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_JWT_ISSUER};

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: String,
    /// Email address.
    pub email: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Token id.
    pub jti: String,
}

impl Claims {
    /// Creates claims for a user session.
    pub fn new(user_id: UserId, email: String, issuer: String, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user_id.to_string(),
            email,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: issuer,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Returns the user id the token was issued for.
    pub fn user_id(&self) -> AuthResult<UserId> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Issues and verifies session tokens.
///
/// The API layer depends on this trait, not on a concrete signer, so
/// tests can swap in a deterministic issuer.
pub trait TokenIssuer: Send + Sync {
    /// Issues a signed token for the given user.
    fn issue(&self, user_id: UserId, email: &str) -> AuthResult<String>;

    /// Verifies a token and returns its claims.
    fn verify(&self, token: &str) -> AuthResult<Claims>;
}

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Token expiration in hours.
    pub expiration_hours: u64,
    /// Token issuer.
    pub issuer: String,
}

impl JwtConfig {
    /// Creates a new JWT configuration with default expiration and issuer.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            issuer: DEFAULT_JWT_ISSUER.to_string(),
        }
    }

    /// Sets the expiration time in hours.
    pub fn with_expiration_hours(mut self, hours: u64) -> Self {
        self.expiration_hours = hours;
        self
    }
}

/// HMAC-signed JWT issuer.
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .field("expiration_hours", &self.config.expiration_hours)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Creates a new JWT manager from the configuration.
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Returns the token lifetime in seconds, for cookie max-age.
    pub fn expiration_seconds(&self) -> u64 {
        self.config.expiration_hours * 3600
    }
}

impl TokenIssuer for JwtManager {
    fn issue(&self, user_id: UserId, email: &str) -> AuthResult<String> {
        let claims = Claims::new(
            user_id,
            email.to_string(),
            self.config.issuer.clone(),
            self.config.expiration_hours,
        );

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::JwtEncoding(e.to_string()))
    }

    fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(secret: &str) -> JwtManager {
        JwtManager::new(JwtConfig::new(secret))
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let manager = manager("test-secret-key-must-be-long-enough");
        let user_id = UserId::new();

        let token = manager.issue(user_id, "ana@example.com").unwrap();
        let claims = manager.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.iss, DEFAULT_JWT_ISSUER);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let manager = manager("test-secret-key-must-be-long-enough");
        assert!(manager.verify("not-a-token").is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let signer = manager("secret-one-must-be-long-enough");
        let verifier = manager("secret-two-must-be-long-enough");

        let token = signer.issue(UserId::new(), "ana@example.com").unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let manager = manager("test-secret-key-must-be-long-enough");
        let mut token = manager.issue(UserId::new(), "ana@example.com").unwrap();
        token.pop();
        assert!(manager.verify(&token).is_err());
    }
}
