pub mod password;

pub use password::{hash_password, verify_password, PasswordError, PasswordPolicy};

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::SecurityConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token secret not configured")]
    MissingSecret,

    #[error("Token generation error: {0}")]
    Generation(String),
}

/// Signs and checks time-limited HS256 tokens carrying a user id
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_expiration: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, default_expiration: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            default_expiration,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(&security.secret_key, security.token_expiration_secs)
    }

    pub fn default_expiration(&self) -> u64 {
        self.default_expiration
    }

    /// Issue a token for `user_id`, valid for `expiration` seconds (or the default)
    pub fn issue(&self, user_id: &str, expiration: Option<u64>) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(expiration.unwrap_or(self.default_expiration))
            .map_err(|e| TokenError::Generation(e.to_string()))?;
        let claims = Claims {
            id: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(lifetime),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Return the embedded user id. Expired and invalid tokens are logged
    /// separately but both deny access.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                warn!("Token rejected: signature expired");
                return Err(TokenError::Expired);
            }
            Err(e) => {
                warn!("Token rejected: {}", e);
                return Err(TokenError::Invalid);
            }
        };

        // jsonwebtoken accepts exp == now; a zero-lifetime token must not verify
        if claims.exp <= Utc::now().timestamp() {
            warn!("Token rejected: signature expired");
            return Err(TokenError::Expired);
        }

        Ok(claims.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", 600).unwrap()
    }

    #[test]
    fn round_trip_returns_user_id() {
        let issuer = issuer();
        let token = issuer.issue("AVq3Y1mZ", None).unwrap();
        assert_eq!(issuer.verify(&token), Ok("AVq3Y1mZ".to_string()));
    }

    #[test]
    fn zero_expiration_is_expired() {
        let issuer = issuer();
        let token = issuer.issue("u1", Some(0)).unwrap();
        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_or_foreign_tokens_are_invalid() {
        let issuer = issuer();
        let token = issuer.issue("u1", None).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert_eq!(issuer.verify(&tampered), Err(TokenError::Invalid));

        let foreign = TokenIssuer::new("other-secret", 600).unwrap().issue("u1", None).unwrap();
        assert_eq!(issuer.verify(&foreign), Err(TokenError::Invalid));

        assert_eq!(issuer.verify("not-a-token"), Err(TokenError::Invalid));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenIssuer::new("", 600), Err(TokenError::MissingSecret)));
    }
}
