//! Session tokens
//!
//! HS256-signed tokens carrying the user's external subject id as `sub`.
//! Each token gets a random `jti` so two tokens issued in the same second
//! still differ (revocation is keyed by the token string).

use chrono::Utc;
use edupath_common::config::MIN_SESSION_SECRET_LEN;
use edupath_common::{Error, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Issues and decodes session tokens
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl SessionIssuer {
    pub fn new(secret: &str, ttl_minutes: i64) -> Result<Self> {
        if secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(Error::Config(format!(
                "Session secret must be at least {} characters",
                MIN_SESSION_SECRET_LEN
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds: ttl_minutes * 60,
        })
    }

    /// Issue a token for `subject`, valid for the configured TTL
    pub fn issue(&self, subject: &str) -> Result<String> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    fn issue_at(&self, subject: &str, now: i64) -> Result<String> {
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl_seconds,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Failed to sign session token: {}", e)))
    }

    /// Verify signature and expiry
    pub fn decode(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidSignature => "Invalid signature",
                _ => "Invalid token",
            };
            Error::InvalidCredential(reason.to_string())
        })?;

        if data.claims.sub.is_empty() {
            return Err(Error::InvalidCredential("Missing user ID in token".to_string()));
        }

        Ok(data.claims)
    }
}
