//! External identity verification
//!
//! The identity provider issues RS256-signed ID tokens. Signing keys are
//! published as a JWK set and rotate; the set is cached for
//! `key_cache_seconds` and refetched when a token names an unknown key, at
//! most once per `MIN_REFETCH_INTERVAL`.

use async_trait::async_trait;
use edupath_common::config::IdentityConfig;
use edupath_common::{Error, Result};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Unknown key ids never trigger more than one fetch in this window
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

/// Verified identity extracted from an ID token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub subject: String,
    pub email: String,
}

/// Verifies raw ID tokens from the external identity provider
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Fails with `InvalidCredential` for any bad, expired or malformed token
    async fn verify(&self, raw_token: &str) -> Result<ExternalIdentity>;
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Firebase ID token verifier
pub struct FirebaseVerifier {
    http_client: reqwest::Client,
    config: IdentityConfig,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(config: IdentityConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .map_err(|e| Error::Service(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
            cache: RwLock::new(None),
        })
    }

    fn expected_issuer(&self) -> String {
        format!("{}{}", self.config.issuer_prefix, self.config.project_id)
    }

    async fn fetch_keys(&self) -> Result<JwkSet> {
        let response = self
            .http_client
            .get(&self.config.jwks_url)
            .send()
            .await
            .map_err(|e| Error::Service(format!("Failed to fetch signing keys: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Service(format!(
                "Signing key endpoint returned {}",
                status.as_u16()
            )));
        }

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| Error::Service(format!("Malformed signing key set: {}", e)))?;

        info!(keys = keys.keys.len(), "Fetched identity provider signing keys");
        Ok(keys)
    }

    /// Decoding key for `kid`, refreshing the cached set when stale or missing the key
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey> {
        let ttl = Duration::from_secs(self.config.key_cache_seconds);

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let age = cached.fetched_at.elapsed();
                if age < ttl {
                    if let Some(jwk) = cached.keys.find(kid) {
                        return DecodingKey::from_jwk(jwk).map_err(|e| {
                            Error::InvalidCredential(format!("Unusable signing key: {}", e))
                        });
                    }
                    if age < MIN_REFETCH_INTERVAL {
                        debug!(kid, "Unknown signing key, refetch suppressed");
                        return Err(Error::InvalidCredential("Invalid ID token".to_string()));
                    }
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()
            .map_err(|e| Error::InvalidCredential(format!("Unusable signing key: {}", e)))?;

        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| {
            warn!(kid, "ID token signed with unknown key");
            Error::InvalidCredential("Invalid ID token".to_string())
        })
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, raw_token: &str) -> Result<ExternalIdentity> {
        let header = decode_header(raw_token)
            .map_err(|_| Error::InvalidCredential("Invalid ID token".to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(Error::InvalidCredential("Invalid ID token".to_string()));
        }
        let kid = header
            .kid
            .ok_or_else(|| Error::InvalidCredential("Invalid ID token".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.config.project_id.as_str()]);
        validation.set_issuer(&[self.expected_issuer()]);

        let data = decode::<IdTokenClaims>(raw_token, &key, &validation).map_err(|e| {
            debug!(error = %e, "ID token rejected");
            Error::InvalidCredential("Invalid ID token".to_string())
        })?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(Error::InvalidCredential("ID token has no subject".to_string()));
        }
        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::InvalidCredential("ID token has no email".to_string()))?;

        Ok(ExternalIdentity {
            subject: claims.sub,
            email,
        })
    }
}
