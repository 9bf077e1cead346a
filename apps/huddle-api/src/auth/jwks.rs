//! JWKS client for fetching and caching the identity provider's public keys.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ApiError;

/// A verification key together with the only algorithm it may be used with.
#[derive(Clone)]
pub struct VerificationKey {
    pub key: DecodingKey,
    pub algorithm: Algorithm,
}

/// A cached set of verification keys fetched from the provider's JWKS endpoint.
#[derive(Clone)]
pub struct JwksClient {
    jwks_url: String,
    http: reqwest::Client,
    cache: Arc<RwLock<JwksCache>>,
}

struct JwksCache {
    keys: HashMap<String, VerificationKey>,
    fetched_at: Option<std::time::Instant>,
}

/// How long to cache JWKS before re-fetching (1 hour).
const CACHE_TTL: std::time::Duration = std::time::Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkEntry>,
}

#[derive(Debug, Deserialize)]
struct JwkEntry {
    kid: Option<String>,
    kty: String,
    crv: Option<String>,
    x: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

impl JwksClient {
    pub fn new(jwks_url: &str) -> Self {
        Self {
            jwks_url: jwks_url.to_string(),
            http: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(JwksCache {
                keys: HashMap::new(),
                fetched_at: None,
            })),
        }
    }

    /// For tests: create a client pre-loaded with a known key.
    pub fn with_static_key(kid: &str, key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut keys = HashMap::new();
        keys.insert(kid.to_string(), VerificationKey { key, algorithm });
        Self {
            jwks_url: String::new(),
            http: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(JwksCache {
                keys,
                // Far in the future so it never expires in tests.
                fetched_at: Some(std::time::Instant::now() + std::time::Duration::from_secs(86400)),
            })),
        }
    }

    /// Get the verification key for a given `kid`. Fetches/re-fetches JWKS as needed.
    pub async fn get_key(&self, kid: &str) -> Result<VerificationKey, ApiError> {
        {
            let cache = self.cache.read().await;
            if let Some(key) = cache.keys.get(kid) {
                if cache_is_fresh(&cache) {
                    return Ok(key.clone());
                }
            }
        }

        // Cache miss or stale.
        self.refresh().await?;

        let cache = self.cache.read().await;
        cache.keys.get(kid).cloned().ok_or_else(|| {
            tracing::debug!(%kid, "unknown signing key");
            ApiError::unauthorized()
        })
    }

    async fn refresh(&self) -> Result<(), ApiError> {
        tracing::info!(url = %self.jwks_url, "fetching identity provider JWKS");

        let resp: JwksResponse = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(?e, "JWKS fetch failed");
                ApiError::internal()
            })?
            .json()
            .await
            .map_err(|e| {
                tracing::error!(?e, "JWKS parse failed");
                ApiError::internal()
            })?;

        let keys: HashMap<String, VerificationKey> = resp
            .keys
            .into_iter()
            .filter_map(|entry| {
                let kid = entry.kid.clone()?;
                match parse_entry(entry) {
                    Ok(key) => key.map(|key| (kid, key)),
                    Err(reason) => {
                        tracing::warn!(%kid, reason, "skipping JWKS entry");
                        None
                    }
                }
            })
            .collect();

        tracing::debug!(count = keys.len(), "JWKS refreshed");

        let mut cache = self.cache.write().await;
        cache.keys = keys;
        cache.fetched_at = Some(std::time::Instant::now());

        Ok(())
    }
}

fn cache_is_fresh(cache: &JwksCache) -> bool {
    match cache.fetched_at {
        Some(t) => t.elapsed() < CACHE_TTL,
        None => false,
    }
}

/// `Ok(None)` for key types this service does not verify with.
fn parse_entry(entry: JwkEntry) -> Result<Option<VerificationKey>, &'static str> {
    match entry.kty.as_str() {
        "OKP" => {
            if entry.crv.as_deref() != Some("Ed25519") {
                return Ok(None);
            }
            let x = entry.x.ok_or("missing x")?;
            let public_bytes = URL_SAFE_NO_PAD.decode(x).map_err(|_| "bad x encoding")?;
            Ok(Some(VerificationKey {
                key: DecodingKey::from_ed_der(&public_bytes),
                algorithm: Algorithm::EdDSA,
            }))
        }
        "RSA" => {
            let (Some(n), Some(e)) = (entry.n, entry.e) else {
                return Err("missing modulus or exponent");
            };
            let key = DecodingKey::from_rsa_components(&n, &e).map_err(|_| "bad RSA components")?;
            Ok(Some(VerificationKey {
                key,
                algorithm: Algorithm::RS256,
            }))
        }
        _ => Ok(None),
    }
}
