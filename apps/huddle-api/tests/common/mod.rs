#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::Router;
use axum_test::TestServer;
use ed25519_dalek::{SigningKey, VerifyingKey};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use sha2::{Digest, Sha256};

use huddle_api::auth::jwks::JwksClient;
use huddle_api::config::Config;
use huddle_api::db::memory::MemoryStore;
use huddle_api::models::profile::Profile;
use huddle_api::AppState;

pub const TEST_ISSUER: &str = "https://identity.test";
pub const TEST_SIGN_IN_URL: &str = "/sign-in";

/// Identity provider signing keys derived from a fixed seed.
pub struct TestSigningKeys {
    pub kid: String,
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl TestSigningKeys {
    pub fn from_seed(seed: &str) -> Self {
        let hash = Sha256::digest(seed.as_bytes());
        let mut secret_bytes = [0u8; 32];
        secret_bytes.copy_from_slice(&hash);

        let signing_key = SigningKey::from_bytes(&secret_bytes);
        let verifying_key: VerifyingKey = (&signing_key).into();

        let pkcs8_der = wrap_ed25519_private_pkcs8(&signing_key.to_bytes());
        let public_bytes = verifying_key.to_bytes();

        let kid_hash = Sha256::digest(public_bytes);
        let kid = format!(
            "idp-{}",
            kid_hash
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<String>()[..8]
                .to_string()
        );

        Self {
            kid,
            encoding: EncodingKey::from_ed_der(&pkcs8_der),
            decoding: DecodingKey::from_ed_der(&public_bytes),
        }
    }
}

fn wrap_ed25519_private_pkcs8(secret: &[u8; 32]) -> Vec<u8> {
    let mut der = Vec::with_capacity(48);
    der.extend_from_slice(&[0x30, 0x2e]);
    der.extend_from_slice(&[0x02, 0x01, 0x00]);
    der.extend_from_slice(&[0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70]);
    der.extend_from_slice(&[0x04, 0x22, 0x04, 0x20]);
    der.extend_from_slice(secret);
    der
}

#[derive(Debug, Serialize)]
struct TestSessionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    iat: i64,
    exp: i64,
    name: &'a str,
    email: String,
}

/// Mint a session token the way the identity provider would.
pub fn mint_session(keys: &TestSigningKeys, issuer: &str, sub: &str, name: &str, ttl_secs: i64) -> String {
    let now = chrono::Utc::now();
    let claims = TestSessionClaims {
        iss: issuer,
        sub,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::seconds(ttl_secs)).timestamp(),
        name,
        email: format!("{name}@example.com"),
    };

    let mut header = Header::new(Algorithm::EdDSA);
    header.kid = Some(keys.kid.clone());

    jsonwebtoken::encode(&header, &claims, &keys.encoding).expect("mint test session")
}

pub fn session_token(keys: &TestSigningKeys, sub: &str, name: &str) -> String {
    mint_session(keys, TEST_ISSUER, sub, name, 300)
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        identity_issuer: TEST_ISSUER.to_string(),
        identity_jwks_url: huddle_api::config::default_jwks_url(TEST_ISSUER),
        identity_audience: None,
        sign_in_url: TEST_SIGN_IN_URL.to_string(),
        port: 0,
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub keys: TestSigningKeys,
}

/// Build the full application router on an in-memory store with a static JWKS key.
pub fn test_app() -> TestApp {
    let keys = TestSigningKeys::from_seed("huddle-test-seed");
    let jwks = JwksClient::with_static_key(&keys.kid, keys.decoding.clone(), Algorithm::EdDSA);
    let store = Arc::new(MemoryStore::new());

    let state = AppState {
        store: store.clone(),
        jwks,
        config: Arc::new(test_config()),
    };

    let app: Router = huddle_api::routes::router().with_state(state.clone());
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        state,
        store,
        keys,
    }
}

impl TestApp {
    /// Sign in as `sub` and create their profile. Returns the bearer token and profile.
    pub async fn sign_in(&self, sub: &str, name: &str) -> (String, Profile) {
        let token = session_token(&self.keys, sub, name);
        let resp = self
            .server
            .post("/api/profile")
            .add_header(AUTHORIZATION, format!("Bearer {token}"))
            .await;
        resp.assert_status_ok();

        let profile = self
            .store
            .profile(sub)
            .expect("profile stored after sign-in");
        (token, profile)
    }

    /// Create a server owned by the bearer of `token`.
    pub async fn create_server(&self, token: &str, name: &str) -> serde_json::Value {
        let resp = self
            .server
            .post("/api/servers")
            .add_header(AUTHORIZATION, format!("Bearer {token}"))
            .json(&serde_json::json!({
                "name": name,
                "imageUrl": format!("https://img.example/{name}.png"),
            }))
            .await;
        resp.assert_status(axum::http::StatusCode::CREATED);
        resp.json()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn location(resp: &axum_test::TestResponse) -> String {
    resp.header("location").to_str().unwrap().to_string()
}

/// `DATABASE_URL` pointed at the `_test` database, or `None` when it is unset.
///
/// Run `huddle-migrate --test` first.
pub fn test_database_url() -> Option<String> {
    let _ = dotenvy::dotenv();
    let url = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty())?;
    Some(with_test_db_suffix(&url))
}

fn with_test_db_suffix(database_url: &str) -> String {
    let (base, query) = match database_url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (database_url, None),
    };

    let Some((prefix, db_name)) = base.rsplit_once('/') else {
        return database_url.to_string();
    };
    if db_name.is_empty() || db_name.ends_with("_test") {
        return database_url.to_string();
    }

    match query {
        Some(query) => format!("{prefix}/{db_name}_test?{query}"),
        None => format!("{prefix}/{db_name}_test"),
    }
}
