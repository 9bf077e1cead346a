pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod invite;
pub mod modal;
pub mod models;
pub mod outcome;
pub mod routes;
pub mod sidebar;

use std::sync::Arc;

use auth::jwks::JwksClient;
use config::Config;
use db::store::Store;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwks: JwksClient,
    pub config: Arc<Config>,
}
