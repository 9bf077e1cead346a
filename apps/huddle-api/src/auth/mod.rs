pub mod jwks;
pub mod middleware;
pub mod session;
