/// Huddle API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. When unset the API runs on the in-memory store.
    pub database_url: Option<String>,
    /// Issuer (`iss`) of session tokens minted by the identity provider.
    pub identity_issuer: String,
    /// Where the identity provider publishes its signing keys.
    pub identity_jwks_url: String,
    /// Expected `aud` claim. Audience is not checked when unset.
    pub identity_audience: Option<String>,
    /// Sign-in page that unauthenticated page visits are sent to.
    pub sign_in_url: String,
    /// Port the HTTP server binds to.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        let identity_issuer = required_var("IDENTITY_ISSUER");
        let identity_jwks_url = optional_var("IDENTITY_JWKS_URL")
            .unwrap_or_else(|| default_jwks_url(&identity_issuer));

        Self {
            database_url: optional_var("DATABASE_URL"),
            identity_issuer,
            identity_jwks_url,
            identity_audience: optional_var("IDENTITY_AUDIENCE"),
            sign_in_url: optional_var("SIGN_IN_URL").unwrap_or_else(|| "/sign-in".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4000),
        }
    }
}

/// `https://issuer.example` → `https://issuer.example/.well-known/jwks.json`
pub fn default_jwks_url(issuer: &str) -> String {
    format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'))
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwks_url_strips_trailing_slash() {
        assert_eq!(
            default_jwks_url("https://id.example.com/"),
            "https://id.example.com/.well-known/jwks.json"
        );
    }
}
