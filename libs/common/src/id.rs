use ulid::Ulid;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = huddle_common::id::prefixed_ulid("prf");
/// assert!(id.starts_with("prf_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}

/// Marker trait for records whose primary key is a prefixed ID.
pub trait PrefixedId {
    const PREFIX: &'static str;

    fn generate_id() -> String {
        prefixed_ulid(Self::PREFIX)
    }
}

/// Well-known ID prefixes.
pub mod prefix {
    pub const PROFILE: &str = "prf";
    pub const SERVER: &str = "srv";
    pub const MEMBER: &str = "mem";
    pub const CHANNEL: &str = "ch";
}
