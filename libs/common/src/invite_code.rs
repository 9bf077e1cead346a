//! Invite code generation.

use rand::Rng;

/// Length of a generated invite code.
pub const INVITE_CODE_LEN: usize = 8;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random alphanumeric invite code.
///
/// Codes are opaque to the rest of the system. Two servers never share a code: the store
/// rejects a taken code and callers retry with a fresh one.
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
