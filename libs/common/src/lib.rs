pub mod id;
pub mod invite_code;

pub use id::PrefixedId;
pub use invite_code::generate_invite_code;
