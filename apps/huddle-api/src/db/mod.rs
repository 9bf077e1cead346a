pub mod memory;
pub mod pg;
pub mod schema;
pub mod store;
