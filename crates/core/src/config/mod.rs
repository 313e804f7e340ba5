//! Configuration loading and schema definitions
//!
//! Settings shared by the CLI and the configuration pass.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
