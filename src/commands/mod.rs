//! CLI commands implementation

pub mod errors;
pub mod index;
pub mod query;
pub mod status;

pub use errors::*;
pub use index::*;
pub use query::*;
pub use status::*;
