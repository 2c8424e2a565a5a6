//! Shared data model for mapscript event tables.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_map};
