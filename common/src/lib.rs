//! Ratebook Common Types
//!
//! This crate contains shared types used across Ratebook, including
//! identifiers, the registered rate entity, conversion arithmetic and the
//! error taxonomy.

pub mod identifiers;
pub mod monetary;
pub mod error;

pub use identifiers::*;
pub use monetary::*;
pub use error::*;
