//! Domain layer types and invariants.

pub mod banners;
pub mod entities;
pub mod error;
pub mod identifier;
