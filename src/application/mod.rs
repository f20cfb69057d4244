//! Application services: the resolution and caching policy for status pages.

pub mod cache_control;
pub mod error;
pub mod page;
pub mod repos;
pub mod resolvers;
pub mod shape;
pub mod source;
