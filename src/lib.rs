//! Birdhouse: a server-rendered status board whose pages resolve through a
//! pluggable upstream and carry CDN stale-while-revalidate headers.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
