//! Middleware and request extractors.

pub mod auth;
pub mod cors;
pub mod error;
pub mod rate_limit;
