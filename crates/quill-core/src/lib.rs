//! # Quill Core
//!
//! The domain layer of the Quill blog API.
//! Posts, the mutation rules that keep their ids consistent, and the query
//! engine (search, sort, paginate). No infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod query;

pub use error::{DomainError, RepoError};
