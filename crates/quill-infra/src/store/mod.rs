//! Post store implementations - in-memory and JSON file.

mod json_file;
mod memory;

pub use json_file::{JsonFilePostRepository, LoadOutcome};
pub use memory::InMemoryPostRepository;
