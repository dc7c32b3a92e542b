//! User repository implementations.

mod memory;

pub use memory::InMemoryUserRepository;
