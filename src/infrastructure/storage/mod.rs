//! Non-database storage backends

mod memory;

pub use memory::InMemoryUserRepository;
