//! Built-in key-value backends.

mod memory;

pub use memory::InMemoryKvStore;
