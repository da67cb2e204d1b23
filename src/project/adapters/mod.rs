//! Adapter implementations for project configuration ports.

pub mod local;
pub mod memory;

pub use local::LocalFileConfigSource;
pub use memory::InMemoryConfigSource;
