//! Container source implementations

pub mod directory;
pub mod memory;

pub use directory::DirectorySource;
pub use memory::MemorySource;
