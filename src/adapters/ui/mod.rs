//! Console output at startup.

pub mod banner;

pub use banner::print_welcome;
