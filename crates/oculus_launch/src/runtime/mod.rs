//! Runtime components for process management

pub mod executor;
pub mod process;

pub use executor::*;
pub use process::*;
