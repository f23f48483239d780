//! Launch description construction

mod default_launch;
mod description;

pub use default_launch::*;
pub use description::*;
