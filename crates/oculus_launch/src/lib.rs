//! Oculus Launch System
//!
//! A ROS2-style launch system for the Oculus multibeam sonar stack.
//!
//! # Overview
//!
//! The crate builds a [`LaunchDescription`] — an ordered, immutable list of
//! process-start directives — and hands it to an [`Executor`] that spawns
//! the processes, forwards their output, and shuts them down in reverse
//! order. The default description starts the sonar driver under the `sonar`
//! namespace with its shipped configuration plus the rqt GUI tools.
//!
//! Package locations are resolved through the [`PackageLocator`] trait, so
//! descriptions can be built against a fake registry in tests:
//!
//! ```no_run
//! use oculus_launch::{default_description, PrefixPathLocator};
//!
//! let locator = PrefixPathLocator::from_env();
//! let description = default_description(&locator)?;
//! println!("{description}");
//! # Ok::<(), oculus_launch::ComposeError>(())
//! ```

pub mod cli;
pub mod composer;
pub mod registry;
pub mod runtime;

pub use cli::LaunchArgs;
pub use composer::{
    default_description, ComposeError, LaunchDescription, OutputSink, ProcessDirective, Remapping,
};
pub use registry::{LocateError, PackageLocator, PrefixPathLocator};
pub use runtime::{
    Executor, ExecutorConfig, ExecutorError, LaunchPlan, ManagedProcess, ProcessConfig,
    ProcessError, ProcessEvent, ProcessStatus,
};
