//! From command line tokens to written artifacts.
//!
//! [`RuntimeBuilder`] parses the tokens into an [`ExecutableConfiguration`];
//! [`ExecutionRuntime`] consumes it, runs the generators one after another
//! and returns a [`RunReport`].

mod builder;
mod execute;

pub use builder::{ExecutableConfiguration, GeneratorTask, RuntimeBuilder};
pub use execute::{ExecutionRuntime, GeneratorReport, RunReport};
