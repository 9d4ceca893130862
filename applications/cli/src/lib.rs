//! Strand CLI Library
//!
//! Terminal front end for a Strand music server: listing commands, an
//! interactive shell and a media sink that plays streams through an external
//! command.
//!
//! This library exposes the components for testing purposes.

pub mod config;
pub mod error;
pub mod shell;
pub mod sink;

// Re-export commonly used types for convenience
pub use config::CliConfig;
pub use error::{CliError, Result};
pub use shell::{Flow, Shell, ShellCommand};
pub use sink::CommandSink;
