//! Configuration for the log indexer: command line, environment, and wiring.

pub mod cli;
pub mod dependencies;
pub mod settings;

pub use cli::{Cli, SourceMode};
pub use dependencies::{Dependencies, PipelinePlan};
pub use settings::Settings;
