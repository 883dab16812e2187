//! gridsched-api — the scheduler data model shared by the framework and
//! its plugins.
//!
//! Nodes carry a [`ResourceUsage`] snapshot written by the metrics cache;
//! plugins only read it. Raw plugin configuration arrives as
//! [`Arguments`], a loosely typed key/value map that each plugin decodes
//! into its own strongly typed configuration.

pub mod arguments;
pub mod error;
pub mod types;

pub use arguments::Arguments;
pub use error::FitError;
pub use types::*;
