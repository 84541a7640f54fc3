//! grafsync server: configuration, logging, the Kubernetes event source and
//! process lifecycle around the grafsync reconcile engine.

pub mod settings;
pub mod source;
pub mod startup;

pub use settings::{Cli, Settings};
