//! Event sources feeding config objects to the orchestrator

pub mod kubernetes;

pub use kubernetes::{ConfigMapSource, to_config_object};
