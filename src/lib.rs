pub mod config;
pub mod error;
pub mod inference;
pub mod labels;
pub mod model;
pub mod preprocessing;
pub mod server;
pub mod users;

// Re-export common types
pub use error::{CredentialError, DecodeError, PipelineError, ReduceError};
