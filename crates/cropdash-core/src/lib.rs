//! Cropdash Core - Domain models, configuration, and the remote port
//!
//! This crate contains the domain types shared by the crop advisory client and
//! the `RemoteClient` port that every orchestration component talks through.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{AdvisoryError, Result};
pub use ports::RemoteClient;
