//! Cropdash Client - Adapters for the `RemoteClient` port
//!
//! `HttpRemoteClient` talks to the prediction backend over HTTP;
//! `MemoryRemoteClient` answers from scripted in-process data for development
//! and tests.

pub mod http;
pub mod memory;

pub use http::HttpRemoteClient;
pub use memory::{MemoryRemoteClient, RemoteCall};
