//! Memory API client module
//!
//! Provides the HTTP client for the hosted mem0 memory service.

mod api;
mod client;
mod context;
mod decode;
mod error;
mod types;

#[cfg(test)]
mod client_tests;

pub use api::MemoryApi;
pub use client::{
    ClientConfig, HeaderToggles, RemoteMemoryClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
    HEADER_ORGANIZATION_ID, HEADER_PROJECT_ID, HEADER_USER_ID,
};
pub use context::CallContext;
pub use error::{ApiError, ErrorMessage, MemoryError, Result};
pub use types::*;
