//! mem0-client - client for the mem0 memory REST API
//!
//! Stores conversations as memories, lists them with filters and paging,
//! searches them semantically and edits them.
//!
//! ## Key Concepts
//!
//! - **Memory**: a fact the service extracted from stored messages
//! - **Owner**: `user_id`, `agent_id` or `run_id`; every store needs one.
//!   `app_id` narrows the scope but does not count as an owner
//! - **Call context**: each request runs under a [`CallContext`] that can be
//!   cancelled or given a deadline
//!
//! ```no_run
//! use mem0_client::{CallContext, ClientConfig, Message, StoreRequest};
//!
//! # async fn demo() -> mem0_client::remote::Result<()> {
//! let client = ClientConfig::new("m0-...").with_user_id("alex").build()?;
//! let request = StoreRequest::for_user("alex", vec![Message::user("I'm a vegetarian")]);
//! let stored = client.store(&CallContext::background(), request).await?;
//! println!("stored {}: {}", stored.id, stored.text());
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod cli;
pub mod config;
pub mod remote;

pub use bridge::PythonBridge;
pub use remote::{
    CallContext, ClientConfig, MemoryApi, MemoryError, Message, RemoteMemoryClient, StoreRequest,
};
