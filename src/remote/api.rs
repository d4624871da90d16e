//! Backend trait for memory operations

use async_trait::async_trait;

use super::client::RemoteMemoryClient;
use super::context::CallContext;
use super::error::Result;
use super::types::*;

/// The four memory operations, as seen by callers that should not depend on
/// the HTTP client directly (CLI handlers, tests).
#[async_trait]
pub trait MemoryApi: Send + Sync {
    /// Store a memory built from conversation messages
    async fn store(&self, ctx: &CallContext, request: StoreRequest) -> Result<Memory>;

    /// List memories matching the filters
    async fn list(&self, ctx: &CallContext, options: &GetOptions) -> Result<Vec<MemoryEntry>>;

    /// Semantic search
    async fn search(&self, ctx: &CallContext, request: &SearchRequest) -> Result<Vec<MemoryEntry>>;

    /// Replace the text of a memory
    async fn update(&self, ctx: &CallContext, memory_id: &str, request: &UpdateRequest) -> Result<Memory>;
}

#[async_trait]
impl MemoryApi for RemoteMemoryClient {
    async fn store(&self, ctx: &CallContext, request: StoreRequest) -> Result<Memory> {
        RemoteMemoryClient::store(self, ctx, request).await
    }

    async fn list(&self, ctx: &CallContext, options: &GetOptions) -> Result<Vec<MemoryEntry>> {
        RemoteMemoryClient::list(self, ctx, options).await
    }

    async fn search(&self, ctx: &CallContext, request: &SearchRequest) -> Result<Vec<MemoryEntry>> {
        RemoteMemoryClient::search(self, ctx, request).await
    }

    async fn update(&self, ctx: &CallContext, memory_id: &str, request: &UpdateRequest) -> Result<Memory> {
        RemoteMemoryClient::update(self, ctx, memory_id, request).await
    }
}
