//! Test doubles for command handlers

use std::sync::Mutex;

use async_trait::async_trait;
use clap::Parser;

use super::{Cli, Commands};
use crate::remote::{
    CallContext, GetOptions, Memory, MemoryApi, MemoryEntry, Result, SearchRequest, StoreRequest,
    UpdateRequest,
};

/// Parse `mem0 <argv...>` and return the subcommand
pub fn parse_command(argv: &[&str]) -> Commands {
    let mut full = vec!["mem0"];
    full.extend_from_slice(argv);
    Cli::try_parse_from(full).expect("arguments should parse").command
}

pub fn memory(id: &str, text: &str) -> Memory {
    Memory {
        id: id.to_string(),
        memory: Some(text.to_string()),
        user_id: Some("alex".to_string()),
        agent_id: None,
        app_id: None,
        run_id: None,
        hash: None,
        metadata: None,
        categories: None,
        score: None,
        event: None,
        created_at: None,
        updated_at: None,
    }
}

/// Records every call and answers with canned memories
#[derive(Default)]
pub struct RecordingApi {
    pub stored: Mutex<Vec<StoreRequest>>,
    pub listed: Mutex<Vec<GetOptions>>,
    pub searched: Mutex<Vec<SearchRequest>>,
    pub updated: Mutex<Vec<(String, UpdateRequest)>>,
}

#[async_trait]
impl MemoryApi for RecordingApi {
    async fn store(&self, _ctx: &CallContext, request: StoreRequest) -> Result<Memory> {
        request.validate()?;
        let text = request.messages[0].content.clone();
        self.stored.lock().unwrap().push(request);
        Ok(memory("m-new", &text))
    }

    async fn list(&self, _ctx: &CallContext, options: &GetOptions) -> Result<Vec<MemoryEntry>> {
        self.listed.lock().unwrap().push(options.clone());
        Ok(Vec::new())
    }

    async fn search(&self, _ctx: &CallContext, request: &SearchRequest) -> Result<Vec<MemoryEntry>> {
        request.validate()?;
        self.searched.lock().unwrap().push(request.clone());
        Ok(vec![MemoryEntry {
            memory: memory("m1", "Plays cricket"),
            input: Vec::new(),
            total_memories: None,
            owner: None,
            organization: None,
            kind: None,
        }])
    }

    async fn update(&self, _ctx: &CallContext, memory_id: &str, request: &UpdateRequest) -> Result<Memory> {
        request.validate()?;
        self.updated
            .lock()
            .unwrap()
            .push((memory_id.to_string(), request.clone()));
        Ok(memory(memory_id, &request.text))
    }
}
