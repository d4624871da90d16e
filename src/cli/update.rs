//! `mem0 update` command
//!
//! Replaces the text of an existing memory.
//!
//! # Usage
//! ```bash
//! mem0 update f5e54022-0a39-49b2-aed1-8c3fc1c57599 "Likes to play tennis on weekends"
//! mem0 update <id> "New text" --meta updated=true
//! ```

use anyhow::Result;
use clap::Args;

use super::utils::{parse_metadata, print_memory, OutputFormat};
use crate::remote::{CallContext, MemoryApi, UpdateRequest};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Memory id
    pub id: String,

    /// Replacement text
    pub text: String,

    /// Metadata entry (key=value), repeatable
    #[arg(short, long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    /// Output format (table, json, compact)
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

pub async fn run(args: UpdateArgs, api: &dyn MemoryApi, ctx: &CallContext) -> Result<()> {
    let request = UpdateRequest {
        metadata: parse_metadata(&args.metadata)?,
        ..UpdateRequest::new(args.text.as_str())
    };

    let memory = api.update(ctx, &args.id, &request).await?;
    print_memory(&memory, "Updated", args.format)
}
