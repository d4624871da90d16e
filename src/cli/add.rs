//! `mem0 add` command
//!
//! Stores a memory from one or more messages.
//!
//! # Usage
//! ```bash
//! mem0 add "I'm a vegetarian and allergic to nuts" --user alex
//! mem0 add "Hi" "Hello Alex!" --conversation --user alex
//! mem0 add "Prefers dark mode" --agent ui-bot --meta source=settings
//! ```

use anyhow::Result;
use clap::Args;

use super::utils::{parse_metadata, print_memory, OutputFormat, OwnerArgs};
use crate::remote::{CallContext, MemoryApi, Message, StoreRequest};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Message contents, one message per argument
    #[arg(required = true)]
    pub messages: Vec<String>,

    /// Role of the messages
    #[arg(long, default_value = "user")]
    pub role: String,

    /// Alternate user/assistant roles, starting with user
    #[arg(long, conflicts_with = "role")]
    pub conversation: bool,

    #[command(flatten)]
    pub owner: OwnerArgs,

    /// Metadata entry (key=value), repeatable
    #[arg(short, long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    /// Store the messages verbatim instead of extracting facts
    #[arg(long)]
    pub no_infer: bool,

    /// Response format tag sent to the API (e.g. v1.1)
    #[arg(long)]
    pub output_format: Option<String>,

    /// Output format (table, json, compact)
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Turn command-line arguments into a store request
pub fn build_request(args: &AddArgs, default_user: Option<&str>) -> Result<StoreRequest> {
    let messages = args
        .messages
        .iter()
        .enumerate()
        .map(|(i, content)| {
            let role = match (args.conversation, i % 2) {
                (true, 0) => "user",
                (true, _) => "assistant",
                (false, _) => args.role.as_str(),
            };
            Message::new(role, content.as_str())
        })
        .collect();

    let owner = args.owner.clone().or_default_user(default_user);

    Ok(StoreRequest {
        messages,
        user_id: owner.user,
        agent_id: owner.agent,
        run_id: owner.run,
        app_id: owner.app,
        metadata: parse_metadata(&args.metadata)?,
        output_format: args.output_format.clone(),
        infer: args.no_infer.then_some(false),
        ..Default::default()
    })
}

pub async fn run(args: AddArgs, api: &dyn MemoryApi, ctx: &CallContext, default_user: Option<&str>) -> Result<()> {
    let request = build_request(&args, default_user)?;
    let memory = api.store(ctx, request).await?;
    print_memory(&memory, "Stored", args.format)
}
