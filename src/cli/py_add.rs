//! `mem0 py-add` command
//!
//! Stores messages through the official Python client instead of the HTTP
//! client. Needs `python3` with the `mem0ai` package installed.
//!
//! # Usage
//! ```bash
//! mem0 py-add "Hi, I'm Alex. I'm a vegetarian." "Hello Alex!" --user alex
//! mem0 py-add "Likes cricket" --python ~/.venvs/mem0/bin/python
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::bridge::PythonBridge;
use crate::config::Config;
use crate::remote::{CallContext, Message};

#[derive(Args, Debug)]
pub struct PyAddArgs {
    /// Message contents; roles alternate user/assistant
    #[arg(required = true)]
    pub messages: Vec<String>,

    /// User id (defaults to identity.user_id from config)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Python interpreter (overrides bridge.python)
    #[arg(long)]
    pub python: Option<String>,
}

fn conversation(contents: &[String]) -> Vec<Message> {
    contents
        .iter()
        .enumerate()
        .map(|(i, content)| match i % 2 {
            0 => Message::user(content.as_str()),
            _ => Message::assistant(content.as_str()),
        })
        .collect()
}

pub async fn run(args: PyAddArgs, config: &Config, ctx: &CallContext) -> Result<()> {
    let api_key = config.require_api_key()?;
    let user = args
        .user
        .as_deref()
        .or(config.identity.user_id.as_deref())
        .ok_or_else(|| anyhow::anyhow!("User id is required. Use --user or set identity.user_id"))?;
    let python = args.python.as_deref().unwrap_or(&config.bridge.python);

    let bridge = PythonBridge::new(api_key).with_interpreter(python);
    let messages = conversation(&args.messages);

    let out = bridge
        .store(ctx, &messages, user)
        .await
        .context("Failed to store memory through python")?;

    println!("{} Stored {} message(s) for {}", "✓".green(), messages.len(), user.cyan());
    print!("{}", out.output);
    Ok(())
}
