//! `mem0 init` command
//!
//! Writes a config file with the API key and a default user id.
//!
//! # Usage
//! ```bash
//! mem0 init                                   # Interactive prompts
//! mem0 init --api-key m0-... --user-id alex   # No prompts for given values
//! mem0 init --non-interactive --api-key m0-... # Generate a user id
//! ```

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};
use ulid::Ulid;

use super::config::resolve_path;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// API key (prompted for when omitted)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Default user id (a generated id is offered when omitted)
    #[arg(long)]
    pub user_id: Option<String>,

    /// Organization id
    #[arg(long)]
    pub org_id: Option<String>,

    /// Project id
    #[arg(long)]
    pub project_id: Option<String>,

    /// API root (defaults to the hosted service)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Never prompt; fail when the API key is missing
    #[arg(long)]
    pub non_interactive: bool,

    /// Overwrite an existing config file
    #[arg(short, long)]
    pub force: bool,
}

/// A fresh user id, e.g. `user-01hq3k2jn5...`
pub fn generate_user_id() -> String {
    format!("user-{}", Ulid::new().to_string().to_lowercase())
}

pub fn run(args: InitArgs, explicit: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(explicit)?;

    if config_path.exists() && !args.force {
        bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let api_key = match (args.api_key, args.non_interactive) {
        (Some(key), _) => key,
        (None, true) => bail!("--api-key is required with --non-interactive"),
        (None, false) => Password::new().with_prompt("mem0 API key").interact()?,
    };
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let user_id = match (args.user_id, args.non_interactive) {
        (Some(user), _) => user,
        (None, true) => generate_user_id(),
        (None, false) => Input::<String>::new()
            .with_prompt("Default user id")
            .default(generate_user_id())
            .interact_text()?,
    };

    let mut config = Config::default();
    config.api.api_key = Some(api_key);
    if let Some(url) = args.base_url {
        config.api.base_url = url;
    }
    config.identity.user_id = Some(user_id.clone());
    config.identity.organization_id = args.org_id;
    config.identity.project_id = args.project_id;

    // Fail before writing if the settings cannot produce a client
    config.client_config()?.build()?;

    config.save_to(&config_path)?;

    println!("{} Wrote {}", "✓".green(), config_path.display());
    println!("  User: {}", user_id.cyan());
    println!("\nNext steps:");
    println!("  mem0 add \"I'm a vegetarian\"");
    println!("  mem0 search \"diet\"");
    println!("  mem0 list");

    Ok(())
}
