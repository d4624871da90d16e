//! `mem0 list` command
//!
//! Lists stored memories with optional filters.
//!
//! # Usage
//! ```bash
//! mem0 list --user alex
//! mem0 list --keywords cricket --page 2 --page-size 20
//! mem0 list --category food --category health --format json
//! ```

use anyhow::Result;
use clap::Args;

use super::utils::{parse_metadata, print_entries, OutputFormat, OwnerArgs};
use crate::remote::{CallContext, GetOptions, MemoryApi};

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub owner: OwnerArgs,

    /// Only memories containing these keywords
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u32>,

    /// Results per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Category filter, repeatable
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Fields to return, repeatable
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Metadata filter (key=value), repeatable
    #[arg(short, long = "meta", value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    /// Output format (table, json, compact)
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

pub fn build_options(args: &ListArgs, default_user: Option<&str>) -> Result<GetOptions> {
    let owner = args.owner.clone().or_default_user(default_user);

    Ok(GetOptions {
        user_id: owner.user,
        agent_id: owner.agent,
        app_id: owner.app,
        run_id: owner.run,
        keywords: args.keywords.clone(),
        page: args.page,
        page_size: args.page_size,
        metadata: parse_metadata(&args.metadata)?,
        categories: args.categories.clone(),
        fields: args.fields.clone(),
        ..Default::default()
    })
}

pub async fn run(args: ListArgs, api: &dyn MemoryApi, ctx: &CallContext, default_user: Option<&str>) -> Result<()> {
    let options = build_options(&args, default_user)?;
    let entries = api.list(ctx, &options).await?;
    print_entries(&entries, args.format)
}
