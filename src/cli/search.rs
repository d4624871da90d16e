//! `mem0 search` command
//!
//! Semantic search over stored memories.
//!
//! # Usage
//! ```bash
//! mem0 search "What are Alex's hobbies?" --user alex
//! mem0 search "diet" --top-k 5 --rerank --format compact
//! ```

use anyhow::Result;
use clap::Args;

use super::utils::{parse_metadata, print_entries, OutputFormat, OwnerArgs};
use crate::remote::{CallContext, MemoryApi, SearchRequest};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Natural-language query
    pub query: String,

    #[command(flatten)]
    pub owner: OwnerArgs,

    /// Maximum results
    #[arg(short = 'k', long)]
    pub top_k: Option<u32>,

    /// Rerank results server-side
    #[arg(long)]
    pub rerank: bool,

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

pub fn build_request(args: &SearchArgs, default_user: Option<&str>) -> Result<SearchRequest> {
    let owner = args.owner.clone().or_default_user(default_user);
    let non_empty = |v: &Vec<String>| (!v.is_empty()).then(|| v.clone());

    Ok(SearchRequest {
        query: args.query.clone(),
        user_id: owner.user,
        agent_id: owner.agent,
        app_id: owner.app,
        run_id: owner.run,
        metadata: parse_metadata(&args.metadata)?,
        top_k: args.top_k,
        fields: non_empty(&args.fields),
        rerank: args.rerank.then_some(true),
        categories: non_empty(&args.categories),
        ..Default::default()
    })
}

pub async fn run(args: SearchArgs, api: &dyn MemoryApi, ctx: &CallContext, default_user: Option<&str>) -> Result<()> {
    let request = build_request(&args, default_user)?;
    let entries = api.search(ctx, &request).await?;
    print_entries(&entries, args.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{parse_command, RecordingApi};
    use crate::cli::Commands;

    fn search_args(argv: &[&str]) -> SearchArgs {
        match parse_command(argv) {
            Commands::Search(args) => args,
            other => panic!("expected search, got {:?}", other),
        }
    }

    #[test]
    fn test_build_request() {
        let args = search_args(&["search", "hobbies", "-k", "5", "--rerank", "--category", "sports"]);
        let req = build_request(&args, Some("alex")).unwrap();

        assert_eq!(req.query, "hobbies");
        assert_eq!(req.top_k, Some(5));
        assert_eq!(req.rerank, Some(true));
        assert_eq!(req.categories, Some(vec!["sports".to_string()]));
        assert!(req.fields.is_none());
        assert_eq!(req.user_id.as_deref(), Some("alex"));
    }

    #[tokio::test]
    async fn test_run_searches_through_api() {
        let api = RecordingApi::default();
        let args = search_args(&["search", "cricket", "--format", "compact"]);

        run(args, &api, &CallContext::background(), None).await.unwrap();
        assert_eq!(api.searched.lock().unwrap()[0].query, "cricket");
    }

    #[tokio::test]
    async fn test_run_rejects_blank_query() {
        let api = RecordingApi::default();
        let args = search_args(&["search", "  "]);

        let err = run(args, &api, &CallContext::background(), None).await.unwrap_err();
        assert!(err.to_string().contains("query"));
        assert!(api.searched.lock().unwrap().is_empty());
    }
}
