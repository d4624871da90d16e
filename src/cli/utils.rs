//! CLI utility functions
//!
//! Helpers shared across commands:
//! - owner flags and their config fallback
//! - `key=value` metadata parsing
//! - client construction and result rendering

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Config;
use crate::remote::{Memory, MemoryEntry, Metadata, RemoteMemoryClient};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

/// Who a memory belongs to
#[derive(Args, Debug, Clone, Default)]
pub struct OwnerArgs {
    /// User id (defaults to identity.user_id from config)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Agent id
    #[arg(long)]
    pub agent: Option<String>,

    /// Run id
    #[arg(long)]
    pub run: Option<String>,

    /// App id
    #[arg(long)]
    pub app: Option<String>,
}

impl OwnerArgs {
    /// Fill in the configured user when no owner was given on the command line.
    ///
    /// Owners are user, agent and run, matching what a store accepts. `--app`
    /// only scopes the call, so `--app` alone still gets the configured user.
    pub fn or_default_user(mut self, default_user: Option<&str>) -> Self {
        if self.user.is_none() && self.agent.is_none() && self.run.is_none() {
            self.user = default_user.map(str::to_string);
        }
        self
    }
}

/// Parse repeated `key=value` flags; values are JSON when they parse as JSON
///
/// `--meta turns=3 --meta tags='["a","b"]' --meta source=cli`
pub fn parse_metadata(entries: &[String]) -> Result<Option<Metadata>> {
    if entries.is_empty() {
        return Ok(None);
    }

    let mut metadata = Metadata::new();
    for entry in entries {
        let Some((key, raw)) = entry.split_once('=') else {
            bail!("Invalid metadata '{}': expected key=value", entry);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid metadata '{}': empty key", entry);
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        metadata.insert(key.to_string(), value);
    }
    Ok(Some(metadata))
}

/// Build the HTTP client from config; `debug` forces wire logging on
pub fn connect(config: &Config, debug: bool) -> Result<RemoteMemoryClient> {
    let mut client_config = config.client_config()?;
    if debug {
        client_config = client_config.with_debug(true);
    }
    client_config
        .build()
        .context("Failed to create memory client")
}

/// One table row per memory
#[derive(Tabled)]
struct MemoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Categories")]
    categories: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl MemoryRow {
    fn from_memory(memory: &Memory) -> Self {
        let owner = memory
            .user_id
            .as_deref()
            .or(memory.agent_id.as_deref())
            .or(memory.run_id.as_deref())
            .unwrap_or("-");

        Self {
            id: memory.id.clone(),
            memory: truncate(memory.text(), 60),
            owner: owner.to_string(),
            categories: memory
                .categories
                .as_ref()
                .map(|c| c.join(", "))
                .unwrap_or_default(),
            created: memory
                .created_at_utc()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .or_else(|| memory.created_at.clone())
                .unwrap_or_default(),
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", head)
}

/// Print list/search results
pub fn print_entries(entries: &[MemoryEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entries)?),
        OutputFormat::Compact => {
            for entry in entries {
                match entry.memory.score {
                    Some(score) => println!("{}\t{:.2}\t{}", entry.memory.id, score, entry.memory.text()),
                    None => println!("{}\t{}", entry.memory.id, entry.memory.text()),
                }
            }
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No memories found.");
                return Ok(());
            }
            let rows = entries.iter().map(|e| MemoryRow::from_memory(&e.memory));
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
            println!("\n{} memory(ies)", entries.len());
        }
    }
    Ok(())
}

/// Print a single stored or updated memory
pub fn print_memory(memory: &Memory, verb: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(memory)?),
        OutputFormat::Compact => println!("{}\t{}", memory.id, memory.text()),
        OutputFormat::Table => {
            println!("{} {} memory: {}", "✓".green(), verb, memory.id.cyan().bold());
            if !memory.text().is_empty() {
                println!("  {}", memory.text());
            }
            if let Some(metadata) = memory.metadata.as_ref().filter(|m| !m.is_empty()) {
                println!("  {} {}", "metadata:".dimmed(), serde_json::to_string(metadata)?);
            }
        }
    }
    Ok(())
}
