//! CLI module - Command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod add;
pub mod config;
pub mod init;
pub mod list;
pub mod py_add;
pub mod search;
pub mod update;
pub mod utils;

#[cfg(test)]
mod testing;

/// mem0 - command-line client for the mem0 memory service
///
/// Store conversations as memories, then list and search them.
#[derive(Parser, Debug)]
#[command(name = "mem0")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log request payloads and response bodies to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "MEM0_CONFIG")]
    pub config: Option<PathBuf>,

    /// Give up on the call after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a config file with API key and default user
    Init(init::InitArgs),

    /// Store messages as memories
    Add(add::AddArgs),

    /// List stored memories
    List(list::ListArgs),

    /// Search memories
    Search(search::SearchArgs),

    /// Replace a memory's text
    Update(update::UpdateArgs),

    /// Store messages through the python mem0 client
    PyAdd(py_add::PyAddArgs),

    /// Get or set configuration
    Config(config::ConfigArgs),
}
