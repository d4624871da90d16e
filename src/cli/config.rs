//! `mem0 config` command
//!
//! Get or set configuration values in the TOML config file.
//!
//! # Usage
//! ```bash
//! mem0 config                          # Show the config file
//! mem0 config api.base_url             # Get a value
//! mem0 config identity.user_id alex    # Set a value
//! mem0 config headers.send_user_id false
//! mem0 config --path                   # Show which file is used
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use toml_edit::DocumentMut;

use crate::config::Config;

/// Keys whose values are masked when printed
const SECRET_KEYS: [&str; 1] = ["api.api_key"];

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config key in section.key form (e.g. api.base_url)
    pub key: Option<String>,

    /// Value to set
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Print secrets instead of masking them
    #[arg(long)]
    pub show_secrets: bool,
}

/// Config file the command reads and writes
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => Config::global_config_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot locate home directory; pass --config")),
    }
}

pub fn run(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(explicit)?;

    if args.path {
        let state = if config_path.exists() { "exists" } else { "not created yet" };
        println!("{} ({})", config_path.display(), state);
        return Ok(());
    }

    let Some(key) = args.key.as_deref() else {
        return show_file(&config_path, args.show_secrets);
    };

    match args.value.as_deref() {
        Some(value) => {
            set_config_value(&config_path, key, value)?;
            println!("{} Set {} in {}", "✓".green(), key.cyan(), config_path.display());
        }
        None => match get_config_value(&config_path, key)? {
            Some(v) if SECRET_KEYS.contains(&key) && !args.show_secrets => println!("{}", mask(&v)),
            Some(v) => println!("{}", v),
            None => println!("(not set)"),
        },
    }

    Ok(())
}

fn show_file(path: &Path, show_secrets: bool) -> Result<()> {
    if !path.exists() {
        println!("No config file at {}", path.display());
        println!("\nCreate one with:\n  mem0 init");
        return Ok(());
    }

    let mut doc = read_document(path)?;
    if !show_secrets {
        for key in SECRET_KEYS {
            if let Some((section, name)) = key.split_once('.') {
                let masked = doc
                    .get(section)
                    .and_then(|t| t.get(name))
                    .and_then(|v| v.as_str())
                    .map(mask);
                if let Some(masked) = masked {
                    doc[section][name] = toml_edit::value(masked);
                }
            }
        }
    }

    println!("{}\n", path.display().to_string().dimmed());
    println!("{}", doc);
    Ok(())
}

fn read_document(path: &Path) -> Result<DocumentMut> {
    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    content
        .parse()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    match key.split_once('.') {
        Some((section, name)) if !section.is_empty() && !name.is_empty() && !name.contains('.') => {
            Ok((section, name))
        }
        _ => bail!("Invalid key '{}': expected section.key (e.g. api.base_url)", key),
    }
}

/// Set `section.key`, keeping the rest of the file's formatting
pub fn set_config_value(path: &Path, key: &str, raw: &str) -> Result<()> {
    let (section, name) = split_key(key)?;
    let mut doc = read_document(path)?;

    if doc.get(section).is_none() {
        doc[section] = toml_edit::table();
    }
    doc[section][name] = toml_edit::Item::Value(parse_toml_value(raw));

    // Reject edits that would leave an unloadable file
    toml::from_str::<Config>(&doc.to_string())
        .with_context(|| format!("'{}' is not a valid value for {}", raw, key))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;
    Ok(())
}

/// Get `section.key` as display text
pub fn get_config_value(path: &Path, key: &str) -> Result<Option<String>> {
    let (section, name) = split_key(key)?;
    if !path.exists() {
        return Ok(None);
    }

    let doc = read_document(path)?;
    Ok(doc
        .get(section)
        .and_then(|t| t.get(name))
        .and_then(|item| item.as_value())
        .map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string().trim().to_string(),
        }))
}

fn parse_toml_value(raw: &str) -> toml_edit::Value {
    match raw {
        "true" => true.into(),
        "false" => false.into(),
        _ => match raw.parse::<i64>() {
            Ok(i) => i.into(),
            Err(_) => raw.into(),
        },
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}
