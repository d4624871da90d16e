//! Python bridge
//!
//! Stores memories through the official Python `mem0` package by running an
//! external interpreter. Messages travel through a temporary JSON file; the
//! API key and user id travel through the child's environment.
//!
//! # Usage
//! ```no_run
//! # async fn demo() -> mem0_client::remote::Result<()> {
//! use mem0_client::bridge::PythonBridge;
//! use mem0_client::remote::{CallContext, Message};
//!
//! let bridge = PythonBridge::new("m0-key");
//! let out = bridge
//!     .store(&CallContext::background(), &[Message::user("I'm allergic to nuts")], "alex")
//!     .await?;
//! println!("{}", out.output);
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::remote::{CallContext, MemoryError, Message, Result};

/// Interpreter used unless configured otherwise
pub const DEFAULT_INTERPRETER: &str = "python3";

pub const ENV_MESSAGES_FILE: &str = "MESSAGES_FILE";
pub const ENV_API_KEY: &str = "MEM0_API_KEY";
pub const ENV_USER_ID: &str = "USER_ID";

/// Script run with `<interpreter> -c`; prints the client result as JSON
pub const STORE_SCRIPT: &str = r#"
import json
import os
from mem0 import MemoryClient

with open(os.environ["MESSAGES_FILE"], "r") as f:
    messages = json.load(f)

client = MemoryClient(api_key=os.environ["MEM0_API_KEY"])
result = client.add(messages, user_id=os.environ["USER_ID"])
print(json.dumps(result, default=str))
"#;

/// Captured output of a successful bridge run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOutput {
    /// stdout followed by stderr
    pub output: String,
}

impl BridgeOutput {
    /// Last non-empty output line parsed as JSON, if it is JSON
    pub fn json(&self) -> Option<serde_json::Value> {
        self.output
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .and_then(|line| serde_json::from_str(line).ok())
    }
}

/// Runs the Python `mem0` client in a child process
#[derive(Debug, Clone)]
pub struct PythonBridge {
    interpreter: PathBuf,
    script: String,
    api_key: String,
}

impl PythonBridge {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            script: STORE_SCRIPT.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Replace the inline script passed with `-c`
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    /// Store `messages` for `user_id`. Non-zero exit is an error carrying the
    /// captured output.
    pub async fn store(&self, ctx: &CallContext, messages: &[Message], user_id: &str) -> Result<BridgeOutput> {
        if self.api_key.trim().is_empty() {
            return Err(MemoryError::validation("MEM0_API_KEY is not set"));
        }
        if user_id.trim().is_empty() {
            return Err(MemoryError::validation("user id is required"));
        }
        if messages.is_empty() {
            return Err(MemoryError::validation("at least one message is required"));
        }

        // Removed when dropped at the end of this call
        let mut messages_file = tempfile::Builder::new()
            .prefix("messages")
            .suffix(".json")
            .tempfile()?;
        serde_json::to_writer(&mut messages_file, messages)?;
        messages_file.flush()?;

        debug!(
            interpreter = %self.interpreter.display(),
            file = %messages_file.path().display(),
            "running python bridge"
        );

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg("-c")
            .arg(&self.script)
            .env(ENV_MESSAGES_FILE, messages_file.path())
            .env(ENV_API_KEY, &self.api_key)
            .env(ENV_USER_ID, user_id)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = ctx
            .guard(async { cmd.output().await.map_err(MemoryError::from) })
            .await?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(MemoryError::Bridge {
                status: output.status.to_string(),
                output: combined,
            });
        }

        debug!(bytes = combined.len(), "python bridge finished");
        Ok(BridgeOutput { output: combined })
    }
}
