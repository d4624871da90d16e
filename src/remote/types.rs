//! Memory API types
//!
//! DTOs for requests sent to and responses decoded from the memory service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{MemoryError, Result};

/// Free-form metadata attached to a memory. Values keep their JSON type.
pub type Metadata = BTreeMap<String, Value>;

/// Metadata keys that mirror the ownership context of a stored memory.
pub const OWNER_KEYS: [&str; 3] = ["user_id", "agent_id", "run_id"];

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// ============== Messages ==============

/// One turn of conversation submitted when storing a memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

// ============== Responses ==============

/// A single memory as returned by create and update calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    #[serde(default, alias = "text", alias = "content")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Relevance score, present on search results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// ADD / UPDATE / DELETE marker on create responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Memory {
    /// Memory text, or an empty string when the service omitted it
    pub fn text(&self) -> &str {
        self.memory.as_deref().unwrap_or("")
    }

    /// Creation time, if the service sent an RFC 3339 timestamp
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }

    /// Last update time, if the service sent an RFC 3339 timestamp
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.updated_at.as_deref())
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// A memory as returned by list and search calls
///
/// Carries the originating messages and, for list results, aggregate
/// counters about the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    #[serde(flatten)]
    pub memory: Memory,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_memories: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// ============== Store ==============

/// Request to create a memory from conversation messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Response format tag, e.g. "v1.1"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub includes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excludes: Option<String>,
    /// Let the service extract facts from the messages (default on server side)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infer: Option<bool>,
}

impl StoreRequest {
    /// Request owned by a single user
    pub fn for_user(user_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            messages,
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    /// Check the request locally before it is sent
    pub fn validate(&self) -> Result<()> {
        let has_owner = non_empty(&self.user_id).is_some()
            || non_empty(&self.agent_id).is_some()
            || non_empty(&self.run_id).is_some();

        if !has_owner {
            return Err(MemoryError::validation(
                "at least one of user_id, agent_id or run_id is required",
            ));
        }
        if self.messages.is_empty() {
            return Err(MemoryError::validation("at least one message is required"));
        }
        Ok(())
    }

    /// Copy owner identifiers into metadata, keeping any existing keys
    pub fn with_owner_metadata(mut self) -> Self {
        let owners: Vec<(&str, String)> = OWNER_KEYS
            .iter()
            .zip([&self.user_id, &self.agent_id, &self.run_id])
            .filter_map(|(key, value)| non_empty(value).map(|v| (*key, v.to_string())))
            .collect();

        if owners.is_empty() {
            return self;
        }

        let metadata = self.metadata.get_or_insert_with(Metadata::new);
        for (key, value) in owners {
            metadata
                .entry(key.to_string())
                .or_insert(Value::String(value));
        }
        self
    }
}

// ============== List ==============

/// Filters for listing memories; every field is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetOptions {
    pub user_id: Option<String>,
    pub agent_id: Option<String>,
    pub app_id: Option<String>,
    pub run_id: Option<String>,
    pub keywords: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub metadata: Option<Metadata>,
    pub categories: Vec<String>,
    pub fields: Vec<String>,
    pub org_id: Option<String>,
    pub project_id: Option<String>,
}

impl GetOptions {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    /// Encode the filters as query parameters.
    ///
    /// Multi-valued filters repeat their key; metadata is sent as one JSON value.
    pub fn query_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        let mut pairs = Vec::new();

        let single = [
            ("user_id", &self.user_id),
            ("agent_id", &self.agent_id),
            ("app_id", &self.app_id),
            ("run_id", &self.run_id),
            ("keywords", &self.keywords),
            ("org_id", &self.org_id),
            ("project_id", &self.project_id),
        ];
        for (key, value) in single {
            if let Some(v) = non_empty(value) {
                pairs.push((key, v.to_string()));
            }
        }

        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page_size", size.to_string()));
        }
        if let Some(metadata) = self.metadata.as_ref().filter(|m| !m.is_empty()) {
            pairs.push(("metadata", serde_json::to_string(metadata)?));
        }

        pairs.extend(self.categories.iter().map(|c| ("categories", c.clone())));
        pairs.extend(self.fields.iter().map(|f| ("fields", f.clone())));

        Ok(pairs)
    }
}

// ============== Search ==============

/// Semantic search request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(MemoryError::validation("search query must not be empty"));
        }
        Ok(())
    }
}

// ============== Update ==============

/// Replacement text (and optionally metadata) for an existing memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl UpdateRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(MemoryError::validation("replacement text must not be empty"));
        }
        Ok(())
    }
}
