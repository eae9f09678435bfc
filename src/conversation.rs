//! Conversation history storage.
//!
//! The chat core only sees the [`ConversationStore`] trait: it appends user
//! and assistant text turns and reads them back as canonical [`Message`]s.
//! Native tool-call turns never reach the store.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{Message, Role};

/// On-disk schema version for [`PersistedHistory`].
const HISTORY_FILE_VERSION: u32 = 1;
const HISTORY_FILE_NAME: &str = "history.json";

/// One persisted conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Append time in Unix epoch milliseconds.
    pub timestamp_millis: u64,
}

impl StoredMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            role,
            content: content.into(),
            timestamp_millis: now_unix_millis(),
        }
    }

    pub fn to_message(&self) -> Message {
        Message {
            role: self.role,
            content: Some(self.content.clone()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// Append-mostly message storage owned by the caller.
pub trait ConversationStore: Send {
    fn append(&mut self, role: Role, content: &str) -> Result<StoredMessage, String>;
    /// All messages, oldest first.
    fn list(&self) -> Result<Vec<StoredMessage>, String>;
    /// Remove one message. Returns whether it existed.
    fn delete(&mut self, id: &str) -> Result<bool, String>;
    fn clear(&mut self) -> Result<(), String>;
}

/// Stored history as canonical messages, ready for a chat request.
pub fn history_messages(store: &dyn ConversationStore) -> Result<Vec<Message>, String> {
    Ok(store.list()?.iter().map(StoredMessage::to_message).collect())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store for one-shot runs and tests.
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    messages: Vec<StoredMessage>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryConversationStore {
    fn append(&mut self, role: Role, content: &str) -> Result<StoredMessage, String> {
        let message = StoredMessage::new(role, content);
        self.messages.push(message.clone());
        Ok(message)
    }

    fn list(&self) -> Result<Vec<StoredMessage>, String> {
        Ok(self.messages.clone())
    }

    fn delete(&mut self, id: &str) -> Result<bool, String> {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        Ok(self.messages.len() != before)
    }

    fn clear(&mut self) -> Result<(), String> {
        self.messages.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// On-disk payload shape for persisted history.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedHistory {
    version: u32,
    messages: Vec<StoredMessage>,
}

/// Single-file JSON store; every mutation rewrites the file.
#[derive(Debug)]
pub struct JsonConversationStore {
    path: PathBuf,
    messages: Vec<StoredMessage>,
}

impl JsonConversationStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, String> {
        let path = path.into();
        let messages = match fs::read_to_string(&path) {
            Ok(raw) => {
                let payload: PersistedHistory = serde_json::from_str(&raw)
                    .map_err(|e| format!("failed to parse history {}: {e}", path.display()))?;
                if payload.version != HISTORY_FILE_VERSION {
                    return Err(format!(
                        "unsupported history file version {} for {}",
                        payload.version,
                        path.display()
                    ));
                }
                payload.messages
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(format!("failed to read history {}: {e}", path.display())),
        };
        Ok(Self { path, messages })
    }

    /// Open the per-user history file.
    pub fn open_default() -> Result<Self, String> {
        Self::open(default_history_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
        let payload = PersistedHistory {
            version: HISTORY_FILE_VERSION,
            messages: self.messages.clone(),
        };
        let json = serde_json::to_vec_pretty(&payload)
            .map_err(|e| format!("failed to serialize history: {e}"))?;
        // Write a sibling temp file first so a crash keeps the last good copy.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| {
            format!(
                "failed to write temporary history file {}: {e}",
                tmp_path.display()
            )
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            format!(
                "failed to move history file into place {}: {e}",
                self.path.display()
            )
        })
    }
}

impl ConversationStore for JsonConversationStore {
    fn append(&mut self, role: Role, content: &str) -> Result<StoredMessage, String> {
        let message = StoredMessage::new(role, content);
        self.messages.push(message.clone());
        if let Err(err) = self.persist() {
            self.messages.pop();
            return Err(err);
        }
        Ok(message)
    }

    fn list(&self) -> Result<Vec<StoredMessage>, String> {
        Ok(self.messages.clone())
    }

    fn delete(&mut self, id: &str) -> Result<bool, String> {
        let Some(index) = self.messages.iter().position(|m| m.id == id) else {
            return Ok(false);
        };
        self.messages.remove(index);
        self.persist()?;
        Ok(true)
    }

    fn clear(&mut self) -> Result<(), String> {
        self.messages.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!(
                "failed to remove history {}: {e}",
                self.path.display()
            )),
        }
    }
}

/// `<data dir>/chatwire/history.json`, or `./.chatwire/history.json`.
pub fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("chatwire"))
        .unwrap_or_else(|| PathBuf::from(".chatwire"))
        .join(HISTORY_FILE_NAME)
}

/// Current Unix timestamp in milliseconds.
fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Generate an opaque hex message id (`xxxx-xxxx-xxxx-xxxx`).
fn generate_message_id() -> String {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    let hex = format!("{:016x}", u64::from_be_bytes(bytes));
    format!(
        "{}-{}-{}-{}",
        &hex[0..4],
        &hex[4..8],
        &hex[8..12],
        &hex[12..16]
    )
}
