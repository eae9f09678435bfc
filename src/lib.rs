//! chatwire: one chat client for OpenAI, Anthropic and Gemini endpoints.
//!
//! Conversations are kept in a canonical [`types::Message`] form and
//! translated per request by a provider adapter. Tool calls from any provider
//! come back as [`types::ToolCall`]s; the [`agent::Agent`] executes them and
//! feeds results back in the provider's own continuation format.
//!
//! # Quick start
//!
//! ```no_run
//! use chatwire::agent::Agent;
//! use chatwire::config::load_config;
//! use chatwire::conversation::MemoryConversationStore;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let mut agent = Agent::new(config, Box::new(MemoryConversationStore::new()));
//! let response = agent.send("Hello!").await.unwrap();
//! println!("{response}");
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod build_info;
pub mod config;
pub mod conversation;
pub mod error;
#[cfg(test)]
pub mod testsupport;
pub mod tools;
pub mod types;
