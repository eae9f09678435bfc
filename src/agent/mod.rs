//! Conversation driver.
//!
//! The [`Agent`] sends the stored history plus the new user turn, executes any
//! tool calls the model makes, feeds the results back through the provider's
//! continuation format, and repeats until the model answers with text or the
//! configured round limit is hit.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{ApiClient, ModelClient};
use crate::config::ProviderConfig;
use crate::conversation::{history_messages, ConversationStore};
use crate::error::ChatError;
use crate::tools::{list_available_tools, ToolRegistry};
use crate::types::{ChatOutput, Role, ToolCall, ToolResult};

mod events;

pub use events::AgentEvent;

/// Drives one conversation against a model client, a tool registry and a store.
pub struct Agent {
    /// Model client implementation (HTTP client in prod, mocks in tests).
    client: Arc<dyn ModelClient>,
    tools: ToolRegistry,
    store: Box<dyn ConversationStore>,
    config: ProviderConfig,
    events: Option<mpsc::UnboundedSender<AgentEvent>>,
}

impl Agent {
    /// Agent with an HTTP client and the default tool executors.
    pub fn new(config: ProviderConfig, store: Box<dyn ConversationStore>) -> Self {
        let client = Arc::new(ApiClient::from_config(&config));
        let tools = ToolRegistry::with_default_tools(&config);
        Self::with_client(config, tools, store, client)
    }

    /// Agent with an explicit client and registry.
    pub fn with_client(
        config: ProviderConfig,
        tools: ToolRegistry,
        store: Box<dyn ConversationStore>,
        client: Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            client,
            tools,
            store,
            config,
            events: None,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Read-only access to the conversation store.
    pub fn store(&self) -> &dyn ConversationStore {
        self.store.as_ref()
    }

    /// Send a user message and run the tool loop to a final text answer.
    ///
    /// Only the user turn and the final assistant text are persisted; the
    /// provider-native tool turns live only for the duration of this call.
    pub async fn send(&mut self, user_input: &str) -> Result<String, ChatError> {
        self.store
            .append(Role::User, user_input)
            .map_err(ChatError::Store)?;
        let history = history_messages(self.store.as_ref()).map_err(ChatError::Store)?;
        let tools = list_available_tools(&self.config);
        debug!(
            messages = history.len(),
            tools = tools.len(),
            "starting conversation turn"
        );

        let mut result = self.client.chat(&history, &tools, &self.config).await?;
        let mut rounds = 0;
        loop {
            let calls = match &result.output {
                ChatOutput::Text(text) => {
                    // History never holds blank assistant turns.
                    if !text.trim().is_empty() {
                        self.store
                            .append(Role::Assistant, text)
                            .map_err(ChatError::Store)?;
                    }
                    return Ok(text.clone());
                }
                ChatOutput::ToolCalls(calls) => calls.clone(),
            };

            if rounds >= self.config.max_tool_rounds {
                warn!(
                    rounds,
                    "model kept requesting tools; giving up on this turn"
                );
                return Err(ChatError::MaxToolRoundsReached(self.config.max_tool_rounds));
            }
            rounds += 1;

            let results = self.run_tools(&calls).await;
            self.emit(AgentEvent::ContinuationStarted { round: rounds });
            result = self
                .client
                .continue_with_tool_results(&result, &self.config, &results)
                .await?;
        }
    }

    /// Execute calls in model order. Failures become `Error: ...` results so
    /// the model can react to them.
    async fn run_tools(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let args = serde_json::Value::Object(call.args.clone()).to_string();
            debug!(tool = %call.name, args = %args, "executing tool call");
            self.emit(AgentEvent::ToolCall {
                name: call.name.clone(),
                args,
            });

            let output = match self.tools.execute(call, &self.config).await {
                Ok(output) => output,
                Err(err) => {
                    warn!(tool = %call.name, error = %err, "tool call failed");
                    format!("Error: {err}")
                }
            };
            self.emit(AgentEvent::ToolResult {
                name: call.name.clone(),
                result: output.clone(),
            });
            results.push(ToolResult::new(&call.id, &call.name, output));
        }
        results
    }
}
