//! Agent event plumbing.
//!
//! Tool activity is reported through an optional channel so a front end can
//! show progress while the loop keeps running.

use tokio::sync::mpsc;

use super::Agent;

/// Progress events emitted during [`Agent::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// The model asked for a tool; `args` is the JSON argument object.
    ToolCall { name: String, args: String },
    ToolResult { name: String, result: String },
    /// A continuation request is about to be sent.
    ContinuationStarted { round: usize },
}

impl Agent {
    /// Route progress events to `sink`; `None` silences them.
    pub fn set_event_sink(&mut self, sink: Option<mpsc::UnboundedSender<AgentEvent>>) {
        self.events = sink;
    }

    pub(super) fn emit(&self, event: AgentEvent) {
        if let Some(sink) = &self.events {
            // A dropped receiver just means nobody is listening anymore.
            let _ = sink.send(event);
        }
    }
}
