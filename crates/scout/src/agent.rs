use anyhow::{anyhow, Result};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use tracing::debug;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::message::{Message, ToolRequest};
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::Provider;
use crate::systems::System;

/// Model calls allowed in a single reply before the agent gives up.
///
/// Matches a budget of 25 alternating model and tool steps.
pub const MAX_TURNS: usize = 13;

/// Agent integrates a foundational LLM with the systems it needs to pilot
pub struct Agent {
    systems: Vec<Box<dyn System>>,
    provider: Box<dyn Provider>,
    max_turns: usize,
}

impl Agent {
    /// Create a new Agent with the specified provider
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            systems: Vec::new(),
            provider,
            max_turns: MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Add a system to the agent
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// The model id of the underlying provider
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Get all tools from all systems with proper system prefixing
    pub fn tools(&self) -> Vec<Tool> {
        let mut tools = Vec::new();
        for system in &self.systems {
            for tool in system.tools() {
                tools.push(Tool::new(
                    format!("{}__{}", system.name(), tool.name),
                    &tool.description,
                    tool.input_schema.clone(),
                ));
            }
        }
        tools
    }

    /// Find the appropriate system for a tool call based on the prefixed name
    fn get_system_for_tool(&self, prefixed_name: &str) -> Option<&dyn System> {
        let (system_name, _) = prefixed_name.split_once("__")?;
        self.systems
            .iter()
            .find(|sys| sys.name() == system_name)
            .map(|v| &**v)
    }

    /// Dispatch a single tool call to the appropriate system
    async fn dispatch_tool_call(
        &self,
        tool_call: AgentResult<ToolCall>,
    ) -> AgentResult<Vec<Content>> {
        let call = tool_call?;
        let system = self
            .get_system_for_tool(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        let tool_name = call
            .name
            .split_once("__")
            .map(|(_, tool)| tool)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;
        let system_tool_call = ToolCall::new(tool_name, call.arguments);

        system.call(system_tool_call).await
    }

    /// Create a stream that yields each message as it's generated by the agent.
    /// This includes both the assistant's responses and any tool responses.
    pub async fn reply(&self, messages: &[Message]) -> Result<BoxStream<'_, Result<Message>>> {
        let mut messages = messages.to_vec();
        let tools = self.tools();
        let max_turns = self.max_turns;

        Ok(Box::pin(async_stream::try_stream! {
            let mut turns = 0;
            loop {
                if turns >= max_turns {
                    Err::<(), _>(anyhow!(
                        "Agent stopped after {} model calls without a final answer",
                        max_turns
                    ))?;
                }
                turns += 1;

                let (response, usage) = self.provider.complete(&messages, &tools).await?;
                debug!(
                    model = self.provider.model(),
                    turn = turns,
                    input_tokens = ?usage.input_tokens,
                    output_tokens = ?usage.output_tokens,
                    "received completion"
                );

                yield response.clone();

                // Make sure the message above is delivered before the tool calls start
                tokio::task::yield_now().await;

                let tool_requests: Vec<&ToolRequest> = response.content
                    .iter()
                    .filter_map(|content| content.as_tool_request())
                    .collect();

                if tool_requests.is_empty() {
                    // No more tool calls, end the reply loop
                    break;
                }

                // Dispatch in parallel but wait until all are finished
                let futures: Vec<_> = tool_requests
                    .iter()
                    .map(|request| self.dispatch_tool_call(request.tool_call.clone()))
                    .collect();
                let outputs = futures::future::join_all(futures).await;

                let mut message_tool_response = Message::user();
                for (request, output) in tool_requests.iter().zip(outputs.into_iter()) {
                    message_tool_response = message_tool_response.with_tool_response(
                        request.id.clone(),
                        output,
                    );
                }

                yield message_tool_response.clone();

                messages.push(response);
                messages.push(message_tool_response);
            }
        }))
    }

    /// Run the reply loop to completion and return the whole conversation:
    /// the initial messages followed by everything the agent produced.
    pub async fn run(&self, messages: Vec<Message>) -> Result<Vec<Message>> {
        let mut produced = Vec::new();
        {
            let mut stream = self.reply(&messages).await?;
            while let Some(message) = stream.try_next().await? {
                produced.push(message);
            }
        }

        let mut conversation = messages;
        conversation.extend(produced);
        Ok(conversation)
    }
}
