//! Runs a single non-interactive chat turn against one of the supported providers.
//!
//! The invoker owns nothing mutable: it holds the process-wide [`Credentials`]
//! and an [`AgentRuntime`], builds a fresh [`Agent`] per call and reduces the
//! resulting conversation to the text of the final assistant message.

use anyhow::Result;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::agent::Agent;
use crate::errors::InvokeError;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::providers::configs::{
    ApiConfig, GroqProviderConfig, OpenAiProviderConfig, ProviderConfig,
};
use crate::providers::factory::{self, ProviderType};
use crate::providers::groq::GROQ_HOST;
use crate::providers::openai::OPENAI_HOST;
use crate::systems::search::{SearchConfig, SearchSystem, TAVILY_HOST};

/// Credentials and endpoints for every upstream service, loaded once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub openai: ApiConfig,
    pub groq: ApiConfig,
    pub search: SearchConfig,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            openai: ApiConfig::new(OPENAI_HOST, ""),
            groq: ApiConfig::new(GROQ_HOST, ""),
            search: SearchConfig::new(TAVILY_HOST, ""),
        }
    }
}

impl Credentials {
    /// Bind the provider's shared settings to a specific model id
    pub fn provider_config(&self, provider: ProviderType, model: &str) -> ProviderConfig {
        match provider {
            ProviderType::OpenAi => {
                ProviderConfig::OpenAi(OpenAiProviderConfig::from_api(&self.openai, model))
            }
            ProviderType::Groq => {
                ProviderConfig::Groq(GroqProviderConfig::from_api(&self.groq, model))
            }
        }
    }
}

/// Executes one agent turn: `(model, tools, messages) -> messages`.
///
/// The returned list is the whole conversation, initial messages included.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn run(&self, agent: &Agent, messages: Vec<Message>) -> Result<Vec<Message>>;
}

/// The reactive tool-use loop provided by [`Agent::run`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ReactRuntime;

#[async_trait]
impl AgentRuntime for ReactRuntime {
    async fn run(&self, agent: &Agent, messages: Vec<Message>) -> Result<Vec<Message>> {
        agent.run(messages).await
    }
}

pub struct Invoker {
    credentials: Arc<Credentials>,
    runtime: Arc<dyn AgentRuntime>,
}

impl Invoker {
    pub fn new(credentials: Arc<Credentials>) -> Self {
        Self::with_runtime(credentials, Arc::new(ReactRuntime))
    }

    pub fn with_runtime(credentials: Arc<Credentials>, runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            credentials,
            runtime,
        }
    }

    /// Run one chat turn and return the final assistant reply.
    ///
    /// Returns an empty string when the agent produced no assistant message.
    pub async fn invoke(
        &self,
        model_id: &str,
        query: &str,
        allow_search: bool,
        provider: &str,
        system_prompt: &str,
    ) -> Result<String, InvokeError> {
        let provider_type = ProviderType::from_str(provider)
            .map_err(|_| InvokeError::UnsupportedProvider(provider.to_string()))?;

        let agent = self
            .build_agent(provider_type, model_id, allow_search)
            .map_err(InvokeError::Provider)?;
        let messages = build_conversation(system_prompt, query);

        info!(
            provider = %provider_type,
            model = model_id,
            allow_search,
            "invoking agent"
        );

        let conversation = self
            .runtime
            .run(&agent, messages)
            .await
            .map_err(InvokeError::Provider)?;

        debug!(messages = conversation.len(), "agent finished");
        Ok(last_assistant_text(&conversation))
    }

    fn build_agent(
        &self,
        provider_type: ProviderType,
        model_id: &str,
        allow_search: bool,
    ) -> Result<Agent> {
        let config = self.credentials.provider_config(provider_type, model_id);
        let provider = factory::get_provider(config)?;

        let mut agent = Agent::new(provider);
        if allow_search {
            let search = SearchSystem::new(self.credentials.search.clone())?;
            agent.add_system(Box::new(search));
        }
        Ok(agent)
    }
}

/// Build the initial conversation: an optional system message, then the user query
pub fn build_conversation(system_prompt: &str, query: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if !system_prompt.is_empty() {
        messages.push(Message::system().with_text(system_prompt));
    }
    messages.push(Message::user().with_text(query));
    messages
}

/// Text of the last assistant message, or an empty string if there is none
pub fn last_assistant_text(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .find(|message| message.role == Role::Assistant)
        .map(|message| message.as_concat_text())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::utils::create_openai_request_payload;
    use anyhow::anyhow;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records what the agent was given and answers with canned messages
    struct StubRuntime {
        reply: Vec<Message>,
        fail: bool,
        seen: Mutex<Vec<(String, usize, Vec<Message>)>>,
    }

    impl StubRuntime {
        fn replying(reply: Vec<Message>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                fail: false,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Vec::new(),
                fail: true,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AgentRuntime for StubRuntime {
        async fn run(&self, agent: &Agent, messages: Vec<Message>) -> Result<Vec<Message>> {
            self.seen.lock().unwrap().push((
                agent.model().to_string(),
                agent.tools().len(),
                messages.clone(),
            ));
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            let mut conversation = messages;
            conversation.extend(self.reply.clone());
            Ok(conversation)
        }
    }

    fn invoker(runtime: Arc<StubRuntime>) -> Invoker {
        Invoker::with_runtime(Arc::new(Credentials::default()), runtime)
    }

    #[test]
    fn test_conversation_without_system_prompt() {
        let messages = build_conversation("", "What is Rust?");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].as_concat_text(), "What is Rust?");
    }

    #[test]
    fn test_conversation_with_system_prompt() {
        let messages = build_conversation("Act as a pirate", "What is Rust?");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].as_concat_text(), "Act as a pirate");
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn test_empty_query_still_reaches_the_wire() -> Result<()> {
        let payload = create_openai_request_payload(
            "gpt-4o-mini",
            &build_conversation("", ""),
            &[],
            None,
            None,
        )?;

        assert_eq!(payload["messages"], json!([{"role": "user", "content": ""}]));
        Ok(())
    }

    #[test]
    fn test_provider_config_binds_model() {
        let credentials = Credentials::default();
        match credentials.provider_config(ProviderType::Groq, "llama3-70b-8192") {
            ProviderConfig::Groq(config) => {
                assert_eq!(config.model, "llama3-70b-8192");
                assert_eq!(config.host, GROQ_HOST);
            }
            other => panic!("Expected Groq config, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_returns_last_assistant_message() {
        let runtime = StubRuntime::replying(vec![
            Message::assistant().with_text("m1"),
            Message::user().with_text("tool output"),
            Message::assistant().with_text("m2"),
        ]);

        let reply = invoker(runtime)
            .invoke("gpt-4o-mini", "hi", false, "openai", "")
            .await
            .unwrap();
        assert_eq!(reply, "m2");
    }

    #[tokio::test]
    async fn test_no_assistant_message_yields_empty_string() {
        let runtime = StubRuntime::replying(vec![]);

        let reply = invoker(runtime)
            .invoke("gpt-4o-mini", "hi", false, "openai", "Be terse")
            .await
            .unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_search_attaches_exactly_one_tool() {
        let runtime = StubRuntime::replying(vec![Message::assistant().with_text("ok")]);
        let invoker = invoker(runtime.clone());

        invoker
            .invoke("llama3-70b-8192", "hi", false, "groq", "")
            .await
            .unwrap();
        invoker
            .invoke("llama3-70b-8192", "hi", true, "groq", "")
            .await
            .unwrap();

        let seen = runtime.seen.lock().unwrap();
        assert_eq!(seen[0].0, "llama3-70b-8192");
        assert_eq!(seen[0].1, 0);
        assert_eq!(seen[1].1, 1);
    }

    #[tokio::test]
    async fn test_runtime_receives_conversation() {
        let runtime = StubRuntime::replying(vec![Message::assistant().with_text("ok")]);

        invoker(runtime.clone())
            .invoke("gpt-4o-mini", "a b", false, "openai", "sys")
            .await
            .unwrap();

        let seen = runtime.seen.lock().unwrap();
        let messages = &seen[0].2;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].as_concat_text(), "a b");
    }

    #[tokio::test]
    async fn test_unsupported_provider() {
        let runtime = StubRuntime::replying(vec![]);

        let err = invoker(runtime.clone())
            .invoke("gpt-4o-mini", "hi", false, "anthropic", "")
            .await
            .unwrap_err();

        assert!(matches!(err, InvokeError::UnsupportedProvider(ref p) if p == "anthropic"));
        assert!(err.is_client_error());
        assert!(runtime.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_runtime_failure_is_provider_error() {
        let err = invoker(StubRuntime::failing())
            .invoke("gpt-4o-mini", "hi", false, "openai", "")
            .await
            .unwrap_err();

        assert!(matches!(err, InvokeError::Provider(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "connection refused");
    }
}
