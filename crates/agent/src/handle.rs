//! Provider-backed agent handles.
//!
//! [`ProviderAgent`] runs the tool-calling loop: send the transcript to the
//! provider, execute any tool calls it asks for, feed the results back, and
//! repeat until the model answers in plain text.

use async_trait::async_trait;
use chatline_config::AppConfig;
use chatline_core::agent::{AgentHandle, AgentSpec, HandleBuilder, RunOutput};
use chatline_core::error::BackendError;
use chatline_core::message::{Message, Role};
use chatline_core::provider::{Provider, ProviderRequest};
use chatline_core::tool::{ToolCall, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_ITERATIONS_REPLY: &str =
    "I've reached the maximum number of tool call iterations. Please provide further guidance.";

/// An agent handle bound to one model and one set of granted tools.
pub struct ProviderAgent {
    spec: AgentSpec,

    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// Every tool the process knows about; only `spec.tools` are offered
    tools: Arc<ToolRegistry>,

    temperature: f32,
    max_tokens: Option<u32>,

    /// Maximum tool call iterations per run
    max_iterations: u32,
}

impl ProviderAgent {
    pub fn new(spec: AgentSpec, provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            spec,
            provider,
            tools,
            temperature: 0.7,
            max_tokens: None,
            max_iterations: 8,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    fn is_granted(&self, tool: &str) -> bool {
        self.spec.tools.iter().any(|t| t == tool)
    }

    /// Instructions first, then prior turns, then the new prompt.
    fn transcript(&self, user: &Message, history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.spec.instructions.is_empty() {
            messages.push(Message::system(&self.spec.instructions));
        }
        messages.extend(history.iter().filter(|m| m.role != Role::System).cloned());
        messages.push(user.clone());
        messages
    }

    async fn call_tool(&self, call: &ToolCall) -> String {
        if !self.is_granted(&call.name) {
            warn!(tool = %call.name, model = %self.spec.model, "Model asked for a tool it was not granted");
            return format!("Error: tool '{}' is not available", call.name);
        }

        match self.tools.execute(call).await {
            Ok(result) => {
                debug!(tool = %call.name, success = result.success, "Tool executed");
                result.output
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                format!("Error: {e}")
            }
        }
    }
}

#[async_trait]
impl AgentHandle for ProviderAgent {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn run(&self, prompt: &str, history: &[Message]) -> Result<RunOutput, BackendError> {
        let user = Message::user(prompt);
        let mut transcript = self.transcript(&user, history);
        let mut new_messages = vec![user];
        let tool_definitions = self.tools.definitions_for(&self.spec.tools);

        info!(
            model = %self.spec.model,
            history = history.len(),
            tools = tool_definitions.len(),
            "Running agent"
        );

        for iteration in 1..=self.max_iterations {
            debug!(model = %self.spec.model, iteration, "Agent loop iteration");

            let request = ProviderRequest {
                model: self.spec.model.clone(),
                messages: transcript.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };
            let response = self.provider.complete(request).await?;

            if response.message.tool_calls.is_empty() {
                let output = response.message.content.clone();
                new_messages.push(response.message);
                return Ok(RunOutput {
                    output,
                    new_messages,
                    model: response.model,
                });
            }

            let tool_calls = response.message.tool_calls.clone();
            transcript.push(response.message.clone());
            new_messages.push(response.message);

            for tc in &tool_calls {
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                };
                let output = self.call_tool(&call).await;
                let result = Message::tool_result(&tc.id, output);
                transcript.push(result.clone());
                new_messages.push(result);
            }
        }

        warn!(
            model = %self.spec.model,
            iterations = self.max_iterations,
            "Max tool iterations reached, forcing text response"
        );
        let reply = Message::assistant(MAX_ITERATIONS_REPLY);
        new_messages.push(reply);
        Ok(RunOutput {
            output: MAX_ITERATIONS_REPLY.to_string(),
            new_messages,
            model: self.spec.model.clone(),
        })
    }
}

/// Builds [`ProviderAgent`]s that share one provider and one tool registry.
pub struct ProviderAgentBuilder {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    temperature: f32,
    max_tokens: Option<u32>,
    max_iterations: u32,
}

impl ProviderAgentBuilder {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, config: &AppConfig) -> Self {
        Self {
            provider,
            tools,
            temperature: config.provider.temperature,
            max_tokens: config.provider.max_tokens,
            max_iterations: config.agent.max_tool_iterations,
        }
    }
}

#[async_trait]
impl HandleBuilder for ProviderAgentBuilder {
    async fn build(&self, spec: &AgentSpec) -> Result<Arc<dyn AgentHandle>, BackendError> {
        let missing: Vec<_> = spec
            .tools
            .iter()
            .filter(|t| self.tools.get(t).is_none())
            .collect();
        if !missing.is_empty() {
            warn!(model = %spec.model, ?missing, "Granted tools are not registered");
        }

        let agent = ProviderAgent::new(spec.clone(), Arc::clone(&self.provider), Arc::clone(&self.tools))
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_max_iterations(self.max_iterations);
        debug!(provider = self.provider.name(), model = %spec.model, "Agent handle built");
        Ok(Arc::new(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatline_core::message::MessageToolCall;
    use chatline_core::provider::{ProviderResponse, Usage};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A provider that replays scripted responses and records every request.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Message>>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Message>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ProviderRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, BackendError> {
            let model = request.model.clone();
            self.requests.lock().unwrap().push(request);
            let message = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Message::assistant("done"));
            Ok(ProviderResponse {
                message,
                usage: Some(Usage::default()),
                model,
            })
        }
    }

    fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> Message {
        let mut msg = Message::assistant("");
        msg.tool_calls.push(MessageToolCall {
            id: id.into(),
            name: name.into(),
            arguments: arguments.to_string(),
        });
        msg
    }

    fn spec(tools: &[&str]) -> AgentSpec {
        AgentSpec {
            model: "test-model".into(),
            instructions: "be brief".into(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(chatline_tools::default_registry())
    }

    #[tokio::test]
    async fn plain_reply_returns_prompt_and_answer() {
        let provider = ScriptedProvider::new(vec![Message::assistant("Hello!")]);
        let agent = ProviderAgent::new(spec(&[]), provider.clone(), registry());

        let history = vec![Message::user("earlier"), Message::assistant("sure")];
        let out = agent.run("hi", &history).await.unwrap();

        assert_eq!(out.output, "Hello!");
        assert_eq!(out.model, "test-model");
        assert_eq!(out.new_messages.len(), 2);
        assert_eq!(out.new_messages[0].role, Role::User);
        assert_eq!(out.new_messages[1].content, "Hello!");

        let sent = &provider.requests()[0];
        assert_eq!(sent.messages.len(), 4);
        assert_eq!(sent.messages[0].role, Role::System);
        assert_eq!(sent.messages[0].content, "be brief");
        assert_eq!(sent.messages[3].content, "hi");
        assert!(sent.tools.is_empty());
    }

    #[tokio::test]
    async fn granted_tool_is_executed_and_fed_back() {
        let provider = ScriptedProvider::new(vec![
            tool_call("c1", "send_email", serde_json::json!({"subject": "Hi", "email_to": "a@b.c"})),
            Message::assistant("Sent."),
        ]);
        let agent = ProviderAgent::new(spec(&["send_email"]), provider.clone(), registry());

        let out = agent.run("email a@b.c", &[]).await.unwrap();

        assert_eq!(out.output, "Sent.");
        // user, assistant tool call, tool result, final reply
        assert_eq!(out.new_messages.len(), 4);
        let result = &out.new_messages[2];
        assert_eq!(result.role, Role::Tool);
        assert_eq!(result.tool_call_id.as_deref(), Some("c1"));
        assert!(result.content.contains("a@b.c"));

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[0].tools[0].name, "send_email");
    }

    #[tokio::test]
    async fn ungranted_tool_is_refused() {
        let provider = ScriptedProvider::new(vec![
            tool_call("c1", "get_weather", serde_json::json!({"city": "Oslo"})),
            Message::assistant("Sorry."),
        ]);
        let agent = ProviderAgent::new(spec(&["send_email"]), provider, registry());

        let out = agent.run("weather?", &[]).await.unwrap();
        assert_eq!(out.new_messages[2].content, "Error: tool 'get_weather' is not available");
    }

    #[tokio::test]
    async fn tool_errors_are_reported_to_the_model() {
        let provider = ScriptedProvider::new(vec![
            tool_call("c1", "get_weather", serde_json::json!({})),
            Message::assistant("Which city?"),
        ]);
        let agent = ProviderAgent::new(spec(&["get_weather"]), provider, registry());

        let out = agent.run("weather?", &[]).await.unwrap();
        assert!(out.new_messages[2].content.starts_with("Error: "));
        assert_eq!(out.output, "Which city?");
    }

    #[tokio::test]
    async fn stops_after_max_iterations() {
        let looping: Vec<_> = (0..5)
            .map(|i| tool_call(&format!("c{i}"), "send_email", serde_json::json!({"subject": "s", "email_to": "t"})))
            .collect();
        let provider = ScriptedProvider::new(looping);
        let agent = ProviderAgent::new(spec(&["send_email"]), provider.clone(), registry()).with_max_iterations(2);

        let out = agent.run("spam", &[]).await.unwrap();
        assert_eq!(out.output, MAX_ITERATIONS_REPLY);
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn builder_applies_config() {
        let provider = ScriptedProvider::new(vec![]);
        let mut config = AppConfig::default();
        config.provider.temperature = 0.1;
        config.provider.max_tokens = Some(64);
        let builder = ProviderAgentBuilder::new(provider.clone(), registry(), &config);

        let handle = builder.build(&spec(&[])).await.unwrap();
        assert_eq!(handle.spec().model, "test-model");
        handle.run("hi", &[]).await.unwrap();

        let sent = &provider.requests()[0];
        assert!((sent.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(sent.max_tokens, Some(64));
    }
}
