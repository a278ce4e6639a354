//! Turn workflow
//!
//! Ties routing, personas, the model client, and session state into the
//! per-turn control flow: route the message, run the target agent, update
//! the session, and hand back the reply together with the (possibly
//! changed) active-agent key.
//!
//! Specialist agents answer directly, streamed when enabled. The
//! coordinating agent runs a bounded tool loop over the plan toolkit and
//! can delegate tasks to specialists inline.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent::registry::{AgentDefinition, AgentRegistry};
use crate::agent::roster::builtin_registry;
use crate::agent::turn_state::{Observation, TurnState};
use crate::core::{Config, Message, Result, ToolCall, TroupeError};
use crate::llm::stream;
use crate::llm::{ChatOptions, ModelClient, OpenRouterClient};
use crate::session::{route, Session};
use crate::tools::{PlanToolkit, DELEGATE_TOOL};

/// What a processed turn hands back to the chat front end
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Registry key of the agent that answered
    pub agent: String,
    /// Final reply text
    pub reply: String,
    /// Whether the reply was already relayed token-by-token to the sink
    pub streamed: bool,
}

/// The turn engine
pub struct Workflow {
    config: Config,
    client: Arc<dyn ModelClient>,
    registry: Arc<AgentRegistry>,
    toolkit: PlanToolkit,
}

impl Workflow {
    /// Create a workflow backed by OpenRouter and the built-in roster
    pub fn new(config: Config) -> Result<Self> {
        let client = OpenRouterClient::from_config(&config)?;
        Ok(Self::with_client(
            config,
            Arc::new(client),
            builtin_registry(),
        ))
    }

    /// Create a workflow with an explicit client and registry
    pub fn with_client(
        config: Config,
        client: Arc<dyn ModelClient>,
        registry: AgentRegistry,
    ) -> Self {
        Self {
            config,
            client,
            registry: Arc::new(registry),
            toolkit: PlanToolkit::new(),
        }
    }

    /// The agent registry
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Key of the agent that answers unrouted messages: the configured
    /// default when the registry knows it, the registry default otherwise
    pub fn default_agent_key(&self) -> &str {
        let configured = &self.config.session.default_agent;
        if self.registry.contains(configured) {
            configured.as_str()
        } else {
            self.registry.default_key()
        }
    }

    /// Create a session configured for this workflow
    pub fn new_session(&self) -> Session {
        Session::new(self.default_agent_key(), self.config.session.max_history)
    }

    /// Process one user turn, printing streamed tokens to stdout
    pub async fn process(&self, session: &mut Session, raw_message: &str) -> Result<TurnOutcome> {
        let print_tokens = self.config.streaming.print_tokens;
        let mut sink = move |token: &str| {
            if print_tokens {
                print!("{}", token);
                let _ = io::stdout().flush();
            }
        };
        self.process_with_sink(session, raw_message, &mut sink).await
    }

    /// Process one user turn, relaying streamed tokens to the given sink.
    ///
    /// Transport failures do not fail the turn: the reply becomes an error
    /// description prefixed with the active agent's display name and the
    /// session stays usable. Only internal invariant violations surface as
    /// `Err`.
    pub async fn process_with_sink(
        &self,
        session: &mut Session,
        raw_message: &str,
        on_token: &mut (dyn FnMut(&str) + Send),
    ) -> Result<TurnOutcome> {
        let (target, text) = route(raw_message, Some(session.active_agent()), &self.registry);

        let definition = self
            .registry
            .get(&target)
            .cloned()
            .ok_or_else(|| TroupeError::UnknownAgent(target.clone()))?;

        debug!(session = %session.id(), agent = %target, "processing turn");

        session.set_active_agent(&target);
        // History stores what the agent answered; the mention was routing
        // syntax, not content
        session.conversation_mut().add_user(text);

        let result = if definition.coordinator {
            self.coordinator_turn(session, &definition).await
        } else {
            self.specialist_turn(session, &definition, on_token).await
        };

        let (reply, streamed) = match result {
            Ok(pair) => pair,
            Err(e) => {
                warn!(agent = %definition.key, error = %e, "turn failed");
                (
                    format!(
                        "{}: I ran into a problem completing this turn: {}",
                        definition.display_name, e
                    ),
                    false,
                )
            }
        };

        session.conversation_mut().add_assistant(&reply);

        Ok(TurnOutcome {
            agent: target,
            reply,
            streamed,
        })
    }

    /// A specialist answers from persona + history, streamed when enabled
    async fn specialist_turn(
        &self,
        session: &Session,
        definition: &AgentDefinition,
        on_token: &mut (dyn FnMut(&str) + Send),
    ) -> Result<(String, bool)> {
        let mut messages = vec![Message::system(definition.profile.system_prompt())];
        messages.extend(
            session
                .conversation()
                .context_window(self.config.session.context_window),
        );

        if self.config.streaming.enabled {
            let chunk_stream = self
                .client
                .open_stream(&self.config.model.name, &messages, Some(self.chat_options()))
                .await?;
            let content = stream::accumulate(chunk_stream, &mut *on_token).await?;
            Ok((content, true))
        } else {
            let completion = self
                .client
                .chat(&self.config.model.name, &messages, Some(self.chat_options()))
                .await?;
            Ok((completion.content, false))
        }
    }

    /// The coordinator runs a bounded tool loop over the plan toolkit
    async fn coordinator_turn(
        &self,
        session: &mut Session,
        definition: &AgentDefinition,
    ) -> Result<(String, bool)> {
        let mut messages = vec![Message::system(self.coordinator_prompt(definition))];
        messages.extend(
            session
                .conversation()
                .context_window(self.config.session.context_window),
        );

        let tool_defs = self.toolkit.definitions();
        let mut state = TurnState::new(self.config.session.max_turns);
        let options = self.chat_options();

        while state.should_continue() {
            let response = self
                .client
                .chat_with_tools(
                    &self.config.model.name,
                    &messages,
                    &tool_defs,
                    Some(options.clone()),
                )
                .await?;

            if response.tool_calls.is_empty() {
                // No tool calls means a final answer
                state.final_answer = Some(response.content);
                break;
            }

            debug!(
                round = state.round,
                calls = response.tool_calls.len(),
                "executing tool calls"
            );

            messages.push(Message::assistant_with_tools(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let observation = self.execute_tool(session, call).await;
                if !observation.success {
                    debug!(tool = %observation.tool_name, output = %observation.output, "tool call failed");
                }

                let call_id = call.id.clone().unwrap_or_else(|| call.name.clone());
                messages.push(Message::tool(observation.output.clone(), call_id));
                state.add_observation(observation);
            }

            state.next_round();
        }

        match state.final_answer.take() {
            Some(answer) if !answer.is_empty() => Ok((answer, false)),
            // Round budget exhausted, or the model went silent after its
            // tool work: summarize what happened instead
            _ => Ok((self.synthesize(definition, &state).await?, false)),
        }
    }

    /// Run one tool call against the session; failures become observations
    async fn execute_tool(&self, session: &mut Session, call: &ToolCall) -> Observation {
        if call.name == DELEGATE_TOOL {
            return self.delegate(call).await;
        }

        match self.toolkit.dispatch(session, &self.registry, call) {
            Ok(ack) => Observation::success(&call.name, ack),
            Err(e) => Observation::error(&call.name, format!("{} failed: {}", call.name, e)),
        }
    }

    /// Run a specialist persona on a delegated task within this turn
    async fn delegate(&self, call: &ToolCall) -> Observation {
        let agent_name = call.get_string("agent_name").unwrap_or_default();
        let task = call.get_string("task").unwrap_or_default();

        let Some(definition) = self.registry.get(&agent_name) else {
            return Observation::error(
                DELEGATE_TOOL,
                format!(
                    "unknown agent '{}'. Available agents:\n{}",
                    agent_name,
                    self.registry.roster_summary()
                ),
            );
        };
        if definition.coordinator {
            return Observation::error(DELEGATE_TOOL, "cannot delegate a task to yourself");
        }

        info!(agent = %definition.key, "delegating task");

        let messages = vec![
            Message::system(definition.profile.system_prompt()),
            Message::user(&task),
        ];

        match self
            .client
            .chat(&self.config.model.name, &messages, Some(self.chat_options()))
            .await
        {
            Ok(completion) => Observation::success(
                DELEGATE_TOOL,
                format!("{} answered:\n{}", definition.display_name, completion.content),
            ),
            Err(e) => Observation::error(
                DELEGATE_TOOL,
                format!("{} failed: {}", definition.display_name, e),
            ),
        }
    }

    /// Produce a reply from collected observations when the tool loop
    /// ended without one
    async fn synthesize(
        &self,
        definition: &AgentDefinition,
        state: &TurnState,
    ) -> Result<String> {
        if state.observations.is_empty() {
            return Ok(
                "I wasn't able to produce an answer for that. Could you rephrase?".to_string(),
            );
        }

        let prompt = format!(
            "Summarize for the user what was just done and what happens next, \
             based on these observations:\n\n{}",
            state.format_observations()
        );
        let messages = vec![
            Message::system(definition.profile.system_prompt()),
            Message::user(prompt),
        ];

        let completion = self
            .client
            .chat(&self.config.model.name, &messages, Some(self.chat_options()))
            .await?;
        Ok(completion.content)
    }

    /// The coordinator's system prompt: persona, roster, working style
    fn coordinator_prompt(&self, definition: &AgentDefinition) -> String {
        format!(
            "{persona}\n\n\
             ## Available agents\n{roster}\n\n\
             ## Working style\n\
             - For multi-part requests, create a plan first, then add steps and \
             assign them.\n\
             - Use delegate_task to get a specialist's answer, then record_result \
             to store it.\n\
             - Users can also address a specialist directly by starting a message \
             with @key.\n\
             - When the work is done, answer the user in plain text without \
             calling tools.",
            persona = definition.profile.system_prompt(),
            roster = self.registry.roster_summary(),
        )
    }

    fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            temperature: Some(self.config.model.temperature),
            max_tokens: self.config.model.max_tokens,
            stop: None,
        }
    }
}
