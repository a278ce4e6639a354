//! End-to-end turn tests
//!
//! Drives the workflow against a scripted model client: no network, real
//! routing, tool dispatch, and session mutation.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use troupe::agent::builtin_registry;
use troupe::core::{Config, Message, Result, ToolCall, ToolDefinition, TroupeError};
use troupe::llm::{ChatCompletion, ChatOptions, ChatStream, ModelClient, StreamChunk};
use troupe::session::PlanStatus;
use troupe::Workflow;

/// One scripted response from the mock client
enum Scripted {
    Reply(ChatCompletion),
    Stream(Vec<Result<StreamChunk>>),
    Fail(String),
}

/// Model client that plays back a script and records what it was asked
struct ScriptedClient {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedClient {
    fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn next(&self, messages: &[Message]) -> Result<Scripted> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TroupeError::other("script exhausted"))
    }

    fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn chat(
        &self,
        _model: &str,
        messages: &[Message],
        _options: Option<ChatOptions>,
    ) -> Result<ChatCompletion> {
        match self.next(messages)? {
            Scripted::Reply(completion) => Ok(completion),
            Scripted::Fail(msg) => Err(TroupeError::api(msg)),
            Scripted::Stream(_) => Err(TroupeError::other("expected a chat entry")),
        }
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        _tools: &[ToolDefinition],
        options: Option<ChatOptions>,
    ) -> Result<ChatCompletion> {
        self.chat(model, messages, options).await
    }

    async fn open_stream(
        &self,
        _model: &str,
        messages: &[Message],
        _options: Option<ChatOptions>,
    ) -> Result<ChatStream> {
        match self.next(messages)? {
            Scripted::Stream(chunks) => Ok(Box::pin(futures::stream::iter(chunks))),
            Scripted::Fail(msg) => Err(TroupeError::api(msg)),
            Scripted::Reply(_) => Err(TroupeError::other("expected a stream entry")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn completion_with_tool_call(name: &str, id: &str, arguments: serde_json::Value) -> ChatCompletion {
    ChatCompletion {
        content: String::new(),
        tool_calls: vec![ToolCall {
            id: Some(id.to_string()),
            name: name.to_string(),
            arguments,
        }],
        usage: None,
        model: "test".to_string(),
    }
}

fn workflow_with(script: Vec<Scripted>, streaming: bool) -> (Workflow, Arc<ScriptedClient>) {
    let mut config = Config::default();
    config.streaming.enabled = streaming;
    config.streaming.print_tokens = false;

    let client = ScriptedClient::new(script);
    let workflow = Workflow::with_client(config, client.clone(), builtin_registry());
    (workflow, client)
}

#[tokio::test]
async fn specialist_turn_routes_and_replies() {
    let (workflow, client) = workflow_with(
        vec![Scripted::Reply(ChatCompletion::text("Here are five ideas."))],
        false,
    );
    let mut session = workflow.new_session();

    let outcome = workflow
        .process(&mut session, "@ideation tell me about space startups")
        .await
        .unwrap();

    assert_eq!(outcome.agent, "ideation");
    assert_eq!(outcome.reply, "Here are five ideas.");
    assert!(!outcome.streamed);

    // The session switched agents and recorded the stripped exchange
    assert_eq!(session.active_agent(), "ideation");
    assert_eq!(
        session.conversation().last_user_message().unwrap().content,
        "tell me about space startups"
    );
    assert_eq!(
        session
            .conversation()
            .last_assistant_message()
            .unwrap()
            .content,
        "Here are five ideas."
    );

    // The model saw the ideation persona, not the coordinator's
    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0][0].role, "system");
    assert!(requests[0][0].content.contains("ideation"));
}

#[tokio::test]
async fn unknown_mention_falls_through_to_active_agent() {
    let (workflow, _client) = workflow_with(
        vec![Scripted::Reply(ChatCompletion::text("Happy to help."))],
        false,
    );
    let mut session = workflow.new_session();

    let outcome = workflow
        .process(&mut session, "@unknownagent hello")
        .await
        .unwrap();

    // Default agent answers and the mention stays in the message
    assert_eq!(outcome.agent, "manager");
    assert_eq!(
        session.conversation().last_user_message().unwrap().content,
        "@unknownagent hello"
    );
}

#[tokio::test]
async fn coordinator_tool_loop_builds_a_plan() {
    let (workflow, client) = workflow_with(
        vec![
            Scripted::Reply(completion_with_tool_call(
                "create_plan",
                "call_1",
                json!({"user_request": "launch a fintech app", "plan_details": "three phases"}),
            )),
            Scripted::Reply(completion_with_tool_call(
                "add_plan_step",
                "call_2",
                json!({"description": "market research", "assigned_agent": "analysis"}),
            )),
            Scripted::Reply(ChatCompletion::text("Plan is in place.")),
        ],
        false,
    );
    let mut session = workflow.new_session();

    let outcome = workflow
        .process(&mut session, "help me launch a fintech app")
        .await
        .unwrap();

    assert_eq!(outcome.agent, "manager");
    assert_eq!(outcome.reply, "Plan is in place.");

    let plan = session.plan().expect("plan should exist");
    assert_eq!(plan.user_request, "launch a fintech app");
    assert_eq!(plan.status, PlanStatus::Created);
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.assignments["analysis"].step_index, Some(0));

    // Tool acknowledgments went back to the model as tool messages
    let requests = client.requests();
    assert_eq!(requests.len(), 3);
    let last = requests.last().unwrap();
    assert!(last.iter().any(|m| m.role == "tool" && m.content.contains("Plan created")));
    assert!(last
        .iter()
        .any(|m| m.role == "tool" && m.content.contains("market research")));
}

#[tokio::test]
async fn plan_operation_failure_stays_in_the_turn() {
    // update_plan before any plan exists: the failure becomes a tool
    // observation and the model still gets to answer
    let (workflow, _client) = workflow_with(
        vec![
            Scripted::Reply(completion_with_tool_call(
                "update_plan",
                "call_1",
                json!({"updates": "progress"}),
            )),
            Scripted::Reply(ChatCompletion::text("There is no plan yet - shall I create one?")),
        ],
        false,
    );
    let mut session = workflow.new_session();

    let outcome = workflow.process(&mut session, "update the plan").await.unwrap();

    assert!(outcome.reply.contains("no plan yet"));
    assert!(session.plan().is_none());
}

#[tokio::test]
async fn delegation_runs_the_specialist_inline() {
    let (workflow, client) = workflow_with(
        vec![
            Scripted::Reply(completion_with_tool_call(
                "delegate_task",
                "call_1",
                json!({"agent_name": "cto", "task": "pick a stack"}),
            )),
            // The delegated specialist's answer
            Scripted::Reply(ChatCompletion::text("Use boring technology.")),
            Scripted::Reply(ChatCompletion::text("The CTO suggests boring technology.")),
        ],
        false,
    );
    let mut session = workflow.new_session();

    let outcome = workflow
        .process(&mut session, "ask the cto about our stack")
        .await
        .unwrap();

    assert_eq!(outcome.reply, "The CTO suggests boring technology.");

    let requests = client.requests();
    // Second request is the delegated call with the CTO persona
    assert!(requests[1][0].content.contains("chief technology officer"));
    assert_eq!(requests[1][1].content, "pick a stack");
    // Third request carries the delegation observation back to the coordinator
    assert!(requests[2]
        .iter()
        .any(|m| m.role == "tool" && m.content.contains("Use boring technology.")));
}

#[tokio::test]
async fn transport_failure_becomes_agent_prefixed_reply() {
    let (workflow, _client) = workflow_with(
        vec![Scripted::Fail("connection reset".to_string())],
        false,
    );
    let mut session = workflow.new_session();
    session.set_active_agent("ideation");

    let outcome = workflow.process(&mut session, "hello").await.unwrap();

    assert!(outcome.reply.starts_with("Ideation Agent:"));
    assert!(outcome.reply.contains("connection reset"));

    // Session survives: the failed turn is recorded and the next one works
    assert_eq!(session.conversation().len(), 2);
    assert_eq!(session.active_agent(), "ideation");
}

#[tokio::test]
async fn streamed_reply_reaches_the_sink() {
    let (workflow, _client) = workflow_with(
        vec![Scripted::Stream(vec![
            Ok(StreamChunk::content("Hel")),
            Ok(StreamChunk::content("lo!")),
            Ok(StreamChunk::done()),
        ])],
        true,
    );
    let mut session = workflow.new_session();

    let mut seen = String::new();
    let mut sink = |token: &str| seen.push_str(token);

    let outcome = workflow
        .process_with_sink(&mut session, "@ideation hi", &mut sink)
        .await
        .unwrap();

    assert!(outcome.streamed);
    assert_eq!(outcome.reply, "Hello!");
    assert_eq!(seen, "Hello!");
    assert_eq!(
        session
            .conversation()
            .last_assistant_message()
            .unwrap()
            .content,
        "Hello!"
    );
}

#[tokio::test]
async fn mid_stream_failure_becomes_agent_prefixed_reply() {
    let (workflow, _client) = workflow_with(
        vec![Scripted::Stream(vec![
            Ok(StreamChunk::content("partial")),
            Err(TroupeError::api("stream dropped")),
        ])],
        true,
    );
    let mut session = workflow.new_session();

    let outcome = workflow
        .process(&mut session, "@analysis evaluate this")
        .await
        .unwrap();

    assert!(outcome.reply.starts_with("Idea Analysis Agent:"));
    assert!(outcome.reply.contains("stream dropped"));
    assert!(!outcome.streamed);
}

#[tokio::test]
async fn tool_loop_budget_falls_back_to_synthesis() {
    // The coordinator keeps calling get_plan_status past the round budget;
    // the workflow then asks for a synthesis instead of looping forever
    let mut script: Vec<Scripted> = Vec::new();
    for i in 0..8 {
        script.push(Scripted::Reply(completion_with_tool_call(
            "get_plan_status",
            &format!("call_{}", i),
            json!({}),
        )));
    }
    script.push(Scripted::Reply(ChatCompletion::text(
        "I checked the plan status repeatedly; there is no plan yet.",
    )));

    let (workflow, client) = workflow_with(script, false);
    let mut session = workflow.new_session();

    let outcome = workflow.process(&mut session, "status?").await.unwrap();

    assert!(outcome.reply.contains("no plan yet"));
    // 8 tool rounds + 1 synthesis call
    assert_eq!(client.requests().len(), 9);
}
