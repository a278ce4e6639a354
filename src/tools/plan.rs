//! Plan toolkit - the coordinating agent's tools
//!
//! Exposes the plan operations as chat-completion tool definitions and
//! dispatches incoming calls against the session. Every operation returns
//! a short acknowledgment string; precondition failures come back as
//! errors for the caller to fold into the tool observation.

use serde_json::json;

use crate::agent::registry::AgentRegistry;
use crate::core::{Result, ToolCall, ToolDefinition, TroupeError};
use crate::session::{Plan, PlanStatus, Session};

/// Tool name the workflow intercepts for inline delegation; dispatch here
/// does not handle it.
pub const DELEGATE_TOOL: &str = "delegate_task";

/// How much result text the acknowledgment echoes back; stored state is
/// never truncated.
const RESULT_ECHO_LIMIT: usize = 100;

/// The coordinating agent's toolset
pub struct PlanToolkit;

impl PlanToolkit {
    pub fn new() -> Self {
        Self
    }

    /// Tool definitions advertised to the model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::function(
                "create_plan",
                "Create the plan for the user's request. Fails if a plan already exists.",
                json!({
                    "type": "object",
                    "properties": {
                        "user_request": {
                            "type": "string",
                            "description": "The user's request, in their words"
                        },
                        "plan_details": {
                            "type": "string",
                            "description": "The plan narrative: approach, phases, who does what"
                        }
                    },
                    "required": ["user_request", "plan_details"]
                }),
            ),
            ToolDefinition::function(
                "update_plan",
                "Append a progress note to the plan, optionally changing its status",
                json!({
                    "type": "object",
                    "properties": {
                        "updates": {
                            "type": "string",
                            "description": "What changed"
                        },
                        "status": {
                            "type": "string",
                            "enum": ["created", "in_progress", "completed"],
                            "description": "New overall status, if it changed"
                        }
                    },
                    "required": ["updates"]
                }),
            ),
            ToolDefinition::function(
                "add_plan_step",
                "Append a step to the plan, optionally assigning it to an agent",
                json!({
                    "type": "object",
                    "properties": {
                        "description": {
                            "type": "string",
                            "description": "What the step accomplishes"
                        },
                        "assigned_agent": {
                            "type": "string",
                            "description": "Agent responsible for the step"
                        }
                    },
                    "required": ["description"]
                }),
            ),
            ToolDefinition::function(
                "get_plan_status",
                "Get the current plan, its status, and every step",
                json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
            ToolDefinition::function(
                "assign_task",
                "Assign a task to an agent, optionally linking it to a plan step",
                json!({
                    "type": "object",
                    "properties": {
                        "agent_name": {
                            "type": "string",
                            "description": "Agent to assign the task to"
                        },
                        "task_description": {
                            "type": "string",
                            "description": "The task"
                        },
                        "step_index": {
                            "type": "integer",
                            "description": "Zero-based index of the plan step this task covers"
                        }
                    },
                    "required": ["agent_name", "task_description"]
                }),
            ),
            ToolDefinition::function(
                "record_result",
                "Record an agent's result, optionally completing a plan step",
                json!({
                    "type": "object",
                    "properties": {
                        "agent_name": {
                            "type": "string",
                            "description": "Agent the result came from"
                        },
                        "result": {
                            "type": "string",
                            "description": "The result text"
                        },
                        "step_index": {
                            "type": "integer",
                            "description": "Zero-based index of the completed step"
                        }
                    },
                    "required": ["agent_name", "result"]
                }),
            ),
            ToolDefinition::function(
                "list_agents",
                "List the available agents and what each is for",
                json!({
                    "type": "object",
                    "properties": {}
                }),
            ),
            ToolDefinition::function(
                DELEGATE_TOOL,
                "Hand a task to a specialist agent and get their answer back",
                json!({
                    "type": "object",
                    "properties": {
                        "agent_name": {
                            "type": "string",
                            "description": "Agent to run the task"
                        },
                        "task": {
                            "type": "string",
                            "description": "The task for the specialist"
                        }
                    },
                    "required": ["agent_name", "task"]
                }),
            ),
        ]
    }

    /// Execute a plan operation against the session.
    ///
    /// Returns the acknowledgment string on success. Precondition failures
    /// (`PlanMissing`, `PlanExists`) are errors; the workflow converts them
    /// to observation text so the turn continues.
    pub fn dispatch(
        &self,
        session: &mut Session,
        registry: &AgentRegistry,
        call: &ToolCall,
    ) -> Result<String> {
        match call.name.as_str() {
            "create_plan" => {
                let user_request = call.get_string("user_request").unwrap_or_default();
                let plan_details = call.get_string("plan_details").unwrap_or_default();

                session.create_plan(Plan::new(user_request, plan_details.clone()))?;
                Ok(format!("Plan created. Details: {}", plan_details))
            }

            "update_plan" => {
                let updates = call.get_string("updates").unwrap_or_default();
                let status = match call.get_string("status") {
                    Some(raw) => Some(
                        raw.parse::<PlanStatus>()
                            .map_err(TroupeError::Other)?,
                    ),
                    None => None,
                };

                let plan = session.plan_mut().ok_or(TroupeError::PlanMissing)?;
                plan.apply_update(&updates, status);
                Ok(format!("Plan updated. Status: {}", plan.status))
            }

            "add_plan_step" => {
                let description = call.get_string("description").unwrap_or_default();
                let assigned_agent = call.get_string("assigned_agent");

                let plan = session.plan_mut().ok_or(TroupeError::PlanMissing)?;
                let index = plan.add_step(description.clone(), assigned_agent.clone());

                let suffix = assigned_agent
                    .map(|a| format!(" (assigned to {})", a))
                    .unwrap_or_default();
                Ok(format!("Step {} added: {}{}", index + 1, description, suffix))
            }

            "get_plan_status" => Ok(match session.plan() {
                Some(plan) => plan.render_status(),
                // Informational, not an error
                None => "No plan exists yet.".to_string(),
            }),

            "assign_task" => {
                let agent_name = call.get_string("agent_name").unwrap_or_default();
                let task = call.get_string("task_description").unwrap_or_default();
                let step_index = call.get_index("step_index");

                let plan = session.plan_mut().ok_or(TroupeError::PlanMissing)?;
                plan.assign(agent_name.clone(), task.clone(), step_index);
                Ok(format!("Task assigned to {}: {}", agent_name, task))
            }

            "record_result" => {
                let agent_name = call.get_string("agent_name").unwrap_or_default();
                let result = call.get_string("result").unwrap_or_default();
                let step_index = call.get_index("step_index");

                let plan = session.plan_mut().ok_or(TroupeError::PlanMissing)?;
                plan.record(agent_name.clone(), result.clone(), step_index);

                let echo: String = if result.chars().count() > RESULT_ECHO_LIMIT {
                    let truncated: String = result.chars().take(RESULT_ECHO_LIMIT).collect();
                    format!("{}...", truncated)
                } else {
                    result
                };
                Ok(format!("Result recorded for {}: {}", agent_name, echo))
            }

            "list_agents" => Ok(format!("Available agents:\n{}", registry.roster_summary())),

            other => Err(TroupeError::other(format!("unknown tool '{}'", other))),
        }
    }
}

impl Default for PlanToolkit {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::roster::builtin_registry;
    use serde_json::json;

    fn setup() -> (PlanToolkit, Session, AgentRegistry) {
        (
            PlanToolkit::new(),
            Session::new("manager", 100),
            builtin_registry(),
        )
    }

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall::new(name, args)
    }

    #[test]
    fn test_create_then_status() {
        let (toolkit, mut session, registry) = setup();

        let ack = toolkit
            .dispatch(
                &mut session,
                &registry,
                &call("create_plan", json!({"user_request": "r", "plan_details": "d"})),
            )
            .unwrap();
        assert!(ack.contains("Plan created"));

        let status = toolkit
            .dispatch(&mut session, &registry, &call("get_plan_status", json!({})))
            .unwrap();
        assert!(status.contains("created"));
        assert!(status.contains("Steps: 0"));
    }

    #[test]
    fn test_create_twice_rejected() {
        let (toolkit, mut session, registry) = setup();
        let args = json!({"user_request": "r", "plan_details": "d"});

        toolkit
            .dispatch(&mut session, &registry, &call("create_plan", args.clone()))
            .unwrap();
        let err = toolkit
            .dispatch(&mut session, &registry, &call("create_plan", args))
            .unwrap_err();
        assert!(matches!(err, TroupeError::PlanExists));
    }

    #[test]
    fn test_operations_without_plan_are_rejected() {
        let (toolkit, mut session, registry) = setup();

        for (name, args) in [
            ("update_plan", json!({"updates": "x"})),
            ("add_plan_step", json!({"description": "x"})),
            ("assign_task", json!({"agent_name": "a", "task_description": "t"})),
            ("record_result", json!({"agent_name": "a", "result": "r"})),
        ] {
            let err = toolkit
                .dispatch(&mut session, &registry, &call(name, args))
                .unwrap_err();
            assert!(matches!(err, TroupeError::PlanMissing), "{} should reject", name);
        }

        // Status is informational either way
        let status = toolkit
            .dispatch(&mut session, &registry, &call("get_plan_status", json!({})))
            .unwrap();
        assert!(status.contains("No plan"));
    }

    #[test]
    fn test_step_and_result_flow() {
        let (toolkit, mut session, registry) = setup();
        toolkit
            .dispatch(
                &mut session,
                &registry,
                &call("create_plan", json!({"user_request": "r", "plan_details": "d"})),
            )
            .unwrap();

        toolkit
            .dispatch(&mut session, &registry, &call("add_plan_step", json!({"description": "x"})))
            .unwrap();
        toolkit
            .dispatch(
                &mut session,
                &registry,
                &call("add_plan_step", json!({"description": "y", "assigned_agent": "AgentA"})),
            )
            .unwrap();

        let plan = session.plan().unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.assignments["AgentA"].step_index, Some(1));

        toolkit
            .dispatch(
                &mut session,
                &registry,
                &call("record_result", json!({"agent_name": "AgentA", "result": "done", "step_index": 1})),
            )
            .unwrap();

        let plan = session.plan().unwrap();
        assert_eq!(plan.steps[1].result.as_deref(), Some("done"));
        assert_eq!(plan.steps[0].result, None);
    }

    #[test]
    fn test_record_result_echo_is_truncated() {
        let (toolkit, mut session, registry) = setup();
        toolkit
            .dispatch(
                &mut session,
                &registry,
                &call("create_plan", json!({"user_request": "r", "plan_details": "d"})),
            )
            .unwrap();

        let long = "x".repeat(300);
        let ack = toolkit
            .dispatch(
                &mut session,
                &registry,
                &call("record_result", json!({"agent_name": "A", "result": long})),
            )
            .unwrap();

        assert!(ack.ends_with("..."));
        assert!(ack.len() < 200);
        // Stored state keeps the full text
        assert_eq!(session.plan().unwrap().results["A"].result.len(), 300);
    }

    #[test]
    fn test_update_with_bad_status_is_an_error() {
        let (toolkit, mut session, registry) = setup();
        toolkit
            .dispatch(
                &mut session,
                &registry,
                &call("create_plan", json!({"user_request": "r", "plan_details": "d"})),
            )
            .unwrap();

        let err = toolkit
            .dispatch(
                &mut session,
                &registry,
                &call("update_plan", json!({"updates": "u", "status": "bogus"})),
            )
            .unwrap_err();
        assert!(matches!(err, TroupeError::Other(_)));
        // Plan untouched
        assert_eq!(session.plan().unwrap().status, PlanStatus::Created);
    }

    #[test]
    fn test_list_agents_renders_roster() {
        let (toolkit, mut session, registry) = setup();
        let out = toolkit
            .dispatch(&mut session, &registry, &call("list_agents", json!({})))
            .unwrap();
        assert!(out.contains("@ideation"));
        assert!(out.contains("@manager"));
    }
}
