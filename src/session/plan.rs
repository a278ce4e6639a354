//! Session plan state
//!
//! The mutable record of a decomposed task: overall status, ordered steps,
//! per-agent assignments, and collected results. One plan per session at
//! most; steps are append-only and addressed by stable index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Overall plan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Created,
    InProgress,
    Completed,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Created => write!(f, "created"),
            PlanStatus::InProgress => write!(f, "in_progress"),
            PlanStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(PlanStatus::Created),
            "in_progress" | "in progress" => Ok(PlanStatus::InProgress),
            "completed" | "done" => Ok(PlanStatus::Completed),
            other => Err(format!("unknown plan status '{}'", other)),
        }
    }
}

/// Status of one plan step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
}

impl StepStatus {
    /// Single-character indicator used in status reports
    pub fn indicator(&self) -> &'static str {
        match self {
            StepStatus::Pending => "·",
            StepStatus::Assigned => "→",
            StepStatus::InProgress => "▸",
            StepStatus::Completed => "✓",
        }
    }
}

/// One step of the plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// What this step accomplishes
    pub description: String,
    /// Agent responsible, once one is assigned
    pub assigned_agent: Option<String>,
    /// Current status
    pub status: StepStatus,
    /// Result text, once the step completes
    pub result: Option<String>,
    /// When the step was added
    pub created_at: DateTime<Utc>,
}

impl Step {
    fn new(description: impl Into<String>, assigned_agent: Option<String>) -> Self {
        let status = if assigned_agent.is_some() {
            StepStatus::Assigned
        } else {
            StepStatus::Pending
        };
        Self {
            description: description.into(),
            assigned_agent,
            status,
            result: None,
            created_at: Utc::now(),
        }
    }
}

/// An assignment record for one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Task text, when assigned through `assign_task`
    pub task: Option<String>,
    /// Step index the assignment points at, when known
    pub step_index: Option<usize>,
    /// When the assignment was made
    pub assigned_at: DateTime<Utc>,
}

/// A recorded result from one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// Full result text; never truncated in storage
    pub result: String,
    /// Step index the result belongs to, when known
    pub step_index: Option<usize>,
    /// When the result was recorded
    pub completed_at: DateTime<Utc>,
}

/// The per-session plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// The request the plan answers
    pub user_request: String,
    /// Free-form plan narrative; updates are appended with timestamps
    pub plan_details: String,
    /// When the plan was created
    pub created_at: DateTime<Utc>,
    /// Overall status
    pub status: PlanStatus,
    /// Ordered steps; append-only
    pub steps: Vec<Step>,
    /// Latest assignment per agent name; last write wins
    pub assignments: HashMap<String, Assignment>,
    /// Latest recorded result per agent name
    pub results: HashMap<String, AgentResult>,
}

impl Plan {
    /// Create a fresh plan for a request
    pub fn new(user_request: impl Into<String>, plan_details: impl Into<String>) -> Self {
        Self {
            user_request: user_request.into(),
            plan_details: plan_details.into(),
            created_at: Utc::now(),
            status: PlanStatus::Created,
            steps: Vec::new(),
            assignments: HashMap::new(),
            results: HashMap::new(),
        }
    }

    /// Append a timestamped note and optionally overwrite the status
    pub fn apply_update(&mut self, updates: &str, status: Option<PlanStatus>) {
        self.plan_details
            .push_str(&format!("\n\nUpdate ({}): {}", Utc::now().to_rfc3339(), updates));
        if let Some(status) = status {
            self.status = status;
        }
    }

    /// Append a step; records the assignment when an agent is named.
    /// Returns the new step's index.
    pub fn add_step(
        &mut self,
        description: impl Into<String>,
        assigned_agent: Option<String>,
    ) -> usize {
        let index = self.steps.len();
        self.steps.push(Step::new(description, assigned_agent.clone()));

        if let Some(agent) = assigned_agent {
            self.assignments.insert(
                agent,
                Assignment {
                    task: None,
                    step_index: Some(index),
                    assigned_at: Utc::now(),
                },
            );
        }

        index
    }

    /// Record an assignment for an agent; links the step when the index is
    /// in bounds, silently skips the link otherwise.
    pub fn assign(&mut self, agent: impl Into<String>, task: impl Into<String>, step_index: Option<usize>) {
        let agent = agent.into();
        let linked = step_index.filter(|&i| i < self.steps.len());

        self.assignments.insert(
            agent.clone(),
            Assignment {
                task: Some(task.into()),
                step_index: linked,
                assigned_at: Utc::now(),
            },
        );

        if let Some(i) = linked {
            self.steps[i].assigned_agent = Some(agent);
            self.steps[i].status = StepStatus::Assigned;
        }
    }

    /// Record a result for an agent; marks the step completed when the
    /// index is in bounds.
    pub fn record(&mut self, agent: impl Into<String>, result: impl Into<String>, step_index: Option<usize>) {
        let agent = agent.into();
        let result = result.into();
        let linked = step_index.filter(|&i| i < self.steps.len());

        if let Some(i) = linked {
            self.steps[i].status = StepStatus::Completed;
            self.steps[i].result = Some(result.clone());
        }

        self.results.insert(
            agent,
            AgentResult {
                result,
                step_index: linked,
                completed_at: Utc::now(),
            },
        );
    }

    /// Render the human-readable status report
    pub fn render_status(&self) -> String {
        let mut report = format!(
            "Current plan\n\
             - Request: {}\n\
             - Status: {}\n\
             - Created: {}\n\
             - Steps: {}\n\n\
             Details:\n{}\n",
            self.user_request,
            self.status,
            self.created_at.to_rfc3339(),
            self.steps.len(),
            self.plan_details,
        );

        if !self.steps.is_empty() {
            report.push_str("\nSteps:\n");
            for (i, step) in self.steps.iter().enumerate() {
                let agent_info = step
                    .assigned_agent
                    .as_deref()
                    .map(|a| format!(" (assigned to {})", a))
                    .unwrap_or_default();
                report.push_str(&format!(
                    "{}. {} {}{}\n",
                    i + 1,
                    step.status.indicator(),
                    step.description,
                    agent_info
                ));
            }
        }

        report
    }
}
