//! Agent persona profiles
//!
//! A profile is static configuration: role, goal, and backstory text.
//! Profiles are built once at startup and never mutated.

use serde::{Deserialize, Serialize};

/// Persona description for one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// The primary role or function of the agent
    pub role: String,
    /// The main objective the agent should pursue
    pub goal: String,
    /// Background context and behavioral guidelines
    pub backstory: String,
}

impl AgentProfile {
    /// Create a profile from its three parts
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// Render the persona as a system prompt
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {role}.\n\nYour goal: {goal}\n\n{backstory}",
            role = self.role,
            goal = self.goal,
            backstory = self.backstory
        )
    }
}
