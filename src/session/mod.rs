//! Session module - per-conversation mutable state
//!
//! A session owns its conversation history, its active-agent pointer, and
//! at most one plan. Sessions are never shared between conversations; the
//! `&mut` receiver on every mutation serializes turns by construction.

pub mod conversation;
pub mod plan;
pub mod router;

pub use conversation::Conversation;
pub use plan::{AgentResult, Assignment, Plan, PlanStatus, Step, StepStatus};
pub use router::route;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{Message, Result, TroupeError};

/// Per-conversation state
#[derive(Debug, Clone)]
pub struct Session {
    /// Stable identity for logging
    id: Uuid,
    /// Key of the agent answering unrouted messages
    active_agent: String,
    /// Chat history
    conversation: Conversation,
    /// The plan, once one is created
    plan: Option<Plan>,
}

/// On-disk form of a session: the history blob the chat front end
/// persists between runs. Role and content only; the plan and the
/// active-agent pointer do not survive a resume.
#[derive(Debug, Serialize, Deserialize)]
struct SessionBlob {
    messages: Vec<Message>,
}

impl Session {
    /// Create a fresh session
    pub fn new(default_agent: impl Into<String>, max_history: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            active_agent: default_agent.into().to_lowercase(),
            conversation: Conversation::new(max_history),
            plan: None,
        }
    }

    /// Rebuild a session from a persisted history blob
    pub fn resume(
        messages: Vec<Message>,
        default_agent: impl Into<String>,
        max_history: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            active_agent: default_agent.into().to_lowercase(),
            conversation: Conversation::from_messages(messages, max_history),
            plan: None,
        }
    }

    /// Session identity
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Key of the currently active agent
    pub fn active_agent(&self) -> &str {
        &self.active_agent
    }

    /// Point the session at a different agent
    pub fn set_active_agent(&mut self, key: impl Into<String>) {
        self.active_agent = key.into().to_lowercase();
    }

    /// The conversation history
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Mutable access to the conversation history
    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// The plan, if one exists
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    /// Mutable access to the plan, if one exists
    pub fn plan_mut(&mut self) -> Option<&mut Plan> {
        self.plan.as_mut()
    }

    /// Install a plan; rejects when one already exists
    pub fn create_plan(&mut self, plan: Plan) -> Result<()> {
        if self.plan.is_some() {
            return Err(TroupeError::PlanExists);
        }
        self.plan = Some(plan);
        Ok(())
    }

    /// Drop the plan, if any
    pub fn clear_plan(&mut self) {
        self.plan = None;
    }

    /// Drop all session state except identity and the active agent
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.plan = None;
    }

    /// Persist the history blob to disk
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let blob = SessionBlob {
            messages: self.conversation.to_messages(),
        };
        fs::write(path, serde_json::to_string_pretty(&blob)?)?;
        Ok(())
    }

    /// Rebuild a session from a history blob on disk
    pub fn load_from(
        path: impl AsRef<Path>,
        default_agent: impl Into<String>,
        max_history: usize,
    ) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let blob: SessionBlob = serde_json::from_str(&content)?;
        Ok(Self::resume(blob.messages, default_agent, max_history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new("Manager", 100);
        assert_eq!(session.active_agent(), "manager");
        assert!(session.plan().is_none());
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn test_create_plan_rejects_second() {
        let mut session = Session::new("manager", 100);
        session.create_plan(Plan::new("req", "details")).unwrap();

        let err = session.create_plan(Plan::new("other", "x")).unwrap_err();
        assert!(matches!(err, TroupeError::PlanExists));
        // First plan untouched
        assert_eq!(session.plan().unwrap().user_request, "req");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("troupe-test-{}", Uuid::new_v4()));
        let path = dir.join("session.json");

        let mut session = Session::new("manager", 100);
        session.set_active_agent("cto");
        session.conversation_mut().add_user("hello");
        session.conversation_mut().add_assistant("hi");
        session.create_plan(Plan::new("req", "details")).unwrap();
        session.save_to(&path).unwrap();

        let resumed = Session::load_from(&path, "manager", 100).unwrap();
        // History survives; plan and active agent reset
        assert_eq!(resumed.conversation().len(), 2);
        assert_eq!(resumed.active_agent(), "manager");
        assert!(resumed.plan().is_none());

        let _ = std::fs::remove_dir_all(dir);
    }
}
