//! Agent registry - maps shorthand keys to registered agents
//!
//! Built once at startup from a static roster and shared read-only across
//! sessions. Registration is additive; nothing is ever removed at runtime.

use std::collections::HashMap;

use crate::agent::profile::AgentProfile;

/// One registered agent: key, display name, persona
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    /// Lowercased shorthand used in `@key` mentions
    pub key: String,
    /// Human-facing name used in prompts and replies
    pub display_name: String,
    /// Persona configuration
    pub profile: AgentProfile,
    /// Whether this agent carries the plan toolkit
    pub coordinator: bool,
}

impl AgentDefinition {
    /// Create a definition; the key is lowercased
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        profile: AgentProfile,
    ) -> Self {
        Self {
            key: key.into().to_lowercase(),
            display_name: display_name.into(),
            profile,
            coordinator: false,
        }
    }

    /// Mark this agent as the coordinating agent
    pub fn coordinator(mut self) -> Self {
        self.coordinator = true;
        self
    }
}

/// Registry of available agents
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentDefinition>,
    default_key: String,
}

impl AgentRegistry {
    /// Create an empty registry with the given default agent key
    pub fn new(default_key: impl Into<String>) -> Self {
        Self {
            agents: HashMap::new(),
            default_key: default_key.into().to_lowercase(),
        }
    }

    /// Register an agent. Last registration wins on key collision.
    pub fn register(&mut self, definition: AgentDefinition) {
        self.agents.insert(definition.key.clone(), definition);
    }

    /// Look up an agent by key, case-insensitively
    pub fn get(&self, key: &str) -> Option<&AgentDefinition> {
        self.agents.get(&key.to_lowercase())
    }

    /// Whether the key names a registered agent
    pub fn contains(&self, key: &str) -> bool {
        self.agents.contains_key(&key.to_lowercase())
    }

    /// Key of the agent that answers unrouted messages
    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// The default agent's definition
    ///
    /// The roster constructor guarantees the default is registered.
    pub fn default_agent(&self) -> Option<&AgentDefinition> {
        self.agents.get(&self.default_key)
    }

    /// All registered keys, sorted for stable display
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.agents.keys().map(|k| k.as_str()).collect();
        keys.sort();
        keys
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Render the roster as display lines for prompts and the CLI
    pub fn roster_summary(&self) -> String {
        let mut lines = Vec::with_capacity(self.agents.len());
        for key in self.keys() {
            let def = &self.agents[key];
            lines.push(format!(
                "- @{} ({}): {}",
                def.key, def.display_name, def.profile.role
            ));
        }
        lines.join("\n")
    }
}
