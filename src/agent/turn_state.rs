//! Turn loop state
//!
//! Tracks one coordinator turn's tool loop: round counter, observations
//! from executed tools, and the final answer once the model produces one.

/// State of the coordinator tool loop for a single turn
#[derive(Debug, Clone)]
pub struct TurnState {
    /// Current round number (0-indexed)
    pub round: usize,
    /// Maximum allowed rounds
    pub max_rounds: usize,
    /// Observations collected from tool executions
    pub observations: Vec<Observation>,
    /// Final answer once the model stops calling tools
    pub final_answer: Option<String>,
}

impl TurnState {
    /// Create a new turn state with the given round budget
    pub fn new(max_rounds: usize) -> Self {
        Self {
            round: 0,
            max_rounds,
            observations: Vec::new(),
            final_answer: None,
        }
    }

    /// Check if the loop should continue
    pub fn should_continue(&self) -> bool {
        self.round < self.max_rounds && self.final_answer.is_none()
    }

    /// Increment the round counter
    pub fn next_round(&mut self) {
        self.round += 1;
    }

    /// Add an observation from a tool execution
    pub fn add_observation(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Format observations for a synthesis prompt
    pub fn format_observations(&self) -> String {
        if self.observations.is_empty() {
            return String::new();
        }

        let mut output = String::from("## Tool observations\n");
        for (i, obs) in self.observations.iter().enumerate() {
            output.push_str(&format!(
                "\n### Observation {} ({})\n{}\n",
                i + 1,
                obs.tool_name,
                obs.output
            ));
        }
        output
    }
}

/// An observation from a tool execution
#[derive(Debug, Clone)]
pub struct Observation {
    /// Name of the tool that produced this observation
    pub tool_name: String,
    /// Whether the tool execution succeeded
    pub success: bool,
    /// Acknowledgment or error text
    pub output: String,
}

impl Observation {
    /// Create a successful observation
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
        }
    }

    /// Create an error observation
    pub fn error(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: error.into(),
        }
    }
}
