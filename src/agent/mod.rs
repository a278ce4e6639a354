//! Agent module - personas, registry, and the turn workflow

pub mod profile;
pub mod registry;
pub mod roster;
pub mod turn_state;
pub mod workflow;

pub use profile::AgentProfile;
pub use registry::{AgentDefinition, AgentRegistry};
pub use roster::builtin_registry;
pub use turn_state::{Observation, TurnState};
pub use workflow::{TurnOutcome, Workflow};
