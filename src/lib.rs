//! Troupe - Multi-Agent Chat Orchestrator
//!
//! A terminal chat application that routes conversations across a roster
//! of prompt-defined agent personas, backed by a hosted chat-completion
//! API (OpenRouter).
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model client abstraction with an OpenRouter implementation
//! - **Agent**: Personas, the registry, and the turn workflow
//! - **Session**: Per-conversation state - routing, history, plan
//! - **Tools**: The coordinating agent's plan toolkit
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use troupe::{Config, Workflow};
//!
//! #[tokio::main]
//! async fn main() {
//!     let workflow = Workflow::new(Config::load()).unwrap();
//!     let mut session = workflow.new_session();
//!
//!     let outcome = workflow
//!         .process(&mut session, "@ideation five ideas for a rainy saturday")
//!         .await
//!         .unwrap();
//!     println!("[{}] {}", outcome.agent, outcome.reply);
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod session;
pub mod tools;

// Re-export commonly used items
pub use agent::{builtin_registry, AgentProfile, AgentRegistry, TurnOutcome, Workflow};
pub use cli::Repl;
pub use core::{Config, Result, TroupeError};
pub use session::Session;
