//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::Workflow;
use crate::core::Result;
use crate::session::Session;

/// Result of parsing a command
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Session was cleared
    Clear,
}

/// Parse and handle special commands
pub fn handle_command(
    input: &str,
    workflow: &Workflow,
    session: &mut Session,
) -> Result<CommandResult> {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "clear" | "reset" => {
            session.clear();
            Ok(CommandResult::Clear)
        }

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "agents" => Ok(CommandResult::Handled(format!(
            "Available agents:\n{}\n\nActive: @{}",
            workflow.registry().roster_summary(),
            session.active_agent()
        ))),

        "plan" => Ok(CommandResult::Handled(match session.plan() {
            Some(plan) => plan.render_status(),
            None => "No plan exists yet.".to_string(),
        })),

        "switch" => {
            if args.is_empty() {
                return Ok(CommandResult::Handled(
                    "Usage: switch <agent>\nExample: switch ideation".to_string(),
                ));
            }
            let key = args.trim_start_matches('@');
            if workflow.registry().contains(key) {
                session.set_active_agent(key);
                Ok(CommandResult::Handled(format!(
                    "Now talking to @{}",
                    key.to_lowercase()
                )))
            } else {
                Ok(CommandResult::Handled(format!(
                    "Unknown agent '{}'. Try 'agents' to see the roster.",
                    key
                )))
            }
        }

        "status" => {
            let config = workflow.config();
            let status = format!(
                "Troupe status:\n\
                 ─────────────────────────────\n\
                 Model:      {}\n\
                 Active:     @{}\n\
                 History:    {} messages\n\
                 Plan:       {}\n\
                 Streaming:  {}",
                config.model.name,
                session.active_agent(),
                session.conversation().len(),
                if session.plan().is_some() {
                    "present"
                } else {
                    "none"
                },
                if config.streaming.enabled { "on" } else { "off" },
            );
            Ok(CommandResult::Handled(status))
        }

        _ => {
            // Not a command, treat as normal input
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Help text for the REPL
fn help_text() -> String {
    "Commands:\n\
     ─────────────────────────────\n\
     help, ?          Show this help\n\
     agents           List the agent roster\n\
     switch <agent>   Talk to a different agent\n\
     plan             Show the current plan\n\
     status           Show session status\n\
     clear, reset     Clear history and plan\n\
     exit, quit, q    Leave\n\n\
     Start a message with @agent to route it, e.g.\n\
     @ideation give me five product ideas"
        .to_string()
}
