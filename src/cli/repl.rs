//! Interactive REPL for Troupe
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::agent::Workflow;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};
use crate::session::Session;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    workflow: Workflow,
    session: Session,
    session_path: PathBuf,
}

impl Repl {
    /// Create a REPL with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let workflow = Workflow::new(config)?;

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let session_path = cwd.join(".troupe").join("session.json");

        // Resume history from a previous run when one exists
        let session = if session_path.exists() {
            match Session::load_from(
                &session_path,
                workflow.default_agent_key(),
                workflow.config().session.max_history,
            ) {
                Ok(session) => {
                    println!("Loaded previous session from .troupe/session.json");
                    session
                }
                Err(e) => {
                    warn!(error = %e, "failed to load session, starting fresh");
                    workflow.new_session()
                }
            }
        } else {
            workflow.new_session()
        };

        Ok(Self {
            workflow,
            session,
            session_path,
        })
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, &self.workflow, &mut self.session) {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Clear) => {
                    println!("Session cleared.\n");
                    continue;
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                    continue;
                }
                Ok(CommandResult::Continue(input)) => {
                    self.process_turn(&input).await;
                }
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Run one chat turn and print the reply
    async fn process_turn(&mut self, input: &str) {
        match self.workflow.process(&mut self.session, input).await {
            Ok(outcome) => {
                let display_name = self
                    .workflow
                    .registry()
                    .get(&outcome.agent)
                    .map(|d| d.display_name.clone())
                    .unwrap_or_else(|| outcome.agent.clone());

                if outcome.streamed && self.workflow.config().streaming.print_tokens {
                    // Tokens already went to stdout during the turn
                    println!("\n");
                } else {
                    println!("\n{}:\n{}\n", display_name, outcome.reply);
                }

                if let Err(e) = self.session.save_to(&self.session_path) {
                    warn!(error = %e, "failed to persist session");
                }
            }
            Err(e) => {
                eprintln!("\nError: {}\n", e);
            }
        }
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.workflow.config();

        println!(
            "\nTroupe - multi-agent chat\n\
             ──────────────────────────────────────\n\
             Model:   {}\n\
             Agents:  {}\n\
             Default: @{}\n\n\
             Type 'help' for commands, or start a message with @agent\n\
             to talk to a specific agent.\n",
            config.model.name,
            self.workflow.registry().len(),
            self.workflow.registry().default_key(),
        );
    }
}
