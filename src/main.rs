//! Troupe - Multi-Agent Chat Orchestrator
//!
//! Main entry point for the CLI application.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use troupe::{Config, Repl, Workflow};

/// Troupe - Multi-Agent Chat Orchestrator
#[derive(Parser, Debug)]
#[command(name = "troupe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (provider/model form)
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long)]
    base_url: Option<String>,

    /// Agent that answers unrouted messages
    #[arg(long, short = 'a')]
    agent: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Disable streaming output
    #[arg(long)]
    no_stream: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("troupe=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.model.name = model.clone();
    }

    if let Some(ref base_url) = args.base_url {
        config.api.base_url = base_url.clone();
    }

    if let Some(ref agent) = args.agent {
        config.session.default_agent = agent.to_lowercase();
    }

    if args.debug {
        config.session.debug = true;
    }

    if args.no_stream {
        config.streaming.enabled = false;
    }

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let workflow = Workflow::new(config)?;
        let mut session = workflow.new_session();

        let outcome = workflow.process(&mut session, &prompt).await?;
        if outcome.streamed {
            println!();
        } else {
            println!("{}", outcome.reply);
        }
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config)?;
    repl.run().await?;

    Ok(())
}
