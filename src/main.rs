use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tempo::agent::AgentStatus;
use tempo::config::Config;
use tempo::engine::WorkflowEngine;
use tempo::phase::Phase;
use tempo::{tlog, tlog_error, Result};

/// Tempo - workflow-state engine for multi-agent software development
#[derive(Parser, Debug)]
#[command(name = "tempo")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    TEMPO_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.tempo/tempo.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the current phase, completed phases, and agent progress
    Status,

    /// Print the recommended next action for this project
    NextStep,

    /// Move the workflow to a phase (forward or backward)
    Phase {
        /// Target phase: 1-6 or 5.5
        phase: String,
    },

    /// Mark a phase as complete (must be the current phase)
    Complete {
        /// Phase to complete: 1-6 or 5.5
        phase: String,
    },

    /// Manage agents for the parallel implementation phase
    Agent {
        #[command(subcommand)]
        action: AgentCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum AgentCommand {
    /// Register an agent role (only valid during phase 4)
    Add {
        /// Role description, e.g. "backend" or "frontend"
        role: String,
    },

    /// Report an agent's progress
    Update {
        /// Agent id as shown by `tempo status`
        id: u64,

        /// One of: not_started, in_progress, blocked, done
        status: AgentStatus,
    },

    /// List registered agents
    List,
}

fn main() {
    let cli = Cli::parse();
    tempo::log::init_with_debug(cli.debug);

    if let Err(e) = run(cli) {
        tlog_error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let project_dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config = Config::load()?;
    let engine = WorkflowEngine::new(&project_dir, &config);

    match cli.command {
        Command::Status => run_status(&engine),
        Command::NextStep => run_next_step(&engine),
        Command::Phase { phase } => run_phase(&engine, &phase),
        Command::Complete { phase } => run_complete(&engine, &phase),
        Command::Agent { action } => run_agent(&engine, action),
    }
}

fn run_status(engine: &WorkflowEngine) -> Result<()> {
    let state = engine.load()?;
    println!("{}", engine.status(&state));
    Ok(())
}

fn run_next_step(engine: &WorkflowEngine) -> Result<()> {
    let state = engine.load()?;
    println!("{}", engine.next_step(&state));
    Ok(())
}

fn run_phase(engine: &WorkflowEngine, phase: &str) -> Result<()> {
    let target: Phase = phase.parse()?;
    let mut state = engine.load()?;
    engine.advance_phase(&mut state, target)?;
    println!(
        "Now in phase {} ({})",
        state.current_phase,
        state.current_phase.name()
    );
    println!("Next: {}", engine.next_step(&state));
    Ok(())
}

fn run_complete(engine: &WorkflowEngine, phase: &str) -> Result<()> {
    let target: Phase = phase.parse()?;
    let mut state = engine.load()?;
    engine.complete_phase(&mut state, target)?;
    println!("Phase {} ({}) complete", target, target.name());
    println!("Next: {}", engine.next_step(&state));
    Ok(())
}

fn run_agent(engine: &WorkflowEngine, action: AgentCommand) -> Result<()> {
    match action {
        AgentCommand::Add { role } => {
            let mut state = engine.load()?;
            let id = engine.register_agent(&mut state, &role)?;
            println!("Registered agent #{} ({})", id, role);
        }
        AgentCommand::Update { id, status } => {
            let mut state = engine.load()?;
            engine.update_agent(&mut state, id, status)?;
            println!("Agent #{} -> {}", id, status);
            let (done, total) = state.agent_progress();
            println!("Progress: {}/{} agents done", done, total);
        }
        AgentCommand::List => {
            let state = engine.load()?;
            if state.agents.is_empty() {
                println!("No agents registered");
            } else {
                for agent in state.agents.values() {
                    println!("#{:<3} {:<20} {}", agent.id, agent.role, agent.status);
                }
            }
            tlog!("Agent list: {} registered", state.agents.len());
        }
    }
    Ok(())
}
