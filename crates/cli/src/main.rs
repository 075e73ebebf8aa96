// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! codemachine - runs a user-authored template through the workflow
//! execution engine.

mod stdin_input;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use codemachine_adapters::{EngineRegistry, SubprocessEngine};
use codemachine_core::SystemClock;
use codemachine_engine::{run, EventBus, RunOptions, SubAgentPolicy};

#[derive(Parser)]
#[command(
    name = "codemachine",
    version,
    about = "Run a user-authored template through the CodeMachine workflow engine"
)]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Template file to run (TOML or HCL); omit to resume the last selection
    #[arg(long)]
    template: Option<PathBuf>,

    /// Track to select within the template
    #[arg(long)]
    track: Option<String>,

    /// A condition to select (repeatable)
    #[arg(long = "condition")]
    conditions: Vec<String>,

    /// Run post-step input through a controller agent instead of a human
    #[arg(long)]
    autonomous: bool,

    /// Agent id of the controller, required when --autonomous is set
    #[arg(long = "controller-agent")]
    controller_agent: Option<String>,

    /// Whether an autonomous controller keeps steering a step that spawns
    /// its own sub-agents, or yields to them
    #[arg(long = "controller-during-sub-agents", value_enum, default_value = "suspend")]
    controller_during_sub_agents: SubAgentPolicyArg,

    /// Path to the specification file, when the template requires one
    #[arg(long)]
    specification: Option<PathBuf>,

    /// The program invoked for every step's default engine
    #[arg(long = "engine-cmd", env = "CODEMACHINE_ENGINE_CMD")]
    engine_cmd: String,

    /// Arguments passed to --engine-cmd (repeatable)
    #[arg(long = "engine-arg")]
    engine_args: Vec<String>,

    /// Id the template's steps refer to via `engine_id`
    #[arg(long = "engine-id", default_value = "default")]
    engine_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SubAgentPolicyArg {
    Run,
    Suspend,
}

impl From<SubAgentPolicyArg> for SubAgentPolicy {
    fn from(value: SubAgentPolicyArg) -> Self {
        match value {
            SubAgentPolicyArg::Run => SubAgentPolicy::Run,
            SubAgentPolicyArg::Suspend => SubAgentPolicy::Suspend,
        }
    }
}

fn validate(cli: &Cli) -> Result<()> {
    if cli.autonomous && cli.controller_agent.is_none() {
        anyhow::bail!("--autonomous requires --controller-agent");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("cannot change to directory '{}'", dir.display()))?;
    }

    validate(&cli)?;

    let engines = Arc::new(EngineRegistry::new());
    engines.register(Arc::new(SubprocessEngine::new(
        cli.engine_id.clone(),
        cli.engine_cmd.clone(),
        cli.engine_args.clone(),
    )));

    let events = Arc::new(EventBus::new());
    terminal::install(&events);

    let options = RunOptions {
        cwd: Some(".".to_string()),
        template_path: cli.template.map(|p| p.display().to_string()),
        specification_path: cli.specification.map(|p| p.display().to_string()),
        track: cli.track,
        conditions: cli.conditions,
        autonomous: cli.autonomous,
        controller_agent: cli.controller_agent,
        controller_during_sub_agents: cli.controller_during_sub_agents.into(),
        engines,
        clock: Arc::new(SystemClock),
        input: stdin_input::spawn(),
        events,
    };

    let outcome = run(options).await?;
    std::process::exit(outcome.exit_code);
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
