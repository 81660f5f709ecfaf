use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod flows;
mod form;
mod invoker;
mod output;
mod prompt;
mod schema;
mod templates;

use cli::{Command, RootArgs, TutorArgs};
use config::{Backend, ModelConfig, Overrides};
use flows::mock_test::MockTestFlow;
use flows::notes::NotesFlow;
use flows::planner::PlannerFlow;
use flows::tutor::{Conversation, TutorFlow};
use flows::{Flow, FlowError};
use invoker::Invoker;
use output::TextReport;
use schema::FieldMap;

/// Exit status for a request that failed validation.
const EXIT_INVALID_REQUEST: u8 = 2;

const EXIT_COMMANDS: &[&str] = &["/exit", "/quit"];

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: RootArgs) -> Result<ExitCode> {
    let overrides = Overrides {
        lm_command: args.lm.clone(),
        model: args.model.clone(),
        lm_log: args.lm_log.clone(),
        lm_log_full: args.lm_log_full,
    };
    let file = config::locate_config_file(args.config.as_deref())?;
    let resolve = || -> Result<ModelConfig> {
        config::resolve(&overrides, file.as_ref(), &|name: &str| std::env::var(name).ok())
    };

    match args.command {
        Command::Config(config_args) => {
            let config = resolve()?;
            if config_args.json {
                println!("{}", serde_json::to_string_pretty(&config_json(&config))?);
            } else {
                println!("{}", config.describe());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Notes(notes) => {
            let fields = form::notes_fields(&notes)?;
            run_flow::<NotesFlow>(&resolve()?, &fields, notes.request.json)
        }
        Command::MockTest(mock) => {
            let fields = form::mock_test_fields(&mock)?;
            run_flow::<MockTestFlow>(&resolve()?, &fields, mock.request.json)
        }
        Command::Plan(plan) => {
            let fields = form::plan_fields(&plan)?;
            run_flow::<PlannerFlow>(&resolve()?, &fields, plan.request.json)
        }
        Command::Tutor(tutor) => {
            let config = resolve()?;
            if tutor.message.is_some() || tutor.request.input.is_some() {
                let fields = form::tutor_fields(&tutor)?;
                run_flow::<TutorFlow>(&config, &fields, tutor.request.json)
            } else {
                tutor_session(&config, &tutor)
            }
        }
    }
}

fn run_flow<F>(config: &ModelConfig, fields: &FieldMap, json: bool) -> Result<ExitCode>
where
    F: Flow,
    F::Response: Serialize + TextReport,
{
    let invoker = Invoker::from_config(config)?;
    match flows::run::<F>(&invoker, fields) {
        Ok(response) => {
            output::emit(&response, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Ok(report_failure(&err)),
    }
}

fn report_failure(err: &FlowError) -> ExitCode {
    eprintln!("{}", err.user_notice());
    if err.is_validation() {
        ExitCode::from(EXIT_INVALID_REQUEST)
    } else {
        tracing::debug!(error = %err, "flow failed");
        ExitCode::FAILURE
    }
}

/// Interactive tutor loop. History lives only for the session.
fn tutor_session(config: &ModelConfig, args: &TutorArgs) -> Result<ExitCode> {
    let invoker = Invoker::from_config(config)?;
    tracing::debug!(transport = invoker.transport_name(), "tutor session started");
    let mut conversation = Conversation::new();
    let interactive = io::stdin().is_terminal();
    if interactive {
        eprintln!("Vidyasagar is ready. Type /exit to leave.");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            io::stdout().flush().context("flush stdout")?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("read message")?;
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&message) {
            break;
        }
        match conversation.send(&invoker, message) {
            Ok(reply) => output::emit(&reply, args.request.json)?,
            Err(err) => {
                report_failure(&err);
            }
        }
    }
    tracing::debug!(turns = conversation.turns().len(), "tutor session ended");
    Ok(ExitCode::SUCCESS)
}

fn config_json(config: &ModelConfig) -> serde_json::Value {
    let mut value = match &config.backend {
        Backend::Gemini {
            model, api_base, ..
        } => json!({
            "backend": "gemini",
            "model": model,
            "api_base": api_base,
            "api_key": "(set)",
        }),
        Backend::Command { command } => json!({
            "backend": "command",
            "command": command,
        }),
    };
    if let Some(path) = &config.lm_log {
        value["lm_log"] = json!(path.display().to_string());
        value["lm_log_full"] = json!(config.lm_log_full);
    }
    value
}
