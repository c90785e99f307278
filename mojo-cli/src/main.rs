//! Mojo CLI host
//!
//! Commands:
//! - list: List registered goals
//! - describe: Print a goal's descriptor as JSON
//! - run: Bind and execute goals in order
//!
//! `run` prints one JSON line per goal on stdout. Exit status is 0 when every
//! goal succeeded, 1 when any failed with a domain error, 2 when any failed
//! unexpectedly or could not be instantiated.

mod config;
mod logging;

use clap::{Parser, Subcommand};
use mojo::{Adapter, AdapterError, ExecutionResult, FailureKind, MojoError};
use serde_json::json;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "mojo", version, about = "Run build-plugin mojos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List registered goals
    List,

    /// Print a goal's descriptor as JSON
    Describe { goal: String },

    /// Bind and execute goals in order
    Run {
        #[arg(required = true)]
        goals: Vec<String>,

        /// Host property, repeatable
        #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = config::parse_define)]
        define: Vec<(String, String)>,

        /// JSON properties file
        #[arg(long, env = "MOJO_PROPERTIES")]
        properties: Option<PathBuf>,

        /// Value of the `basedir` property, overriding the properties file
        /// (defaults to the current directory)
        #[arg(long)]
        basedir: Option<PathBuf>,

        /// Do not expose the process environment as `env.*` properties
        #[arg(long)]
        no_env: bool,
    },
}

/// Worst outcome seen so far, ordered by exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Outcome {
    Success = 0,
    DomainFailure = 1,
    Unexpected = 2,
}

fn outcome_of(result: &Result<ExecutionResult, AdapterError>) -> Outcome {
    match result {
        Ok(r) => match r.failure().map(|f| f.kind) {
            None => Outcome::Success,
            Some(FailureKind::Domain) => Outcome::DomainFailure,
            Some(FailureKind::Unexpected) => Outcome::Unexpected,
        },
        Err(_) => Outcome::Unexpected,
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::error!("Error serializing output: {}", e),
    }
}

fn error_json(goal: &str, err: AdapterError) -> serde_json::Value {
    json!({ "status": "error", "goal": goal, "error": MojoError::from(err) })
}

fn run(
    adapter: &Adapter,
    goals: &[String],
    define: &[(String, String)],
    properties: Option<PathBuf>,
    basedir: Option<PathBuf>,
    no_env: bool,
) -> ExitCode {
    let cwd = match basedir.clone().map_or_else(env::current_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!("Cannot determine current directory: {}", e);
            return ExitCode::from(Outcome::Unexpected as u8);
        }
    };
    // Non-UTF-8 entries are skipped
    let env_vars: Vec<(String, String)> = if no_env {
        Vec::new()
    } else {
        env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    };

    let host = match config::build_host_context(&cwd, basedir.as_deref(), env_vars, properties.as_deref(), define) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(Outcome::Unexpected as u8);
        }
    };
    tracing::debug!(properties = host.len(), "host context ready");

    let mut worst = Outcome::Success;
    for (goal, result) in adapter.execute_all(goals.iter().map(String::as_str), &host) {
        worst = worst.max(outcome_of(&result));
        match result {
            Ok(r) => match serde_json::to_value(&r) {
                Ok(v) => print_json(&v),
                Err(e) => tracing::error!("Error serializing result for {}: {}", goal, e),
            },
            Err(e) => {
                tracing::error!(goal = %goal, "{}", e);
                print_json(&error_json(&goal, e));
            }
        }
    }

    ExitCode::from(worst as u8)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let adapter = Adapter::with_standard_library();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "mojo host started");

    match cli.command {
        Command::List => {
            print_json(&adapter.list_goals());
            ExitCode::SUCCESS
        }
        Command::Describe { goal } => match adapter.describe(&goal) {
            Ok(d) => {
                print_json(&adapter.help(Some(d.goal.as_str())));
                ExitCode::SUCCESS
            }
            Err(e) => {
                print_json(&error_json(&goal, e));
                ExitCode::from(Outcome::Unexpected as u8)
            }
        },
        Command::Run { goals, define, properties, basedir, no_env } => {
            run(&adapter, &goals, &define, properties, basedir, no_env)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mojo::props;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_defines() {
        let cli = Cli::try_parse_from(["mojo", "run", "test", "find-todo", "-D", "prop=hi", "-D", "x=1"]).unwrap();
        match cli.command {
            Command::Run { goals, define, .. } => {
                assert_eq!(goals, vec!["test", "find-todo"]);
                assert_eq!(define[0], ("prop".to_string(), "hi".to_string()));
                assert_eq!(define.len(), 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_requires_goal() {
        assert!(Cli::try_parse_from(["mojo", "run"]).is_err());
    }

    #[test]
    fn test_outcome_ordering() {
        let adapter = Adapter::with_standard_library()
            .with_log(std::sync::Arc::new(mojo::RecordingLog::new()));
        let ok = adapter.execute("test", &props! {});
        let domain = adapter.execute("scaffold", &props! {});
        let missing = adapter.execute("nope", &props! {});

        assert_eq!(outcome_of(&ok), Outcome::Success);
        assert_eq!(outcome_of(&domain), Outcome::DomainFailure);
        assert_eq!(outcome_of(&missing), Outcome::Unexpected);
        assert_eq!(Outcome::DomainFailure.max(Outcome::Unexpected), Outcome::Unexpected);
    }
}
