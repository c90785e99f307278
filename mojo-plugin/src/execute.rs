//! Execution wrapper
//!
//! Runs a bound mojo exactly once and turns every outcome into an
//! `ExecutionResult`. Failures are also written to the host's error
//! channel, once per run.

use crate::{BoundParams, Log, Mojo, MojoDescriptor, MojoFailure, Outputs};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Lifecycle of one mojo execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Ready,
    Running,
    Succeeded,
    FailedDomain,
    FailedUnexpected,
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionState::Ready | ExecutionState::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Intentional build failure raised by the mojo
    Domain,
    /// Any other error or a panic
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Source chain or panic location, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of one mojo execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionResult {
    Success {
        goal: String,
        outputs: Outputs,
    },
    Failure {
        goal: String,
        #[serde(flatten)]
        failure: Failure,
    },
}

impl ExecutionResult {
    pub fn goal(&self) -> &str {
        match self {
            ExecutionResult::Success { goal, .. } | ExecutionResult::Failure { goal, .. } => goal,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ExecutionResult::Failure { failure, .. } => Some(failure),
            ExecutionResult::Success { .. } => None,
        }
    }

    pub fn outputs(&self) -> Option<&Outputs> {
        match self {
            ExecutionResult::Success { outputs, .. } => Some(outputs),
            ExecutionResult::Failure { .. } => None,
        }
    }

    pub fn state(&self) -> ExecutionState {
        match self.failure().map(|f| f.kind) {
            None => ExecutionState::Succeeded,
            Some(FailureKind::Domain) => ExecutionState::FailedDomain,
            Some(FailureKind::Unexpected) => ExecutionState::FailedUnexpected,
        }
    }
}

/// A bound, single-use mojo
pub struct MojoInstance {
    descriptor: Arc<MojoDescriptor>,
    params: BoundParams,
    mojo: Box<dyn Mojo>,
}

impl MojoInstance {
    pub fn new(descriptor: Arc<MojoDescriptor>, params: BoundParams, mojo: Box<dyn Mojo>) -> Self {
        Self { descriptor, params, mojo }
    }

    pub fn descriptor(&self) -> &MojoDescriptor {
        &self.descriptor
    }

    pub fn params(&self) -> &BoundParams {
        &self.params
    }

    /// Consumes the instance; a mojo runs at most once
    pub fn run(self, log: &dyn Log) -> ExecutionResult {
        run(self, log)
    }
}

impl std::fmt::Debug for MojoInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MojoInstance")
            .field("goal", &self.descriptor.goal)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

fn source_chain(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        causes.push(format!("caused by: {}", cause));
        current = cause.source();
    }
    if causes.is_empty() {
        None
    } else {
        Some(causes.join("\n"))
    }
}

fn classify(failure: MojoFailure) -> Failure {
    match failure {
        MojoFailure::Plugin(err) => Failure {
            kind: FailureKind::Domain,
            message: err.message,
            code: Some(err.code),
            detail: err.suggestion,
        },
        MojoFailure::Io(err) => Failure {
            kind: FailureKind::Unexpected,
            message: format!("I/O error: {}", err),
            code: None,
            detail: source_chain(&err).or_else(|| Some(format!("kind: {:?}", err.kind()))),
        },
        MojoFailure::Other(err) => Failure {
            kind: FailureKind::Unexpected,
            message: err.to_string(),
            code: None,
            detail: source_chain(err.as_ref()),
        },
    }
}

fn report(goal: &str, failure: &Failure, log: &dyn Log) {
    match failure.kind {
        FailureKind::Domain => log.error(&failure.message),
        FailureKind::Unexpected => {
            let mut text = format!("Unexpected failure in goal '{}': {}", goal, failure.message);
            if let Some(detail) = &failure.detail {
                text.push('\n');
                text.push_str(detail);
            }
            log.error(&text);
        }
    }
}

/// Execute `instance` and normalize its outcome
pub fn run(instance: MojoInstance, log: &dyn Log) -> ExecutionResult {
    let MojoInstance { descriptor, params, mojo } = instance;
    let goal = descriptor.goal.clone();
    tracing::debug!(goal = %goal, state = ?ExecutionState::Running, "executing mojo");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| mojo.execute(&params, log)));

    let failure = match outcome {
        Ok(Ok(outputs)) => {
            tracing::debug!(goal = %goal, state = ?ExecutionState::Succeeded, "mojo finished");
            return ExecutionResult::Success {
                goal,
                outputs: outputs.unwrap_or_default(),
            };
        }
        Ok(Err(err)) => classify(err),
        Err(payload) => Failure {
            kind: FailureKind::Unexpected,
            message: format!("panicked: {}", panic_message(payload.as_ref())),
            code: None,
            detail: Some(format!("panic unwound out of execute() for goal '{}'", goal)),
        },
    };

    tracing::warn!(goal = %goal, kind = ?failure.kind, message = %failure.message, "mojo failed");
    report(&goal, &failure, log);
    ExecutionResult::Failure { goal, failure }
}
