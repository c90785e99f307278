//! Mojo - scripted build-plugin adapter

pub use mojo_core::{AdapterError, MojoError, ParamKind, ParamValue};
pub use mojo_plugin::{
    ExecutionResult, ExecutionState, Failure, FailureKind, HostContext, Log, Mojo, MojoDescriptor,
    MojoRegistry, RecordingLog, TracingLog,
};

use serde_json::Value;
use std::sync::Arc;

/// Main adapter: a registry plus the host's log channel
pub struct Adapter {
    registry: Arc<MojoRegistry>,
    log: Arc<dyn Log>,
}

impl Adapter {
    pub fn new(registry: MojoRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            log: Arc::new(TracingLog),
        }
    }

    pub fn with_standard_library() -> Self {
        Self::new(mojo_std::standard_registry())
    }

    pub fn with_log(mut self, log: Arc<dyn Log>) -> Self {
        self.log = log;
        self
    }

    pub fn registry(&self) -> &MojoRegistry {
        &self.registry
    }

    pub fn describe(&self, goal: &str) -> Result<Arc<MojoDescriptor>, AdapterError> {
        self.registry.find_goal(goal)
    }

    /// Bind `goal` against `host` and run it once
    ///
    /// Binding errors are returned as-is; execution failures come back
    /// inside the `ExecutionResult`.
    pub fn execute(&self, goal: &str, host: &HostContext) -> Result<ExecutionResult, AdapterError> {
        let instance = self.registry.instantiate(goal, host)?;
        Ok(instance.run(self.log.as_ref()))
    }

    /// Run goals in order, continuing past failures
    pub fn execute_all<'a>(
        &self,
        goals: impl IntoIterator<Item = &'a str>,
        host: &HostContext,
    ) -> Vec<(String, Result<ExecutionResult, AdapterError>)> {
        goals
            .into_iter()
            .map(|goal| {
                let outcome = self.execute(goal, host);
                if let Err(e) = &outcome {
                    tracing::warn!(goal, error = %e, "mojo could not be instantiated");
                }
                (goal.to_string(), outcome)
            })
            .collect()
    }

    pub fn help(&self, goal: Option<&str>) -> Value {
        self.registry.help(goal)
    }

    pub fn list_goals(&self) -> Value {
        self.registry.list_goals()
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Self::with_standard_library()
    }
}

#[macro_export]
macro_rules! props {
    {} => { $crate::HostContext::new() };
    { $($key:expr => $value:expr),* $(,)? } => {{
        let mut ctx = $crate::HostContext::new();
        $(
            ctx.insert($key, $value);
        )*
        ctx
    }};
}
