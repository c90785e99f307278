//! Mojo Plugin System
//!
//! Lets build plugins ("mojos") be written against a small adapter:
//! - Metadata registry (goal, phase, description, parameters)
//! - Parameter binding from a host context
//! - Execution wrapper that turns every outcome into a reportable result

mod traits;
mod registry;
mod context;
mod binder;
mod execute;

pub use traits::{Mojo, MojoDescriptor, MojoFailure, MetaField, ParameterSpec, ParamOptions, Outputs};
pub use registry::{MojoRegistry, Declarer, PluginType};
pub use context::{HostContext, Log, Level, LogEntry, RecordingLog, TracingLog};
pub use binder::{bind, BoundParams};
pub use execute::{run, ExecutionResult, ExecutionState, Failure, FailureKind, MojoInstance};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        Mojo, MojoDescriptor, MojoFailure, ParamOptions, Outputs,
        Declarer, BoundParams, HostContext, Log, MojoRegistry,
    };
    pub use mojo_core::prelude::*;
}
