//! Mojo Standard Library
//!
//! Sample mojos written against the adapter.

mod echo;
mod find_todo;
mod scaffold;

pub use echo::EchoMojo;
pub use find_todo::{scan, FindTodoMojo, TodoHit};
pub use scaffold::UnimplementedMojo;

use mojo_plugin::MojoRegistry;

/// Load the sample mojos into registry
pub fn load_standard_library(registry: MojoRegistry) -> MojoRegistry {
    registry
        .with_mojo::<EchoMojo>()
        .with_mojo::<FindTodoMojo>()
        .with_mojo::<UnimplementedMojo>()
}

/// Create registry with the sample mojos
pub fn standard_registry() -> MojoRegistry {
    load_standard_library(MojoRegistry::new())
}
