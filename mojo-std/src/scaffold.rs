//! `scaffold` goal: metadata only, no `execute`

use mojo_plugin::prelude::*;

#[derive(Debug, Default)]
pub struct UnimplementedMojo;

impl Mojo for UnimplementedMojo {
    fn declare(decl: &mut Declarer<'_>) {
        decl.goal("scaffold")
            .phase("generate-sources")
            .description("Declared but not implemented yet")
            .date("since", ParamOptions::new().expression("scaffold.since"));
    }
}
