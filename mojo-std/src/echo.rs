//! `test` goal: echoes its one property

use mojo_plugin::prelude::*;

#[derive(Debug, Default)]
pub struct EchoMojo;

impl Mojo for EchoMojo {
    fn declare(decl: &mut Declarer<'_>) {
        decl.goal("test")
            .phase("validate")
            .description("Prints the value of `prop`")
            .string(
                "prop",
                ParamOptions::new()
                    .expression("prop")
                    .default_value("nothing")
                    .required()
                    .description("Value to print"),
            );
    }

    fn execute(&self, params: &BoundParams, log: &dyn Log) -> Result<Option<Outputs>, MojoFailure> {
        let prop = params.require_text("prop")?;
        log.info(&format!("prop: {}", prop));

        let mut out = Outputs::new();
        out.insert("prop".to_string(), prop.into());
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mojo_plugin::RecordingLog;

    fn registry() -> MojoRegistry {
        MojoRegistry::new().with_mojo::<EchoMojo>()
    }

    #[test]
    fn test_echo_default() {
        let log = RecordingLog::new();
        let result = registry().instantiate("test", &HostContext::new()).unwrap().run(&log);
        assert_eq!(result.outputs().unwrap()["prop"], "nothing");
        assert_eq!(log.infos(), vec!["prop: nothing"]);
    }

    #[test]
    fn test_echo_from_host() {
        let log = RecordingLog::new();
        let host = HostContext::new().with("prop", "hi");
        let result = registry().instantiate("test", &host).unwrap().run(&log);
        assert_eq!(result.outputs().unwrap()["prop"], "hi");
    }
}
