//! Parameter binding
//!
//! Resolution order per parameter: expression key, alias key, default.
//! Values are stored under the declared name regardless of which source
//! supplied them.

use crate::{HostContext, MojoDescriptor, ParameterSpec};
use chrono::NaiveDate;
use mojo_core::{AdapterError, MojoError, ParamValue};
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolved parameter values of one mojo instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundParams {
    values: HashMap<String, ParamValue>,
}

impl BoundParams {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Text value, `None` if absent or not declared
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_text)
    }

    pub fn require_text(&self, name: &str) -> Result<&str, MojoError> {
        match self.get(name) {
            Some(ParamValue::Text(s)) => Ok(s),
            Some(ParamValue::Absent) => Err(MojoError::missing_parameter(name)),
            None => Err(MojoError::undefined_parameter(name)),
        }
    }

    pub fn is_absent(&self, name: &str) -> bool {
        matches!(self.get(name), Some(ParamValue::Absent))
    }

    pub fn file(&self, name: &str) -> Option<PathBuf> {
        self.text(name).map(PathBuf::from)
    }

    /// ISO `YYYY-MM-DD` date
    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>, MojoError> {
        match self.text(name) {
            Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| MojoError::invalid_parameter(name, "date (YYYY-MM-DD)", s)),
            None => Ok(None),
        }
    }

    /// Boolean switch; absent reads as `false`
    pub fn flag(&self, name: &str) -> Result<bool, MojoError> {
        let Some(s) = self.text(name) else {
            return Ok(false);
        };
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" | "" => Ok(false),
            _ => Err(MojoError::invalid_parameter(name, "boolean", s)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// JSON object view, absent values as `null`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.as_text().map_or(serde_json::Value::Null, |s| s.into())))
                .collect(),
        )
    }
}

fn resolve(spec: &ParameterSpec, host: &HostContext) -> Option<String> {
    spec.expression
        .as_deref()
        .and_then(|key| host.get(key))
        .or_else(|| spec.alias.as_deref().and_then(|key| host.get(key)))
        .or(spec.default_value.as_deref())
        .map(str::to_string)
}

/// Resolve every declared parameter of `descriptor` against `host`
pub fn bind(descriptor: &MojoDescriptor, host: &HostContext) -> Result<BoundParams, AdapterError> {
    let mut values = HashMap::with_capacity(descriptor.parameters.len());

    for spec in &descriptor.parameters {
        let value = match resolve(spec, host) {
            Some(v) => ParamValue::Text(v),
            None if spec.required => {
                tracing::debug!(goal = %descriptor.goal, param = %spec.name, "required parameter unresolved");
                return Err(AdapterError::MissingRequiredParameter(spec.name.clone()));
            }
            None => ParamValue::Absent,
        };
        values.insert(spec.name.clone(), value);
    }

    tracing::debug!(goal = %descriptor.goal, count = values.len(), "parameters bound");
    Ok(BoundParams { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParamOptions;
    use mojo_core::ParamKind;

    fn descriptor(params: Vec<(&str, ParamOptions)>) -> MojoDescriptor {
        MojoDescriptor {
            goal: "test".into(),
            parameters: params
                .into_iter()
                .map(|(name, opts)| opts.into_spec(ParamKind::String, name))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_satisfies_required() {
        let d = descriptor(vec![("prop", ParamOptions::new().default_value("nothing").required())]);
        let bound = bind(&d, &HostContext::new()).unwrap();
        assert_eq!(bound.text("prop"), Some("nothing"));
    }

    #[test]
    fn test_expression_from_host() {
        let d = descriptor(vec![("prop", ParamOptions::new().expression("someExpression"))]);
        let host = HostContext::new().with("someExpression", "hi");
        let bound = bind(&d, &host).unwrap();
        assert_eq!(bound.text("prop"), Some("hi"));
    }

    #[test]
    fn test_expression_beats_alias_and_default() {
        let d = descriptor(vec![(
            "prop",
            ParamOptions::new().expression("expr").alias("al").default_value("dflt"),
        )]);
        let host = HostContext::new().with("expr", "from-expr").with("al", "from-alias");
        assert_eq!(bind(&d, &host).unwrap().text("prop"), Some("from-expr"));
    }

    #[test]
    fn test_alias_beats_default_and_binds_under_name() {
        let d = descriptor(vec![(
            "prop",
            ParamOptions::new().expression("expr").alias("al").default_value("dflt"),
        )]);
        let host = HostContext::new().with("al", "from-alias");
        let bound = bind(&d, &host).unwrap();
        assert_eq!(bound.text("prop"), Some("from-alias"));
        assert!(!bound.contains("al"));
    }

    #[test]
    fn test_missing_required_fails() {
        let d = descriptor(vec![
            ("ok", ParamOptions::new().default_value("x")),
            ("needed", ParamOptions::new().expression("nope").required()),
        ]);
        let err = bind(&d, &HostContext::new()).unwrap_err();
        assert_eq!(err, AdapterError::MissingRequiredParameter("needed".into()));
    }

    #[test]
    fn test_optional_unresolved_is_absent_not_omitted() {
        let d = descriptor(vec![("maybe", ParamOptions::new())]);
        let bound = bind(&d, &HostContext::new()).unwrap();
        assert!(bound.contains("maybe"));
        assert!(bound.is_absent("maybe"));
        assert_eq!(bound.get("maybe"), Some(&ParamValue::Absent));
        assert_eq!(bound.to_json()["maybe"], serde_json::Value::Null);
    }

    #[test]
    fn test_require_text_errors() {
        let d = descriptor(vec![("maybe", ParamOptions::new())]);
        let bound = bind(&d, &HostContext::new()).unwrap();
        assert_eq!(bound.require_text("maybe").unwrap_err().code, mojo_core::codes::MISSING_PARAMETER);
        assert_eq!(bound.require_text("other").unwrap_err().code, mojo_core::codes::UNDEFINED_PARAMETER);
    }

    #[test]
    fn test_typed_accessors() {
        let d = descriptor(vec![
            ("since", ParamOptions::new().default_value("2007-03-14")),
            ("bad", ParamOptions::new().default_value("14/03/2007")),
            ("dir", ParamOptions::new().default_value("src/main")),
            ("strict", ParamOptions::new().default_value("yes")),
            ("unset", ParamOptions::new()),
        ]);
        let bound = bind(&d, &HostContext::new()).unwrap();

        assert_eq!(bound.date("since").unwrap(), NaiveDate::from_ymd_opt(2007, 3, 14));
        assert_eq!(bound.date("bad").unwrap_err().code, mojo_core::codes::INVALID_PARAMETER);
        assert_eq!(bound.date("unset").unwrap(), None);
        assert_eq!(bound.file("dir"), Some(PathBuf::from("src/main")));
        assert!(bound.flag("strict").unwrap());
        assert!(!bound.flag("unset").unwrap());
        assert!(bound.flag("dir").is_err());
    }
}
