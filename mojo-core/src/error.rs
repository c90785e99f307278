//! Structured errors for mojo authors and hosts
//!
//! `MojoError` is the domain error a plugin raises on purpose: a clean,
//! one-line build failure. `AdapterError` covers registration and binding
//! failures, which surface before any plugin code runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const PLUGIN_ERROR: &str = "PLUGIN_ERROR";
    pub const NOT_IMPLEMENTED: &str = "NOT_IMPLEMENTED";
    pub const UNKNOWN_PLUGIN_TYPE: &str = "UNKNOWN_PLUGIN_TYPE";
    pub const MISSING_PARAMETER: &str = "MISSING_PARAMETER";
    pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
    pub const UNDEFINED_PARAMETER: &str = "UNDEFINED_PARAMETER";
}

/// Structured domain error raised by a mojo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MojoError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl MojoError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    // ========== Common Error Constructors ==========

    /// A build failure raised by plugin code. The message is shown as-is.
    pub fn plugin(message: impl Into<String>) -> Self {
        Self::new(codes::PLUGIN_ERROR, message)
    }

    pub fn not_implemented() -> Self {
        Self::new(codes::NOT_IMPLEMENTED, "You must implement 'execute' method!")
    }

    pub fn invalid_parameter(name: &str, expected: &str, got: &str) -> Self {
        Self::new(
            codes::INVALID_PARAMETER,
            format!("Parameter '{}': expected {}, got '{}'", name, expected, got),
        )
    }

    pub fn undefined_parameter(name: &str) -> Self {
        Self::new(codes::UNDEFINED_PARAMETER, format!("Parameter '{}' was not declared", name))
            .with_suggestion("Declare the parameter in the mojo's declare() block")
    }

    pub fn missing_parameter(name: &str) -> Self {
        Self::new(codes::MISSING_PARAMETER, format!("Parameter '{}' has no value", name))
    }
}

impl std::fmt::Display for MojoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for MojoError {}

/// Registration and binding failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("Unknown plugin type: {name}")]
    UnknownPluginType {
        name: String,
        /// Goals with a similar name, best match first
        similar: Vec<String>,
    },

    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(String),
}

impl AdapterError {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownPluginType { name: name.into(), similar: Vec::new() }
    }
}

impl From<AdapterError> for MojoError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::UnknownPluginType { name, similar } => {
                let err = MojoError::new(codes::UNKNOWN_PLUGIN_TYPE, format!("Unknown plugin type: {}", name));
                if similar.is_empty() {
                    err.with_suggestion("Use `list` to see registered goals")
                } else {
                    err.with_suggestion(format!("Similar: {}", similar.join(", ")))
                }
            }
            AdapterError::MissingRequiredParameter(name) => MojoError::missing_parameter(&name)
                .with_suggestion(format!("Supply '{}' through the host context or declare a default", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_suggestion() {
        let err = MojoError::plugin("bad config").with_suggestion("fix it");
        assert_eq!(err.to_string(), "bad config (suggestion: fix it)");
    }

    #[test]
    fn test_not_implemented_message() {
        let err = MojoError::not_implemented();
        assert_eq!(err.code, codes::NOT_IMPLEMENTED);
        assert_eq!(err.message, "You must implement 'execute' method!");
    }

    #[test]
    fn test_adapter_error_conversion() {
        let err: MojoError = AdapterError::MissingRequiredParameter("prop".into()).into();
        assert_eq!(err.code, codes::MISSING_PARAMETER);
        assert!(err.message.contains("prop"));

        let err: MojoError = AdapterError::UnknownPluginType {
            name: "tset".into(),
            similar: vec!["test".into()],
        }
        .into();
        assert_eq!(err.code, codes::UNKNOWN_PLUGIN_TYPE);
        assert_eq!(err.suggestion.as_deref(), Some("Similar: test"));
    }

    #[test]
    fn test_serialize_skips_empty_suggestion() {
        let json = serde_json::to_value(MojoError::plugin("boom")).unwrap();
        assert_eq!(json["code"], "PLUGIN_ERROR");
        assert!(json.get("suggestion").is_none());
    }
}
