//! Plugin traits and metadata

use crate::{BoundParams, Declarer, Log};
use mojo_core::{MojoError, ParamKind};
use serde::Serialize;
use thiserror::Error;

/// Key/value payload returned by a successful execution
pub type Outputs = serde_json::Map<String, serde_json::Value>;

/// Scalar metadata fields of a mojo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Goal,
    Phase,
    Description,
    RequiresDependencyResolution,
}

/// Metadata about one declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Options recognized when declaring a parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamOptions {
    pub expression: Option<String>,
    pub default: Option<String>,
    pub alias: Option<String>,
    pub required: bool,
    pub description: Option<String>,
}

impl ParamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expression(mut self, key: impl Into<String>) -> Self {
        self.expression = Some(key.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn alias(mut self, key: impl Into<String>) -> Self {
        self.alias = Some(key.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub(crate) fn into_spec(self, kind: ParamKind, name: impl Into<String>) -> ParameterSpec {
        ParameterSpec {
            name: name.into(),
            kind,
            expression: self.expression,
            default_value: self.default,
            alias: self.alias,
            required: self.required,
            description: self.description,
        }
    }
}

/// Build-tool facing metadata for a mojo type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MojoDescriptor {
    pub goal: String,
    pub phase: String,
    pub description: String,
    pub requires_dependency_resolution: String,
    pub parameters: Vec<ParameterSpec>,
}

impl MojoDescriptor {
    pub(crate) fn set(&mut self, field: MetaField, value: String) {
        match field {
            MetaField::Goal => self.goal = value,
            MetaField::Phase => self.phase = value,
            MetaField::Description => self.description = value,
            MetaField::RequiresDependencyResolution => self.requires_dependency_resolution = value,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Failure raised from `Mojo::execute`
///
/// `Plugin` is the domain kind: an intentional build failure. Every other
/// variant is treated as unexpected by the execution wrapper.
#[derive(Debug, Error)]
pub enum MojoFailure {
    #[error(transparent)]
    Plugin(#[from] MojoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl MojoFailure {
    /// Domain failure with a plain message
    pub fn plugin(message: impl Into<String>) -> Self {
        MojoFailure::Plugin(MojoError::plugin(message))
    }

    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        MojoFailure::Other(err.into())
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, MojoFailure::Plugin(_))
    }
}

/// A build plugin unit
///
/// `declare` runs once when the type is registered. `execute` runs once per
/// bound instance; the default fails with a `NOT_IMPLEMENTED` domain error.
pub trait Mojo: Send + Sync {
    fn declare(decl: &mut Declarer<'_>)
    where
        Self: Sized;

    fn execute(&self, _params: &BoundParams, _log: &dyn Log) -> Result<Option<Outputs>, MojoFailure> {
        Err(MojoError::not_implemented().into())
    }
}
