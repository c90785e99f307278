//! Parameter values and kinds
//!
//! Every declared parameter is bound to a `ParamValue`, even when nothing
//! resolved for it. Optional parameters with no source are bound to
//! `ParamValue::Absent` so plugin code can always probe the key.

use serde::{Deserialize, Serialize};

/// Declared kind of a mojo parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Date,
    File,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Date => "date",
            ParamKind::File => "file",
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bound value of a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    /// Optional parameter that no expression, alias or default supplied
    Absent,
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ParamValue::Absent)
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<Option<String>> for ParamValue {
    fn from(s: Option<String>) -> Self {
        s.map_or(ParamValue::Absent, ParamValue::Text)
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Absent => f.write_str("<absent>"),
        }
    }
}
