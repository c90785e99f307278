//! Mojo Core - Fundamental types
//!
//! This crate provides the core types shared by mojo plugins and hosts:
//! - `ParamValue`: A bound parameter value (text or explicitly absent)
//! - `ParamKind`: Declared parameter kind (string, date, file)
//! - `MojoError`: Structured domain error raised by plugins
//! - `AdapterError`: Registration and binding failures

mod value;
mod error;

pub use value::{ParamKind, ParamValue};
pub use error::{MojoError, AdapterError, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{ParamKind, ParamValue, MojoError, AdapterError};
    pub use crate::error::codes;
}
