//! Host context assembly
//!
//! Sources, lowest priority first: `basedir` (current directory), process
//! environment as `env.NAME`, the JSON properties file, an explicit
//! `--basedir`, `-D key=value` flags.

use mojo_plugin::HostContext;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid properties file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Properties file '{0}' must contain a JSON object")]
    NotAnObject(PathBuf),

    #[error("Property '{0}' must be a string, number, boolean or object")]
    Unsupported(String),

    #[error("Invalid define '{0}': expected key=value")]
    BadDefine(String),
}

/// Parse a `-D key=value` flag
pub fn parse_define(s: &str) -> Result<(String, String), ConfigError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(ConfigError::BadDefine(s.to_string())),
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HostContext) -> Result<(), ConfigError> {
    match value {
        Value::String(s) => out.insert(prefix, s.as_str()),
        Value::Number(n) => out.insert(prefix, n.to_string()),
        Value::Bool(b) => out.insert(prefix, b.to_string()),
        Value::Object(map) => {
            for (key, v) in map {
                let full = if prefix.is_empty() { key.clone() } else { format!("{}.{}", prefix, key) };
                flatten(&full, v, out)?;
            }
        }
        Value::Null | Value::Array(_) => return Err(ConfigError::Unsupported(prefix.to_string())),
    }
    Ok(())
}

/// Load a JSON properties file; nested objects become dotted keys
pub fn load_properties(path: &Path) -> Result<HostContext, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    if !value.is_object() {
        return Err(ConfigError::NotAnObject(path.to_path_buf()));
    }

    let mut ctx = HostContext::new();
    flatten("", &value, &mut ctx)?;
    Ok(ctx)
}

pub fn build_host_context(
    cwd: &Path,
    basedir: Option<&Path>,
    env: impl IntoIterator<Item = (String, String)>,
    properties: Option<&Path>,
    defines: &[(String, String)],
) -> Result<HostContext, ConfigError> {
    let mut ctx = HostContext::new().with("basedir", cwd.display().to_string());
    ctx.extend(env.into_iter().map(|(k, v)| (format!("env.{}", k), v)));

    if let Some(path) = properties {
        let file = load_properties(path)?;
        tracing::debug!(path = %path.display(), count = file.len(), "loaded properties");
        ctx.extend(file.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    }

    if let Some(dir) = basedir {
        ctx.insert("basedir", dir.display().to_string());
    }

    ctx.extend(defines.iter().cloned());
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_define() {
        assert_eq!(parse_define("prop=hi").unwrap(), ("prop".to_string(), "hi".to_string()));
        assert_eq!(parse_define("a=b=c").unwrap().1, "b=c");
        assert_eq!(parse_define("empty=").unwrap().1, "");
        assert!(parse_define("novalue").is_err());
        assert!(parse_define("=x").is_err());
    }

    #[test]
    fn test_properties_flatten_nested_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("props.json");
        fs::write(&path, r#"{"todo": {"pattern": "FIXME", "fail": true}, "count": 3}"#).unwrap();

        let ctx = load_properties(&path).unwrap();
        assert_eq!(ctx.get("todo.pattern"), Some("FIXME"));
        assert_eq!(ctx.get("todo.fail"), Some("true"));
        assert_eq!(ctx.get("count"), Some("3"));
    }

    #[test]
    fn test_properties_reject_arrays_and_non_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("props.json");
        fs::write(&path, r#"{"list": [1, 2]}"#).unwrap();
        assert!(matches!(load_properties(&path), Err(ConfigError::Unsupported(k)) if k == "list"));

        fs::write(&path, "[1]").unwrap();
        assert!(matches!(load_properties(&path), Err(ConfigError::NotAnObject(_))));
    }

    #[test]
    fn test_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("props.json");
        fs::write(&path, r#"{"prop": "from-file", "basedir": "/file"}"#).unwrap();

        let env = vec![("HOME".to_string(), "/home/me".to_string())];
        let defines = vec![("prop".to_string(), "from-flag".to_string())];
        let ctx = build_host_context(Path::new("/cwd"), None, env, Some(path.as_path()), &defines).unwrap();

        assert_eq!(ctx.get("prop"), Some("from-flag"));
        assert_eq!(ctx.get("basedir"), Some("/file"));
        assert_eq!(ctx.get("env.HOME"), Some("/home/me"));
    }

    #[test]
    fn test_explicit_basedir_outranks_properties_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("props.json");
        fs::write(&path, r#"{"basedir": "/file"}"#).unwrap();

        let ctx = build_host_context(Path::new("/cwd"), Some(Path::new("/flag")), Vec::new(), Some(path.as_path()), &[]).unwrap();
        assert_eq!(ctx.get("basedir"), Some("/flag"));

        let defines = vec![("basedir".to_string(), "/define".to_string())];
        let ctx = build_host_context(Path::new("/cwd"), Some(Path::new("/flag")), Vec::new(), Some(path.as_path()), &defines).unwrap();
        assert_eq!(ctx.get("basedir"), Some("/define"));
    }

    #[test]
    fn test_basedir_defaults_to_cwd() {
        let ctx = build_host_context(Path::new("/cwd"), None, Vec::new(), None, &[]).unwrap();
        assert_eq!(ctx.get("basedir"), Some("/cwd"));
    }
}
