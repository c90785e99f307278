//! `find-todo` goal: scans a source tree for TODO markers

use mojo_plugin::prelude::*;
use regex::Regex;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct FindTodoMojo;

/// One matching line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoHit {
    pub path: String,
    pub line: usize,
    pub text: String,
}

/// Walk `basedir` in file-name order and collect lines matching `pattern`
pub fn scan(basedir: &Path, pattern: &Regex) -> Result<Vec<TodoHit>, MojoFailure> {
    let mut hits = Vec::new();

    for entry in WalkDir::new(basedir).sort_by_file_name() {
        let entry = entry.map_err(|e| MojoFailure::other(e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let bytes = fs::read(entry.path())?;
        let content = String::from_utf8_lossy(&bytes);
        let rel = entry.path().strip_prefix(basedir).unwrap_or(entry.path());

        for (idx, line) in content.lines().enumerate() {
            if pattern.is_match(line) {
                hits.push(TodoHit {
                    path: rel.display().to_string(),
                    line: idx + 1,
                    text: line.trim().to_string(),
                });
            }
        }
    }

    Ok(hits)
}

impl Mojo for FindTodoMojo {
    fn declare(decl: &mut Declarer<'_>) {
        decl.goal("find-todo")
            .phase("verify")
            .description("Lists every line matching the TODO pattern under basedir")
            .file(
                "basedir",
                ParamOptions::new()
                    .expression("basedir")
                    .required()
                    .description("Directory to scan"),
            )
            .string(
                "pattern",
                ParamOptions::new()
                    .expression("todo.pattern")
                    .default_value("TODO")
                    .description("Regular expression marking a TODO line"),
            )
            .string(
                "failOnTodo",
                ParamOptions::new()
                    .expression("todo.fail")
                    .alias("failOnTodo")
                    .description("Fail the build when any TODO is found"),
            );
    }

    fn execute(&self, params: &BoundParams, log: &dyn Log) -> Result<Option<Outputs>, MojoFailure> {
        let basedir = params
            .file("basedir")
            .ok_or_else(|| MojoError::missing_parameter("basedir"))?;
        if !basedir.is_dir() {
            return Err(MojoFailure::plugin(format!("basedir '{}' is not a directory", basedir.display())));
        }

        let raw = params.require_text("pattern")?;
        let pattern = Regex::new(raw)
            .map_err(|e| MojoError::invalid_parameter("pattern", "regular expression", raw).with_suggestion(e.to_string()))?;
        let fail_on_todo = params.flag("failOnTodo")?;

        let hits = scan(&basedir, &pattern)?;
        for hit in &hits {
            log.info(&format!("{}:{}: {}", hit.path, hit.line, hit.text));
        }

        let mut files: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
        files.dedup();
        tracing::debug!(count = hits.len(), files = files.len(), "todo scan finished");

        if fail_on_todo && !hits.is_empty() {
            return Err(MojoFailure::plugin(format!(
                "Found {} TODO(s) in {} file(s)",
                hits.len(),
                files.len()
            )));
        }

        let mut out = Outputs::new();
        out.insert("count".to_string(), hits.len().into());
        out.insert("files".to_string(), files.len().into());
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mojo_plugin::{FailureKind, RecordingLog};
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("src/a.rs"), "fn a() {}\n// TODO: tidy up\n").unwrap();
        fs::write(dir.path().join("src/nested/b.rs"), "// TODO one\nlet x = 1;\n// FIXME two\n").unwrap();
        fs::write(dir.path().join("README"), "nothing here\n").unwrap();
        dir
    }

    fn run(host: HostContext) -> (mojo_plugin::ExecutionResult, RecordingLog) {
        let log = RecordingLog::new();
        let registry = MojoRegistry::new().with_mojo::<FindTodoMojo>();
        let result = registry.instantiate("find-todo", &host).unwrap().run(&log);
        (result, log)
    }

    #[test]
    fn test_scan_finds_hits_in_order() {
        let dir = fixture();
        let hits = scan(dir.path(), &Regex::new("TODO").unwrap()).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].line, 2);
        assert_eq!(hits[0].text, "// TODO: tidy up");
        assert!(hits[1].path.ends_with("b.rs"));
        assert_eq!(hits[1].line, 1);
    }

    #[test]
    fn test_execute_counts_and_logs() {
        let dir = fixture();
        let host = HostContext::new().with("basedir", dir.path().display().to_string());
        let (result, log) = run(host);
        let out = result.outputs().unwrap();
        assert_eq!(out["count"], 2);
        assert_eq!(out["files"], 2);
        assert_eq!(log.infos().len(), 2);
    }

    #[test]
    fn test_custom_pattern() {
        let dir = fixture();
        let host = HostContext::new()
            .with("basedir", dir.path().display().to_string())
            .with("todo.pattern", "TODO|FIXME");
        let (result, _) = run(host);
        assert_eq!(result.outputs().unwrap()["count"], 3);
    }

    #[test]
    fn test_fail_on_todo_via_alias() {
        let dir = fixture();
        let host = HostContext::new()
            .with("basedir", dir.path().display().to_string())
            .with("failOnTodo", "true");
        let (result, log) = run(host);
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Domain);
        assert_eq!(failure.message, "Found 2 TODO(s) in 2 file(s)");
        assert_eq!(log.errors().len(), 1);
    }

    #[test]
    fn test_missing_directory_is_domain_error() {
        let dir = fixture();
        let host = HostContext::new().with("basedir", dir.path().join("nope").display().to_string());
        let (result, _) = run(host);
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Domain);
        assert!(failure.message.contains("is not a directory"));
    }

    #[test]
    fn test_invalid_pattern_is_domain_error() {
        let dir = fixture();
        let host = HostContext::new()
            .with("basedir", dir.path().display().to_string())
            .with("todo.pattern", "(unclosed");
        let (result, _) = run(host);
        assert_eq!(result.failure().unwrap().code.as_deref(), Some(mojo_core::codes::INVALID_PARAMETER));
    }

    #[test]
    fn test_basedir_required() {
        let registry = MojoRegistry::new().with_mojo::<FindTodoMojo>();
        let err = registry.instantiate("find-todo", &HostContext::new()).unwrap_err();
        assert_eq!(err, AdapterError::MissingRequiredParameter("basedir".into()));
    }
}
