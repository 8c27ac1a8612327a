//! Integration tests driving the bridge against a scripted adapter process

use std::fs;
use std::path::Path;

use stu_engine::{EngineCommand, EngineError, Interpreter, PilotEngine};
use tempfile::TempDir;

/// Write a shell-script adapter that answers each request line with the
/// next canned response, then returns the command line that runs it.
fn scripted_adapter(dir: &TempDir, responses: &[&str]) -> EngineCommand {
    let mut script = String::from("n=0\nwhile IFS= read -r line; do\n  n=$((n+1))\n  case \"$n\" in\n");
    for (i, response) in responses.iter().enumerate() {
        script.push_str(&format!("    {}) printf '%s\\n' '{}' ;;\n", i + 1, response));
    }
    script.push_str("  esac\ndone\n");

    let path = dir.path().join("adapter.sh");
    fs::write(&path, script).unwrap();
    EngineCommand::parse(&format!("sh {}", path.display())).unwrap()
}

#[test]
fn full_session_through_scripted_adapter() {
    let dir = TempDir::new().unwrap();
    let command = scripted_adapter(
        &dir,
        &[
            r#"{"version":"pilot/1","ok":{}}"#,
            r#"{"version":"pilot/1","ok":{}}"#,
            r#"{"version":"pilot/1","ok":{"report":"2 elements, 0 errors","hasErrors":false}}"#,
            r#"{"version":"pilot/1","ok":{"ast":"{\"package\":\"Demo\"}"}}"#,
        ],
    );

    let mut engine = PilotEngine::spawn(&command).unwrap();
    engine.load_library(Path::new("/opt/sysml/lib")).unwrap();

    let result = engine.process("package Demo;").unwrap();
    assert!(!result.has_errors());
    assert_eq!(result.report(), "2 elements, 0 errors");

    let ast = engine.export("Demo", &[]).unwrap();
    assert_eq!(ast.as_str(), "{\"package\":\"Demo\"}");
}

#[test]
fn interpreter_reported_error_surfaces() {
    let dir = TempDir::new().unwrap();
    let command = scripted_adapter(
        &dir,
        &[
            r#"{"version":"pilot/1","ok":{}}"#,
            r#"{"version":"pilot/1","error":{"code":"LIBRARY_LOAD","message":"no library units found"}}"#,
        ],
    );

    let mut engine = PilotEngine::spawn(&command).unwrap();
    let err = engine.load_library(Path::new("/nowhere")).unwrap_err();
    assert!(matches!(err, EngineError::Interpreter { .. }));
    assert!(err.to_string().contains("no library units found"));
}

#[test]
fn adapter_exiting_early_is_a_bridge_error() {
    let dir = TempDir::new().unwrap();
    // Adapter that exits without answering anything
    let path = dir.path().join("adapter.sh");
    fs::write(&path, "exit 0\n").unwrap();
    let command = EngineCommand::parse(&format!("sh {}", path.display())).unwrap();

    // Depending on timing the failure is either a broken pipe on write or
    // EOF on read; both are bridge faults.
    let err = PilotEngine::spawn(&command).unwrap_err();
    assert!(matches!(err, EngineError::Bridge { .. }));
}

#[test]
fn missing_program_is_a_bridge_error() {
    let command = EngineCommand::parse("definitely-not-a-real-engine-binary").unwrap();
    let err = PilotEngine::spawn(&command).unwrap_err();
    assert!(matches!(err, EngineError::Bridge { .. }));
}

#[test]
fn malformed_response_is_a_bridge_error() {
    let dir = TempDir::new().unwrap();
    let command = scripted_adapter(&dir, &["this is not json"]);

    let err = PilotEngine::spawn(&command).unwrap_err();
    assert!(matches!(err, EngineError::Bridge { .. }));
}
