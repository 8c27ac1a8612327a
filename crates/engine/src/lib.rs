//! Subprocess bridge to the SysML v2 interactive interpreter
//!
//! This crate provides a safe Rust interface to the external SysML v2
//! interpreter, driven through an adapter process speaking line-delimited
//! JSON on its standard streams. It owns the capability trait the driver
//! programs against, the wire protocol, and the transport.
//!
//! The interpreter is an opaque collaborator: parsing, semantic analysis,
//! and AST construction all happen on the other side of the bridge. This
//! crate only ferries requests across and translates failures.

pub mod error;
pub mod protocol;

// Re-export main types
pub use error::{EngineError, Result};
pub use protocol::{PROTOCOL_VERSION, Request};

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::protocol::{Ack, ExportPayload, ProcessPayload, parse_envelope, payload};

/// Capability interface of the model-interpretation engine.
///
/// The driver is written against this trait so that any implementation can
/// be injected; tests use a scripted fake instead of the real interpreter.
pub trait Interpreter {
    /// Load a library definition located at `path` into the interpreter.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter cannot load the library or the
    /// bridge transport fails.
    fn load_library(&mut self, path: &Path) -> Result<()>;

    /// Submit source text for parsing and validation.
    ///
    /// Returns the interpreter's processing result: a printable validation
    /// report plus an error predicate. A model with validation errors is a
    /// successful call here; only transport or interpreter faults are `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bridge transport fails or the interpreter
    /// itself faults on the submitted text.
    fn process(&mut self, text: &str) -> Result<ProcessingResult>;

    /// Export the named package as a serialized AST.
    ///
    /// # Errors
    ///
    /// Returns an error if the package cannot be exported or the bridge
    /// transport fails.
    fn export(&mut self, name: &str, options: &[ExportOption]) -> Result<ExportedAst>;
}

/// Outcome of processing one unit of source text
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    report: String,
    has_errors: bool,
}

impl ProcessingResult {
    /// Create a processing result from its report text and error flag
    #[must_use]
    pub fn new(report: impl Into<String>, has_errors: bool) -> Self {
        Self {
            report: report.into(),
            has_errors,
        }
    }

    /// Whether the interpreter found validation errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// The human-readable validation report
    #[must_use]
    pub fn report(&self) -> &str {
        &self.report
    }
}

impl std::fmt::Display for ProcessingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.report)
    }
}

/// Serialized AST for one exported package
#[derive(Debug, Clone)]
pub struct ExportedAst {
    text: String,
}

impl ExportedAst {
    /// Wrap the interpreter's textual AST representation
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The AST text exactly as the interpreter serialized it
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for ExportedAst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// A single export option, forwarded verbatim to the interpreter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOption {
    /// Option name
    pub name: String,
    /// Option value
    pub value: String,
}

/// Command line used to start the engine adapter process
#[derive(Debug, Clone)]
pub struct EngineCommand {
    program: String,
    args: Vec<String>,
}

impl EngineCommand {
    /// Parse a whitespace-separated command line, e.g. `"java -jar adapter.jar"`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the command line is empty.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut parts = spec.split_whitespace().map(str::to_owned);
        let program = parts
            .next()
            .ok_or_else(|| EngineError::configuration("Empty engine command"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// The program to execute
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Fixed arguments passed to the program
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Bridge to a live engine adapter process.
///
/// One instance per run: the process is spawned once, configured quiet, and
/// killed when the bridge is dropped. Calls are strictly sequential, one
/// request line out and one response line back, with no timeout; a hung
/// interpreter blocks the caller indefinitely.
#[derive(Debug)]
pub struct PilotEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl PilotEngine {
    /// Spawn the adapter process and switch the interpreter to quiet mode.
    ///
    /// # Errors
    ///
    /// Returns a bridge error if the process cannot be spawned, its pipes
    /// cannot be captured, or the quiet-mode acknowledgement fails.
    #[tracing::instrument(name = "engine_spawn", fields(program = command.program()))]
    pub fn spawn(command: &EngineCommand) -> Result<Self> {
        tracing::debug!("Spawning engine adapter process");

        let mut child = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                EngineError::bridge(
                    "spawn",
                    format!("Failed to start '{}': {e}", command.program()),
                )
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::bridge("spawn", "Failed to capture adapter stdin"))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| EngineError::bridge("spawn", "Failed to capture adapter stdout"))?;

        let mut engine = Self {
            child,
            stdin,
            stdout,
        };

        // Quiet mode for the whole run, matching the driver's contract
        let Ack {} = engine.call("configure", &Request::Configure { verbose: false })?;
        tracing::debug!("Engine adapter ready");

        Ok(engine)
    }

    /// Send one request line and decode the ok payload of the response.
    fn call<T: serde::de::DeserializeOwned>(
        &mut self,
        operation: &'static str,
        request: &Request<'_>,
    ) -> Result<T> {
        let line = serde_json::to_string(request)
            .map_err(|e| EngineError::bridge(operation, format!("Failed to encode request: {e}")))?;

        tracing::debug!(operation, "Sending request to engine adapter");
        let start = std::time::Instant::now();

        writeln!(self.stdin, "{line}")
            .and_then(|()| self.stdin.flush())
            .map_err(|e| EngineError::bridge(operation, format!("Failed to write request: {e}")))?;

        let mut response = String::new();
        let read = self
            .stdout
            .read_line(&mut response)
            .map_err(|e| EngineError::bridge(operation, format!("Failed to read response: {e}")))?;
        if read == 0 {
            tracing::error!(operation, "Engine adapter closed the stream");
            return Err(EngineError::bridge(
                operation,
                "Engine adapter exited before responding",
            ));
        }

        tracing::debug!(
            operation,
            duration_ms = start.elapsed().as_millis(),
            "Received response from engine adapter"
        );

        let envelope = parse_envelope(operation, response.trim_end())?;
        payload(operation, envelope)
    }
}

impl Interpreter for PilotEngine {
    fn load_library(&mut self, path: &Path) -> Result<()> {
        let Some(path_str) = path.to_str() else {
            return Err(EngineError::configuration(format!(
                "Library path is not valid UTF-8: {}",
                path.display()
            )));
        };
        let Ack {} = self.call("loadLibrary", &Request::LoadLibrary { path: path_str })?;
        Ok(())
    }

    fn process(&mut self, text: &str) -> Result<ProcessingResult> {
        let result: ProcessPayload = self.call("process", &Request::Process { text })?;
        Ok(result.into())
    }

    fn export(&mut self, name: &str, options: &[ExportOption]) -> Result<ExportedAst> {
        let result: ExportPayload = self.call("export", &Request::Export { name, options })?;
        Ok(ExportedAst::new(result.ast))
    }
}

impl Drop for PilotEngine {
    fn drop(&mut self) {
        // The adapter must not outlive the run
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_result_display_is_report() {
        let result = ProcessingResult::new("3 elements, 0 errors", false);
        assert_eq!(result.to_string(), "3 elements, 0 errors");
        assert!(!result.has_errors());
    }

    #[test]
    fn test_processing_result_with_errors() {
        let result = ProcessingResult::new("ERROR: unresolved reference", true);
        assert!(result.has_errors());
        assert_eq!(result.report(), "ERROR: unresolved reference");
    }

    #[test]
    fn test_exported_ast_display() {
        let ast = ExportedAst::new("{\"name\":\"Demo\"}");
        assert_eq!(ast.to_string(), "{\"name\":\"Demo\"}");
        assert_eq!(ast.as_str(), "{\"name\":\"Demo\"}");
    }

    #[test]
    fn test_engine_command_parse() {
        let cmd = EngineCommand::parse("java -jar adapter.jar").unwrap();
        assert_eq!(cmd.program(), "java");
        assert_eq!(cmd.args(), ["-jar", "adapter.jar"]);
    }

    #[test]
    fn test_engine_command_single_program() {
        let cmd = EngineCommand::parse("sysml-interactive").unwrap();
        assert_eq!(cmd.program(), "sysml-interactive");
        assert!(cmd.args().is_empty());
    }

    #[test]
    fn test_engine_command_empty_is_configuration_error() {
        let err = EngineCommand::parse("   ").unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));
    }
}
