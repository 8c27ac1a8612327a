//! Wire protocol for the interpreter adapter
//!
//! The bridge talks to the engine adapter process over line-delimited JSON:
//! one request object per line on the child's stdin, one response envelope
//! per line on its stdout. Keep the shapes in sync with the adapter side.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::{ExportOption, ProcessingResult};

/// Protocol version tag carried in every response envelope
pub const PROTOCOL_VERSION: &str = "pilot/1";

// Error codes - keep in sync with the adapter side
/// Adapter rejected the request itself (malformed path or text)
pub const ERROR_CODE_INVALID_INPUT: &str = "INVALID_INPUT";
/// Library definition could not be loaded into the interpreter
pub const ERROR_CODE_LIBRARY_LOAD: &str = "LIBRARY_LOAD";
/// Interpreter failed while processing submitted source text
pub const ERROR_CODE_PROCESS: &str = "PROCESS";
/// Interpreter failed while exporting the named package
pub const ERROR_CODE_EXPORT: &str = "EXPORT";
/// Adapter recovered from an interpreter crash
pub const ERROR_CODE_PANIC_RECOVER: &str = "PANIC_RECOVER";

/// A single request sent to the adapter
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request<'a> {
    /// Toggle interpreter verbosity; sent once right after spawn
    #[serde(rename_all = "camelCase")]
    Configure {
        /// Whether the interpreter should emit verbose diagnostics
        verbose: bool,
    },
    /// Load a library definition from a file path on the adapter side
    #[serde(rename_all = "camelCase")]
    LoadLibrary {
        /// Path to the library definition
        path: &'a str,
    },
    /// Submit source text for parsing and validation
    #[serde(rename_all = "camelCase")]
    Process {
        /// Full model source text
        text: &'a str,
    },
    /// Export the named package as a serialized AST
    #[serde(rename_all = "camelCase")]
    Export {
        /// Package name to export
        name: &'a str,
        /// Export options, forwarded verbatim
        options: &'a [ExportOption],
    },
}

/// Error payload in a response envelope
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct AdapterError {
    pub code: String,
    pub message: String,
    pub hint: Option<String>,
}

impl AdapterError {
    /// Fold the optional hint into a single message and classify by code.
    pub fn into_engine_error(self) -> EngineError {
        let message = self
            .hint
            .map(|hint| format!("{} (Hint: {})", self.message, hint))
            .unwrap_or(self.message);
        match self.code.as_str() {
            ERROR_CODE_INVALID_INPUT => EngineError::configuration(message),
            code => EngineError::interpreter(code, message),
        }
    }
}

/// Response envelope from the adapter
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<'a> {
    #[allow(dead_code)] // Used in tests for version compatibility checks
    pub version: String,
    #[serde(borrow)]
    pub ok: Option<&'a serde_json::value::RawValue>,
    pub error: Option<AdapterError>,
}

/// Ok payload of a `process` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProcessPayload {
    pub report: String,
    pub has_errors: bool,
}

impl From<ProcessPayload> for ProcessingResult {
    fn from(payload: ProcessPayload) -> Self {
        Self::new(payload.report, payload.has_errors)
    }
}

/// Ok payload of an `export` response
#[derive(Debug, Deserialize)]
pub(crate) struct ExportPayload {
    pub ast: String,
}

/// Parse one response line into an envelope
pub(crate) fn parse_envelope<'a>(operation: &'static str, line: &'a str) -> Result<Envelope<'a>> {
    serde_json::from_str(line).map_err(|e| {
        tracing::error!(
            response_line = line,
            parse_error = %e,
            "Failed to parse response envelope from engine adapter"
        );
        EngineError::bridge(operation, format!("Invalid response envelope: {e}"))
    })
}

/// Extract the ok payload of an envelope, converting a reported error
pub(crate) fn payload<T: serde::de::DeserializeOwned>(
    operation: &'static str,
    envelope: Envelope<'_>,
) -> Result<T> {
    if let Some(error) = envelope.error {
        tracing::error!(
            error_code = error.code,
            error_message = error.message,
            "Engine adapter reported an error"
        );
        return Err(error.into_engine_error());
    }

    let raw = envelope.ok.ok_or_else(|| {
        EngineError::bridge(
            operation,
            "Invalid response: missing both 'ok' and 'error' fields".to_string(),
        )
    })?;

    serde_json::from_str(raw.get())
        .map_err(|e| EngineError::bridge(operation, format!("Invalid ok payload: {e}")))
}

/// Ok payload carrying no data (`configure`, `loadLibrary` acknowledgements)
#[derive(Debug, Deserialize)]
pub(crate) struct Ack {}
