//! The five-stage AST generation pipeline
//!
//! Control flow is strictly sequential: load standard library, load tagging
//! library, process the target model, gate on the error flag, export the
//! AST, write the file. Every failure is terminal for the invocation; there
//! are no retries.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use stu_engine::{EngineError, Interpreter};
use thiserror::Error;

/// Resolved inputs for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineArgs {
    /// Standard library definition loaded into the interpreter by path
    pub standard_library: PathBuf,
    /// Semantic tagging library source, read into memory and submitted as text
    pub tagging_library: PathBuf,
    /// Target model source, read into memory and submitted as text
    pub model: PathBuf,
    /// Package to export as AST once the model validates cleanly
    pub package: String,
    /// Output path for the serialized AST text
    pub ast_output: PathBuf,
}

/// Terminal pipeline failures.
///
/// The `Display` form of each variant is the exact diagnostic the driver
/// prints to stderr before exiting with code 1.
#[derive(Error, Debug, Diagnostic)]
pub enum PipelineError {
    /// Tagging-library or model source could not be read
    #[error("IOException: {}: {source}", path.display())]
    #[diagnostic(code(stu::pipeline::read))]
    Read {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The model processed, but the interpreter reported validation errors
    #[error("An error has occurred while parsing the model")]
    #[diagnostic(code(stu::pipeline::model))]
    ModelErrors,

    /// The exported AST could not be written to the output path
    #[error("An error occurred while writing to the file: {source}")]
    #[diagnostic(code(stu::pipeline::write))]
    Write {
        /// Output path that failed to write
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The interpreter or its bridge faulted
    #[error("Interpreter error: {0}")]
    #[diagnostic(code(stu::pipeline::engine))]
    Engine(#[from] EngineError),
}

impl PipelineError {
    fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Run the pipeline against the given interpreter.
///
/// The validation report of the target model is written to `report_out`
/// unconditionally, before the error gate, so it is shown whether or not
/// the model validates. The output file is only created once the gate has
/// passed; a model with validation errors never touches the output path.
///
/// # Errors
///
/// Returns the first terminal failure: a read fault on either source file,
/// validation errors in the model, an interpreter fault, or a write fault
/// on the output path.
#[tracing::instrument(
    name = "pipeline_run",
    skip(engine, report_out),
    fields(model = %args.model.display(), package = %args.package)
)]
pub fn run<E: Interpreter + ?Sized>(
    engine: &mut E,
    args: &PipelineArgs,
    report_out: &mut dyn Write,
) -> Result<(), PipelineError> {
    tracing::info!(path = %args.standard_library.display(), "Loading standard library");
    engine.load_library(&args.standard_library)?;

    tracing::info!(path = %args.tagging_library.display(), "Loading semantic tagging library");
    let tagging = fs::read_to_string(&args.tagging_library)
        .map_err(|e| PipelineError::read(&args.tagging_library, e))?;
    // The tagging library's own processing result is not part of the
    // driver's output; only interpreter faults stop the run here.
    engine.process(&tagging)?;

    tracing::info!("Processing target model");
    let model =
        fs::read_to_string(&args.model).map_err(|e| PipelineError::read(&args.model, e))?;
    let result = engine.process(&model)?;

    // The validation report is always shown, pass or fail. Flush now:
    // the driver may terminate through process::exit, which skips the
    // usual stdout cleanup.
    let _ = writeln!(report_out, "{result}");
    let _ = report_out.flush();

    if result.has_errors() {
        tracing::info!("Model has validation errors, export skipped");
        return Err(PipelineError::ModelErrors);
    }

    tracing::info!("Exporting AST");
    let ast = engine.export(&args.package, &[])?;

    tracing::info!(path = %args.ast_output.display(), "Writing AST file");
    fs::write(&args.ast_output, ast.as_str())
        .map_err(|e| PipelineError::write(&args.ast_output, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_template() {
        let err = PipelineError::read(
            Path::new("/missing/tags.sysml"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        );
        let rendered = err.to_string();
        assert!(rendered.starts_with("IOException: "));
        assert!(rendered.contains("/missing/tags.sysml"));
    }

    #[test]
    fn test_model_errors_template() {
        assert_eq!(
            PipelineError::ModelErrors.to_string(),
            "An error has occurred while parsing the model"
        );
    }

    #[test]
    fn test_write_error_template() {
        let err = PipelineError::write(
            Path::new("/no/such/dir/out.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert!(
            err.to_string()
                .starts_with("An error occurred while writing to the file: ")
        );
    }

    #[test]
    fn test_engine_error_template() {
        let err = PipelineError::from(EngineError::configuration("empty engine command"));
        assert!(err.to_string().starts_with("Interpreter error: "));
    }
}
