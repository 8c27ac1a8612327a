//! Command-line interface for stu-astgen

use std::path::PathBuf;

use clap::Parser;

use crate::pipeline::PipelineArgs;
use crate::tracing::{LogLevel, TracingFormat};

/// Engine adapter command used when neither `--engine` nor `STU_ENGINE` is set
pub const DEFAULT_ENGINE: &str = "sysml-interactive";

/// Validate a SysML v2 model and export its AST
#[derive(Parser, Debug)]
#[command(name = "stu-astgen")]
#[command(
    about = "Validates a SysML v2 model against the standard and semantic tagging libraries, then exports the AST of one package to a file"
)]
#[command(version)]
pub struct Cli {
    /// Path to the standard library definition to load into the interpreter
    #[arg(value_name = "STANDARD_LIB")]
    pub standard_library: PathBuf,

    /// Path to the semantic tagging library source text
    #[arg(value_name = "TAGGING_LIB")]
    pub tagging_library: PathBuf,

    /// Path to the target model source text to validate
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Name of the package to export as AST
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// Output path for the serialized AST text
    #[arg(value_name = "AST_OUTPUT")]
    pub ast_output: PathBuf,

    /// Command used to start the engine adapter process
    #[arg(
        long,
        env = "STU_ENGINE",
        default_value = DEFAULT_ENGINE,
        value_name = "CMD"
    )]
    pub engine: String,

    /// Set logging level
    #[arg(short = 'l', long, default_value = "warn", value_enum)]
    pub level: LogLevel,

    /// Set logging output format
    #[arg(long, default_value = "pretty", value_enum)]
    pub log_format: TracingFormat,
}

impl Cli {
    /// The five positional inputs, resolved for a pipeline run
    #[must_use]
    pub fn pipeline_args(&self) -> PipelineArgs {
        PipelineArgs {
            standard_library: self.standard_library.clone(),
            tagging_library: self.tagging_library.clone(),
            model: self.model.clone(),
            package: self.package.clone(),
            ast_output: self.ast_output.clone(),
        }
    }
}

/// Parse command-line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
