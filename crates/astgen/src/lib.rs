//! stu-astgen - SysML v2 AST generation pipeline
//!
//! This crate drives the external SysML v2 interpreter through a fixed
//! five-stage pipeline: load the standard library, load the semantic
//! tagging library, validate the target model, gate on validation errors,
//! and persist the exported AST of one package to disk.
//!
//! The heavy lifting (parsing, semantic analysis, AST construction) lives
//! behind the [`stu_engine::Interpreter`] trait; this crate only sequences
//! the stages and maps every failure onto a fixed diagnostic and exit code.

pub mod cli;
pub mod pipeline;
pub mod tracing;
