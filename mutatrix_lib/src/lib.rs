//! # Mutatrix Lib
//!
//! `mutatrix_lib` implements the mutation-testing pipeline for Rust source code:
//! enumerate mutable sites in a parsed file, apply one reversible mutation at a
//! time, serialize and deduplicate each mutant, run the configured test command
//! against it, and aggregate the classifications into a mutation-score report.
//!
//! ## Mutatrix Lib Design
//!
//! The library is organized around the stages of that pipeline:
//! - A registry of named mutation operators (`category/operator`).
//! - A walker that traverses the tree depth-first and performs the
//!   apply/yield/revert handshake for every proposed mutation.
//! - Annotation and argument filters that veto mutation of specific nodes.
//! - A canonical serializer and fingerprint-based deduplication.
//! - An execution harness classifying each mutant as killed, escaped, skipped,
//!   or errored.
//! - A report aggregator computing the mutation score index.

pub use self::error::{MutatrixError, Result};
pub use self::exec::Classification;
pub use self::mutator::Mutator;
pub use self::printer::SeenSet;
pub use self::registry::MutatorRegistry;
pub use self::report::Report;
pub use self::source::SourceFile;
pub use self::types::TypeIndex;
pub use self::walker::MutationWalker;

pub mod annotation;
pub mod astutil;
pub mod config;
pub mod error;
pub mod exec;
pub mod filter;
pub mod mutator;
pub mod mutators;
pub mod printer;
pub mod registry;
pub mod report;
pub mod source;
pub mod types;
mod visitor;
pub mod walker;
