//! This crate provides the core logic for a deterministic single-tape Turing machine simulator
//! following the textbook convention of a right-infinite tape whose cell 0 holds an immutable
//! left-end marker, a distinguished blank symbol, and accept/reject/halt states.
//!
//! It includes modules for parsing machine descriptions, validating them, executing them
//! step by step, and a small catalog of built-in machines.
//!
//! ```
//! use tmsim::{run, tokenize, Machine, RunOptions, Spec};
//!
//! let spec: Spec = "s [> -> s [> R\ns 0 -> s 1 R\ns u -> h u S".parse().unwrap();
//! let input = tokenize("000", &spec).unwrap();
//! let mut machine = Machine::new(spec, input);
//!
//! let verdict = run(&mut machine, &RunOptions::default()).unwrap();
//! assert_eq!(verdict.to_string(), "111");
//! ```

pub mod analyzer;
pub mod input;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod run;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function from the analyzer module.
pub use analyzer::analyze;
/// Re-exports the input tokenizer.
pub use input::tokenize;
/// Re-exports the `SpecLoader` struct from the loader module.
pub use loader::SpecLoader;
/// Re-exports the engine types from the machine module.
pub use machine::{Machine, Status, Window};
/// Re-exports the parse functions from the parser module.
pub use parser::{parse, parse_with};
/// Re-exports `Program`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramManager, PROGRAMS};
/// Re-exports the caller loop helpers from the run module.
pub use run::{run, Report, RunOptions, Verdict};
/// Re-exports the sparse `Tape` from the tape module.
pub use tape::Tape;
/// Re-exports the machine description and error types from the types module.
pub use types::{
    Defaults, InputError, LoadError, Mode, Move, Outcome, RuntimeError, Spec, State, Symbol,
    Transition,
};
