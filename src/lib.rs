//! A minimal tape interpreter for Brainfuck.
//!
//! The engine is a program counter over the source text plus a cursor into an
//! unbounded tape of byte cells.
//!
//! Features and behaviors:
//! - The tape grows lazily in both directions; every cell starts at 0.
//! - Cells are `u8` and wrap modulo 256 on `+` and `-`.
//! - Input `,` reads a single byte; on end of input the current cell is set to
//!   0 (or left unchanged, see [`EofBehavior`]).
//! - Output `.` writes the current cell to stdout as a single raw byte.
//! - Brackets are validated before anything runs; jumps are resolved by
//!   rescanning the source with a nesting counter.
//! - Any character outside `><+-.,[]` is a comment.
//!
//! Quick start:
//!
//! ```no_run
//! use tape_bf::{Interpreter, HELLO_WORLD};
//!
//! let mut bf = Interpreter::new();
//! bf.run(HELLO_WORLD).expect("program should run");
//! ```

pub mod brackets;
pub mod cli_util;
pub mod config;
pub mod interpreter;
pub mod logging;
pub mod tape;
pub mod terminal;

pub use brackets::{validate_brackets, UnmatchedBracketKind};
pub use interpreter::{EofBehavior, Interpreter, InterpreterError, StepControl};
pub use tape::Tape;

/// Prints `Hello World!\n`. Used as the conformance fixture.
pub const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
