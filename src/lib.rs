//! A minimal line-oriented command interpreter.
//!
//! Each input line is split into whitespace-separated words, the first word is
//! resolved to an executable through `PATH`, and the program is run as a child
//! process with the inherited environment. The interpreter remembers the status
//! of the last command and reports it as its own exit status.
//!
//! The main entry point is [`Interpreter`], which drives the read/resolve/launch
//! loop over any buffered reader. The public modules [`env`], [`resolve`] and
//! [`launch`] expose the individual steps for embedding and testing.

mod builtin;
pub mod env;
mod interpreter;
pub mod launch;
pub mod resolve;
pub mod tokenizer;

/// Re-export of the command loop.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{Flow, Interpreter, PROMPT};
pub use launch::ExitOutcome;
