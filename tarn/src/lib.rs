//! Tarn interpreter library
//!
//! Evaluates parse trees of a small dynamically-typed scripting language.
//! Trees come from an external parser as JSON (see [`syntax::ParseTree`])
//! or are assembled in Rust with [`syntax::build`].

pub mod config;
pub mod error;
pub mod interp;
pub mod syntax;

pub use config::Config;
pub use error::{Result, TarnError};
pub use interp::{Interpreter, RuntimeError, ScopeDisplay, Value};
pub use syntax::{NodeId, NodeKind, ParseTree, Span};
