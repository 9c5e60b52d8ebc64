//! Runtime errors for the interpreter

use crate::syntax::Span;
use thiserror::Error;

/// Runtime error during interpretation
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Runtime error: {message}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Source span of the innermost node that failed, if the parser gave one
    pub span: Option<Span>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Undefined variable or constant
    UndefinedVariable,
    /// Undefined function
    UndefinedFunction,
    /// Name already bound at this level
    Redefinition,
    /// Operation unsupported for the operand kind(s)
    TypeError,
    /// Prototype method not defined for a kind
    UnknownMethod,
    /// Argument count mismatch
    ArityMismatch,
    /// Index out of range or absent key
    IndexOutOfBounds,
    /// Append to a full Array
    CapacityExceeded,
    /// Write to a constant
    ConstantViolation,
    /// Call depth or lexical nesting exhausted
    StackOverflow,
    /// Host failure inside a native function
    Native,
    /// Parse tree does not have the expected shape
    MalformedTree,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError {
            kind,
            message,
            span: None,
        }
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedVariable, format!("variable '{name}' is undefined"))
    }

    pub fn undefined_function(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedFunction, format!("function '{name}' is undefined"))
    }

    pub fn redefinition(what: &str, name: &str) -> Self {
        Self::new(
            ErrorKind::Redefinition,
            format!("{what} '{name}' is already defined in this scope"),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message.into())
    }

    pub fn unknown_method(method: &str, kind: &str) -> Self {
        Self::new(
            ErrorKind::UnknownMethod,
            format!("{kind} has no method '{method}'"),
        )
    }

    pub fn arity_mismatch(signature: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("{signature} expects {expected} argument(s), got {got}"),
        )
    }

    pub fn index_out_of_bounds(index: i64, len: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("index {index} out of bounds for length {len}"),
        )
    }

    pub fn missing_key(key: &str) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds, format!("key '{key}' not found"))
    }

    pub fn empty_collection(kind: &str, method: &str) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("cannot {method} from an empty {kind}"),
        )
    }

    pub fn capacity_exceeded(capacity: usize) -> Self {
        Self::new(
            ErrorKind::CapacityExceeded,
            format!("array is full (capacity {capacity})"),
        )
    }

    pub fn constant_violation(name: &str) -> Self {
        Self::new(
            ErrorKind::ConstantViolation,
            format!("cannot assign to constant '{name}'"),
        )
    }

    pub fn uninitialized_constant(name: &str) -> Self {
        Self::new(
            ErrorKind::ConstantViolation,
            format!("constant '{name}' must be initialised where it is declared"),
        )
    }

    pub fn stack_overflow(limit: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("stack overflow: call depth exceeded {limit}"),
        )
    }

    pub fn nesting_too_deep(depth: usize, capacity: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("function nesting depth {depth} exceeds the display capacity {capacity}"),
        )
    }

    pub fn native(function: &str, msg: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Native, format!("{function}: {msg}"))
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedTree, msg.into())
    }

    /// Attach a span unless a more precise one is already present
    pub fn at(mut self, span: Option<Span>) -> Self {
        if self.span.is_none() {
            self.span = span;
        }
        self
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
