//! Tree-walking interpreter
//!
//! Values live in `value`, name resolution in [`scope`] and the node
//! dispatch loop in [`Interpreter`]. Host functions are plain `fn`
//! pointers registered in a [`NativeRegistry`].

mod cache;
mod deref;
pub mod error;
mod eval;
mod function;
pub mod native;
mod numeric;
mod prototype;
pub mod scope;
mod value;

pub use deref::Subscript;
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub use function::{FunctionDefinition, FunctionInvocation, Name};
pub use native::{value_of_native, NativeContext, NativeFn, NativeRegistry};
pub use numeric::parse_number;
pub use scope::{Evaluate, Reference, ScopeDisplay};
pub use value::{ArrayRef, ArrayValue, FunctionValue, ListRef, NativeHandle, ObjectRef, Value, ValueKind};
