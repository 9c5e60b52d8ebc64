//! Scope display for lexical name resolution
//!
//! Every running call owns a [`FunctionInvocation`] on an explicit call
//! stack. The display maps each lexical depth to the frame currently
//! installed there, so resolving a name is a walk from the current level
//! outward that never touches frames of unrelated callers.
//!
//! Entering a function saves whatever the display held at the function's
//! depth together with the caller's level; leaving restores both. This
//! keeps recursion and calls into shallower functions correct.

use super::error::{InterpResult, RuntimeError};
use super::function::{FunctionDefinition, FunctionInvocation, Name};
use super::value::Value;
use crate::config::Config;
use crate::syntax::NodeId;
use std::rc::Rc;

/// Resolved location of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Display level of the owning frame
    pub depth: usize,
    pub slot: usize,
    pub constant: bool,
}

/// Evaluates parse-tree nodes against a display
pub trait Evaluate {
    fn evaluate(&mut self, display: &mut ScopeDisplay, node: NodeId) -> InterpResult<Value>;

    /// Evaluate a function body. Bindings it makes must stay visible to
    /// the return expression.
    fn evaluate_body(&mut self, display: &mut ScopeDisplay, node: NodeId) -> InterpResult<Value> {
        self.evaluate(display, node)
    }
}

/// Bookkeeping for one `execute` so the display can be restored
#[derive(Debug)]
struct Activation {
    depth: usize,
    shadowed: Option<usize>,
    caller_level: usize,
}

#[derive(Debug)]
pub struct ScopeDisplay {
    /// Call stack, innermost last
    frames: Vec<FunctionInvocation>,
    /// Lexical depth -> index into `frames`
    display: Vec<Option<usize>>,
    current_level: usize,
    max_call_depth: usize,
}

impl ScopeDisplay {
    pub fn new(capacity: usize, max_call_depth: usize) -> Self {
        ScopeDisplay {
            frames: Vec::new(),
            display: vec![None; capacity],
            current_level: 0,
            max_call_depth,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.display_capacity, config.max_call_depth)
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    /// Number of live invocations
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    fn frame_at(&self, depth: usize) -> Option<&FunctionInvocation> {
        let index = (*self.display.get(depth)?)?;
        self.frames.get(index)
    }

    fn frame_at_mut(&mut self, depth: usize) -> Option<&mut FunctionInvocation> {
        let index = (*self.display.get(depth)?)?;
        self.frames.get_mut(index)
    }

    fn current_frame(&mut self) -> InterpResult<&mut FunctionInvocation> {
        let level = self.current_level;
        self.frame_at_mut(level)
            .ok_or_else(|| RuntimeError::malformed(format!("no invocation installed at level {level}")))
    }

    /// Innermost visible binding of `name`
    pub fn find_reference(&self, name: &str) -> Option<Reference> {
        (0..=self.current_level).rev().find_map(|depth| {
            let (slot, constant) = self.frame_at(depth)?.lookup(name)?;
            Some(Reference {
                depth,
                slot,
                constant,
            })
        })
    }

    /// Innermost visible function named `name`
    pub fn find_function(&self, name: &str) -> Option<Rc<FunctionDefinition>> {
        (0..=self.current_level)
            .rev()
            .find_map(|depth| self.frame_at(depth)?.definition().nested(name))
    }

    /// Function attached to the definition running at the current level
    pub fn find_function_in_current_level(&self, name: &str) -> Option<Rc<FunctionDefinition>> {
        self.frame_at(self.current_level)?.definition().nested(name)
    }

    /// Whether `name` is bound as a variable or constant at the current level
    pub fn is_bound_here(&self, name: &str) -> bool {
        self.frame_at(self.current_level)
            .is_some_and(|frame| frame.is_bound(name))
    }

    pub fn define_variable(&mut self, name: &str) -> InterpResult<Reference> {
        self.define(name, false)
    }

    pub fn define_constant(&mut self, name: &str) -> InterpResult<Reference> {
        self.define(name, true)
    }

    fn define(&mut self, name: &str, constant: bool) -> InterpResult<Reference> {
        let depth = self.current_level;
        let frame = self.current_frame()?;
        if frame.is_bound(name) {
            let what = if constant { "constant" } else { "variable" };
            return Err(RuntimeError::redefinition(what, name));
        }
        let slot = frame.allocate(Name::from(name), constant);
        Ok(Reference {
            depth,
            slot,
            constant,
        })
    }

    /// Attach a named function to the definition running at the current
    /// level. Re-registering the same definition (a loop body running
    /// twice, or a recursive activation) is accepted.
    pub fn define_function(&mut self, definition: Rc<FunctionDefinition>) -> InterpResult<()> {
        let owner = Rc::clone(self.current_frame()?.definition());
        let name = definition.display_name();
        if let Some(existing) = self.find_function_in_current_level(name) {
            if Rc::ptr_eq(&existing, &definition) {
                return Ok(());
            }
            return Err(RuntimeError::redefinition("function", name));
        }
        owner.attach(definition)
    }

    /// Unbind a variable or constant at the current level
    pub fn remove_variable(&mut self, name: &str) -> bool {
        let level = self.current_level;
        self.frame_at_mut(level).is_some_and(|frame| frame.release(name))
    }

    pub fn remove_function(&mut self, name: &str) -> bool {
        let level = self.current_level;
        self.frame_at(level)
            .is_some_and(|frame| frame.definition().detach(name))
    }

    pub fn read(&self, reference: Reference) -> InterpResult<Value> {
        self.frame_at(reference.depth)
            .map(|frame| frame.slot(reference.slot))
            .ok_or_else(|| dangling(reference))
    }

    /// Store through a reference. Constness is the caller's concern so
    /// that initialisers can fill constant slots.
    pub fn write(&mut self, reference: Reference, value: Value) -> InterpResult<()> {
        let frame = self
            .frame_at_mut(reference.depth)
            .ok_or_else(|| dangling(reference))?;
        frame.set_slot(reference.slot, value);
        Ok(())
    }

    /// Install `invocation`, evaluate its body and return expression, and
    /// restore the display whatever the outcome.
    pub fn execute<E: Evaluate + ?Sized>(
        &mut self,
        invocation: FunctionInvocation,
        evaluator: &mut E,
    ) -> InterpResult<Value> {
        let definition = Rc::clone(invocation.definition());
        let activation = self.push(invocation)?;
        tracing::debug!(
            function = %definition.signature(),
            depth = activation.depth,
            calls = self.frames.len(),
            "enter"
        );

        let result = match evaluator.evaluate_body(self, definition.body) {
            Ok(_) => match definition.ret {
                Some(ret) => evaluator.evaluate(self, ret),
                None => Ok(Value::Null),
            },
            Err(e) => Err(e),
        };

        self.pop(activation);
        tracing::debug!(function = %definition.signature(), ok = result.is_ok(), "leave");
        result
    }

    fn push(&mut self, invocation: FunctionInvocation) -> InterpResult<Activation> {
        let depth = invocation.definition().depth;
        if depth >= self.display.len() {
            return Err(RuntimeError::nesting_too_deep(depth, self.display.len()));
        }
        if self.frames.len() >= self.max_call_depth {
            return Err(RuntimeError::stack_overflow(self.max_call_depth));
        }
        self.frames.push(invocation);
        let shadowed = self.display[depth].replace(self.frames.len() - 1);
        let activation = Activation {
            depth,
            shadowed,
            caller_level: self.current_level,
        };
        self.current_level = depth;
        Ok(activation)
    }

    fn pop(&mut self, activation: Activation) {
        self.frames.pop();
        self.display[activation.depth] = activation.shadowed;
        self.current_level = activation.caller_level;
    }
}

impl Default for ScopeDisplay {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn dangling(reference: Reference) -> RuntimeError {
    RuntimeError::malformed(format!(
        "reference to level {} slot {} outlived its invocation",
        reference.depth, reference.slot
    ))
}
