//! Function definitions and per-call invocation records

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use crate::syntax::NodeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub type Name = Rc<str>;

/// A function as written: built once per definition node and shared by
/// every invocation and every function value that refers to it.
///
/// Functions defined inside the body are attached here rather than to an
/// invocation, so every activation (recursive ones included) sees a
/// nested function once any activation has run its definition.
#[derive(Debug)]
pub struct FunctionDefinition {
    /// `None` for anonymous functions
    pub name: Option<Name>,
    pub params: Vec<Name>,
    /// Display level the body runs at (definition level + 1)
    pub depth: usize,
    pub body: NodeId,
    /// Return expression; functions without one are statement-only
    pub ret: Option<NodeId>,
    nested: RefCell<HashMap<Name, Rc<FunctionDefinition>>>,
}

impl FunctionDefinition {
    pub fn new(
        name: Option<Name>,
        params: Vec<Name>,
        depth: usize,
        body: NodeId,
        ret: Option<NodeId>,
    ) -> Self {
        FunctionDefinition {
            name,
            params,
            depth,
            body,
            ret,
            nested: RefCell::new(HashMap::new()),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    /// `name(a, b)`, used in diagnostics
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.params.iter().map(|p| &**p).collect();
        format!("{}({})", self.display_name(), params.join(", "))
    }

    /// Function defined in this body under `name`
    pub fn nested(&self, name: &str) -> Option<Rc<FunctionDefinition>> {
        self.nested.borrow().get(name).cloned()
    }

    /// Attach a named function to this body. The caller checks for
    /// redefinition.
    pub fn attach(&self, definition: Rc<FunctionDefinition>) -> InterpResult<()> {
        let Some(name) = definition.name.clone() else {
            return Err(RuntimeError::malformed(
                "anonymous functions cannot be added to a function table",
            ));
        };
        self.nested.borrow_mut().insert(name, definition);
        Ok(())
    }

    pub fn detach(&self, name: &str) -> bool {
        self.nested.borrow_mut().remove(name).is_some()
    }
}

impl fmt::Display for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// Activation record for one call
///
/// Slots are sparse: they are created on first write and read as `Null`
/// until then. Variables and constants live in separate name tables that
/// share the slot space, so a constant can never be reached through the
/// variable form of its name.
#[derive(Debug)]
pub struct FunctionInvocation {
    definition: Rc<FunctionDefinition>,
    slots: Vec<Value>,
    variables: HashMap<Name, usize>,
    constants: HashMap<Name, usize>,
    next_slot: usize,
    /// Next parameter slot to receive an argument
    cursor: usize,
}

impl FunctionInvocation {
    /// Fresh record with one variable slot per parameter
    pub fn new(definition: Rc<FunctionDefinition>) -> Self {
        let mut invocation = FunctionInvocation {
            variables: HashMap::with_capacity(definition.params.len()),
            slots: Vec::with_capacity(definition.params.len()),
            constants: HashMap::new(),
            next_slot: 0,
            cursor: 0,
            definition,
        };
        let params = invocation.definition.params.clone();
        for param in params {
            invocation.allocate(param, false);
        }
        invocation
    }

    pub fn definition(&self) -> &Rc<FunctionDefinition> {
        &self.definition
    }

    /// Store the next positional argument
    pub fn bind_argument(&mut self, value: Value) -> InterpResult<()> {
        if self.cursor >= self.definition.arity() {
            return Err(RuntimeError::arity_mismatch(
                &self.definition.signature(),
                self.definition.arity(),
                self.cursor + 1,
            ));
        }
        self.set_slot(self.cursor, value);
        self.cursor += 1;
        Ok(())
    }

    /// Fail unless every parameter received an argument
    pub fn check_arguments(&self) -> InterpResult<()> {
        if self.cursor != self.definition.arity() {
            return Err(RuntimeError::arity_mismatch(
                &self.definition.signature(),
                self.definition.arity(),
                self.cursor,
            ));
        }
        Ok(())
    }

    /// Slot and constness of a name bound in this record
    pub fn lookup(&self, name: &str) -> Option<(usize, bool)> {
        if let Some(slot) = self.variables.get(name) {
            return Some((*slot, false));
        }
        self.constants.get(name).map(|slot| (*slot, true))
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.variables.contains_key(name) || self.constants.contains_key(name)
    }

    /// Bind `name` to a fresh slot. The caller checks for redefinition.
    pub fn allocate(&mut self, name: Name, constant: bool) -> usize {
        let slot = self.next_slot;
        self.next_slot += 1;
        if constant {
            self.constants.insert(name, slot);
        } else {
            self.variables.insert(name, slot);
        }
        slot
    }

    /// Unbind `name` (either form). Releasing the newest slot shrinks the
    /// record so loop bodies do not grow it without bound.
    pub fn release(&mut self, name: &str) -> bool {
        let slot = match self.variables.remove(name) {
            Some(slot) => slot,
            None => match self.constants.remove(name) {
                Some(slot) => slot,
                None => return false,
            },
        };
        if let Some(value) = self.slots.get_mut(slot) {
            *value = Value::Null;
        }
        while self.next_slot > 0 && !self.in_use(self.next_slot - 1) {
            self.next_slot -= 1;
        }
        self.slots.truncate(self.next_slot);
        true
    }

    fn in_use(&self, slot: usize) -> bool {
        self.variables.values().chain(self.constants.values()).any(|s| *s == slot)
    }

    pub fn slot(&self, slot: usize) -> Value {
        self.slots.get(slot).cloned().unwrap_or(Value::Null)
    }

    pub fn set_slot(&mut self, slot: usize, value: Value) {
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, Value::Null);
        }
        self.slots[slot] = value;
    }

    /// Number of slots currently materialised
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
