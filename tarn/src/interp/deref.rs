//! Indexed read and write on compound values

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use std::fmt;
use std::rc::Rc;

/// One step of a dereference chain
#[derive(Debug, Clone, PartialEq)]
pub enum Subscript {
    /// `base[expr]`: the evaluated index
    Index(Value),
    /// `base.name`: a bare key taken literally
    Member(Rc<str>),
}

impl fmt::Display for Subscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subscript::Index(value) => write!(f, "[{}]", value.repr()),
            Subscript::Member(name) => write!(f, ".{name}"),
        }
    }
}

impl Subscript {
    /// Object key: members are used as written, indices are stringified
    fn key(&self) -> String {
        match self {
            Subscript::Index(value) => value.to_string(),
            Subscript::Member(name) => name.to_string(),
        }
    }

    /// Integer position for List, Array and String receivers
    fn position(&self, receiver: &Value) -> InterpResult<i64> {
        match self {
            Subscript::Index(Value::Integer(n)) => Ok(*n),
            other => Err(RuntimeError::type_error(format!(
                "{} index must be an Integer, got {}",
                receiver.type_name(),
                match other {
                    Subscript::Index(value) => value.describe(),
                    Subscript::Member(name) => format!("member '{name}'"),
                }
            ))),
        }
    }
}

/// Bounds-check `index` against `len`
pub(crate) fn checked_index(index: i64, len: usize) -> InterpResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| RuntimeError::index_out_of_bounds(index, len))
}

impl Value {
    /// Read the element `subscript` designates
    pub fn dereference(&self, subscript: &Subscript) -> InterpResult<Value> {
        match self {
            Value::List(items) => {
                let items = items.borrow();
                let i = checked_index(subscript.position(self)?, items.len())?;
                Ok(items[i].clone())
            }
            Value::Array(array) => {
                let array = array.borrow();
                let i = checked_index(subscript.position(self)?, array.items.len())?;
                Ok(array.items[i].clone())
            }
            Value::String(text) => {
                let index = subscript.position(self)?;
                let len = text.chars().count();
                let i = checked_index(index, len)?;
                let ch = text.chars().nth(i).ok_or_else(|| RuntimeError::index_out_of_bounds(index, len))?;
                Ok(Value::string(ch.to_string()))
            }
            Value::Object(entries) => {
                let key = subscript.key();
                entries
                    .borrow()
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| RuntimeError::missing_key(&key))
            }
            other => Err(RuntimeError::type_error(format!(
                "cannot dereference {} with {subscript}",
                other.describe()
            ))),
        }
    }

    /// Replace the element `subscript` designates. Lists and Arrays are never
    /// extended; Objects gain the key if it is absent.
    pub fn set(&self, subscript: &Subscript, value: Value) -> InterpResult<()> {
        match self {
            Value::List(items) => {
                let i = checked_index(subscript.position(self)?, items.borrow().len())?;
                items.borrow_mut()[i] = value;
                Ok(())
            }
            Value::Array(array) => {
                let i = checked_index(subscript.position(self)?, array.borrow().items.len())?;
                array.borrow_mut().items[i] = value;
                Ok(())
            }
            Value::Object(entries) => {
                entries.borrow_mut().insert(subscript.key(), value);
                Ok(())
            }
            other => Err(RuntimeError::type_error(format!(
                "cannot assign through {} with {subscript}",
                other.describe()
            ))),
        }
    }
}
