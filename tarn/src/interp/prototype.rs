//! Prototype methods: the per-kind method tables behind `receiver.name(..)`

use super::deref::checked_index;
use super::error::{InterpResult, RuntimeError};
use super::value::{ArrayRef, ListRef, ObjectRef, Value};

fn expect_args(kind: &str, method: &str, params: &[&str], args: &[Value]) -> InterpResult<()> {
    if args.len() != params.len() {
        let signature = format!("{kind}.{method}({})", params.join(", "));
        return Err(RuntimeError::arity_mismatch(&signature, params.len(), args.len()));
    }
    Ok(())
}

fn integer_arg(method: &str, value: &Value) -> InterpResult<i64> {
    value.as_integer().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{method} expects an Integer, got {}",
            value.describe()
        ))
    })
}

fn size_arg(method: &str, value: &Value) -> InterpResult<usize> {
    let n = integer_arg(method, value)?;
    usize::try_from(n).map_err(|_| {
        RuntimeError::type_error(format!("{method} expects a non-negative Integer, got {n}"))
    })
}

fn string_arg<'a>(method: &str, value: &'a Value) -> InterpResult<&'a str> {
    value.as_str().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{method} expects a String, got {}",
            value.describe()
        ))
    })
}

/// Insertion point: `0..=len` is valid
fn insert_index(index: i64, len: usize) -> InterpResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i <= len)
        .ok_or_else(|| RuntimeError::index_out_of_bounds(index, len))
}

fn position_of(items: &[Value], needle: &Value) -> Option<usize> {
    items
        .iter()
        .position(|item| item.equals(needle).unwrap_or(false))
}

fn length(n: usize) -> Value {
    Value::Integer(n as i64)
}

impl Value {
    /// Dispatch a prototype method on this value
    pub fn call_method(&self, method: &str, args: &[Value]) -> InterpResult<Value> {
        let handled = match self {
            Value::List(list) => list_method(self, list, method, args)?,
            Value::Array(array) => array_method(self, array, method, args)?,
            Value::Object(entries) => object_method(entries, method, args)?,
            Value::String(text) => string_method(text, method, args)?,
            _ => None,
        };
        match handled {
            Some(value) => Ok(value),
            None => self.common_method(method, args),
        }
    }

    /// Methods every kind answers
    fn common_method(&self, method: &str, args: &[Value]) -> InterpResult<Value> {
        let kind = self.type_name();
        match method {
            "getClass" => {
                expect_args(kind, method, &[], args)?;
                Ok(Value::string(kind))
            }
            "toString" => {
                expect_args(kind, method, &[], args)?;
                Ok(Value::string(self.to_string()))
            }
            _ => Err(RuntimeError::unknown_method(method, kind)),
        }
    }
}

// Borrows are taken per operation and released before any element is
// compared or formatted, since an argument may alias the receiver.

fn list_method(
    receiver: &Value,
    list: &ListRef,
    method: &str,
    args: &[Value],
) -> InterpResult<Option<Value>> {
    const KIND: &str = "List";
    let value = match method {
        "size" | "length" => {
            expect_args(KIND, method, &[], args)?;
            length(list.borrow().len())
        }
        "append" | "push" => {
            expect_args(KIND, method, &["value"], args)?;
            list.borrow_mut().push(args[0].clone());
            receiver.clone()
        }
        "pop" => {
            expect_args(KIND, method, &[], args)?;
            let popped = list.borrow_mut().pop();
            popped.ok_or_else(|| RuntimeError::empty_collection(KIND, method))?
        }
        "shift" => {
            expect_args(KIND, method, &[], args)?;
            let mut items = list.borrow_mut();
            if items.is_empty() {
                return Err(RuntimeError::empty_collection(KIND, method));
            }
            items.remove(0)
        }
        "insert" => {
            expect_args(KIND, method, &["index", "value"], args)?;
            let len = list.borrow().len();
            let i = insert_index(integer_arg(method, &args[0])?, len)?;
            list.borrow_mut().insert(i, args[1].clone());
            receiver.clone()
        }
        "remove" => {
            expect_args(KIND, method, &["index"], args)?;
            let len = list.borrow().len();
            let i = checked_index(integer_arg(method, &args[0])?, len)?;
            list.borrow_mut().remove(i)
        }
        "indexOf" => {
            expect_args(KIND, method, &["value"], args)?;
            position_of(&list.borrow(), &args[0]).map_or(Value::Integer(-1), length)
        }
        "contains" => {
            expect_args(KIND, method, &["value"], args)?;
            Value::Boolean(position_of(&list.borrow(), &args[0]).is_some())
        }
        "copy" => {
            expect_args(KIND, method, &[], args)?;
            Value::list(list.borrow().clone())
        }
        "clear" => {
            expect_args(KIND, method, &[], args)?;
            list.borrow_mut().clear();
            Value::Null
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn array_method(
    receiver: &Value,
    array: &ArrayRef,
    method: &str,
    args: &[Value],
) -> InterpResult<Option<Value>> {
    const KIND: &str = "Array";
    let value = match method {
        "size" | "length" => {
            expect_args(KIND, method, &[], args)?;
            length(array.borrow().items.len())
        }
        "capacity" => {
            expect_args(KIND, method, &[], args)?;
            length(array.borrow().capacity)
        }
        "append" | "push" => {
            expect_args(KIND, method, &["value"], args)?;
            array.borrow_mut().push(args[0].clone())?;
            receiver.clone()
        }
        "pop" => {
            expect_args(KIND, method, &[], args)?;
            let popped = array.borrow_mut().items.pop();
            popped.ok_or_else(|| RuntimeError::empty_collection(KIND, method))?
        }
        "shift" => {
            expect_args(KIND, method, &[], args)?;
            let mut array = array.borrow_mut();
            if array.items.is_empty() {
                return Err(RuntimeError::empty_collection(KIND, method));
            }
            array.items.remove(0)
        }
        "insert" => {
            expect_args(KIND, method, &["index", "value"], args)?;
            let len = array.borrow().items.len();
            let i = insert_index(integer_arg(method, &args[0])?, len)?;
            array.borrow_mut().insert(i, args[1].clone())?;
            receiver.clone()
        }
        "remove" => {
            expect_args(KIND, method, &["index"], args)?;
            let len = array.borrow().items.len();
            let i = checked_index(integer_arg(method, &args[0])?, len)?;
            array.borrow_mut().items.remove(i)
        }
        "resize" => {
            expect_args(KIND, method, &["capacity"], args)?;
            array.borrow_mut().resize(size_arg(method, &args[0])?)?;
            receiver.clone()
        }
        "indexOf" => {
            expect_args(KIND, method, &["value"], args)?;
            position_of(&array.borrow().items, &args[0]).map_or(Value::Integer(-1), length)
        }
        "contains" => {
            expect_args(KIND, method, &["value"], args)?;
            Value::Boolean(position_of(&array.borrow().items, &args[0]).is_some())
        }
        "copy" => {
            expect_args(KIND, method, &[], args)?;
            Value::array(array.borrow().clone())
        }
        "clear" => {
            expect_args(KIND, method, &[], args)?;
            array.borrow_mut().items.clear();
            Value::Null
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn object_method(entries: &ObjectRef, method: &str, args: &[Value]) -> InterpResult<Option<Value>> {
    const KIND: &str = "Object";
    let value = match method {
        "size" => {
            expect_args(KIND, method, &[], args)?;
            length(entries.borrow().len())
        }
        "keys" => {
            expect_args(KIND, method, &[], args)?;
            Value::list(entries.borrow().keys().map(|k| Value::string(k.as_str())).collect())
        }
        "values" => {
            expect_args(KIND, method, &[], args)?;
            Value::list(entries.borrow().values().cloned().collect())
        }
        "has" => {
            expect_args(KIND, method, &["key"], args)?;
            let key = args[0].to_string();
            Value::Boolean(entries.borrow().contains_key(&key))
        }
        "remove" => {
            expect_args(KIND, method, &["key"], args)?;
            let key = args[0].to_string();
            let removed = entries.borrow_mut().remove(&key);
            removed.ok_or_else(|| RuntimeError::missing_key(&key))?
        }
        "copy" => {
            expect_args(KIND, method, &[], args)?;
            Value::object(entries.borrow().clone())
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn string_method(text: &str, method: &str, args: &[Value]) -> InterpResult<Option<Value>> {
    const KIND: &str = "String";
    let value = match method {
        "size" | "length" => {
            expect_args(KIND, method, &[], args)?;
            length(text.chars().count())
        }
        "indexOf" => {
            expect_args(KIND, method, &["text"], args)?;
            let needle = string_arg(method, &args[0])?;
            match text.find(needle) {
                Some(byte) => length(text[..byte].chars().count()),
                None => Value::Integer(-1),
            }
        }
        "substring" => {
            expect_args(KIND, method, &["start", "end"], args)?;
            let len = text.chars().count();
            let start = insert_index(integer_arg(method, &args[0])?, len)?;
            let end = insert_index(integer_arg(method, &args[1])?, len)?;
            if start > end {
                return Err(RuntimeError::type_error(format!(
                    "substring start {start} is after end {end}"
                )));
            }
            Value::string(text.chars().skip(start).take(end - start).collect::<String>())
        }
        "toUpperCase" => {
            expect_args(KIND, method, &[], args)?;
            Value::string(text.to_uppercase())
        }
        "toLowerCase" => {
            expect_args(KIND, method, &[], args)?;
            Value::string(text.to_lowercase())
        }
        "copy" => {
            expect_args(KIND, method, &[], args)?;
            Value::string(text)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::error::ErrorKind;
    use crate::interp::value::ArrayValue;
    use std::collections::BTreeMap;

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().map(|n| Value::Integer(*n)).collect())
    }

    fn call(receiver: &Value, method: &str, args: &[Value]) -> Value {
        receiver.call_method(method, args).unwrap()
    }

    #[test]
    fn test_list_methods() {
        let xs = ints(&[1, 2]);
        call(&xs, "append", &[Value::Integer(3)]);
        assert_eq!(call(&xs, "size", &[]), Value::Integer(3));
        assert_eq!(call(&xs, "pop", &[]), Value::Integer(3));
        assert_eq!(call(&xs, "shift", &[]), Value::Integer(1));
        call(&xs, "insert", &[Value::Integer(0), Value::Integer(7)]);
        assert_eq!(xs, ints(&[7, 2]));
        assert_eq!(call(&xs, "indexOf", &[Value::Integer(2)]), Value::Integer(1));
        assert_eq!(call(&xs, "indexOf", &[Value::Integer(9)]), Value::Integer(-1));
        assert_eq!(call(&xs, "contains", &[Value::Double(7.0)]), Value::Boolean(true));
        assert_eq!(call(&xs, "remove", &[Value::Integer(0)]), Value::Integer(7));
        assert_eq!(xs, ints(&[2]));
    }

    #[test]
    fn test_append_returns_the_same_list() {
        let xs = ints(&[]);
        let same = call(&xs, "append", &[Value::Integer(1)]);
        call(&same, "append", &[Value::Integer(2)]);
        assert_eq!(xs, ints(&[1, 2]));
    }

    #[test]
    fn test_copy_is_shallow_and_detached() {
        let xs = ints(&[1]);
        let copy = call(&xs, "copy", &[]);
        call(&copy, "append", &[Value::Integer(2)]);
        assert_eq!(xs, ints(&[1]));
        assert_eq!(copy, ints(&[1, 2]));
    }

    #[test]
    fn test_pop_on_empty_list() {
        let err = ints(&[]).call_method("pop", &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexOutOfBounds);
    }

    #[test]
    fn test_array_capacity_methods() {
        let arr = Value::array(ArrayValue::with_capacity(1));
        call(&arr, "push", &[Value::Integer(1)]);
        let err = arr.call_method("push", &[Value::Integer(2)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CapacityExceeded);
        call(&arr, "resize", &[Value::Integer(2)]);
        call(&arr, "insert", &[Value::Integer(0), Value::Integer(0)]);
        assert_eq!(call(&arr, "capacity", &[]), Value::Integer(2));
        assert_eq!(call(&arr, "size", &[]), Value::Integer(2));
        assert!(arr.call_method("resize", &[Value::Integer(1)]).is_err());
        assert!(arr.call_method("resize", &[Value::Integer(-1)]).is_err());
    }

    #[test]
    fn test_object_methods() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::Integer(2));
        map.insert("a".to_string(), Value::Integer(1));
        let obj = Value::object(map);
        assert_eq!(
            call(&obj, "keys", &[]),
            Value::list(vec![Value::string("a"), Value::string("b")])
        );
        assert_eq!(call(&obj, "has", &[Value::string("a")]), Value::Boolean(true));
        assert_eq!(call(&obj, "remove", &[Value::string("a")]), Value::Integer(1));
        assert_eq!(call(&obj, "size", &[]), Value::Integer(1));
        assert!(obj.call_method("remove", &[Value::string("zz")]).is_err());
    }

    #[test]
    fn test_string_methods() {
        let s = Value::string("Hello");
        assert_eq!(call(&s, "length", &[]), Value::Integer(5));
        assert_eq!(call(&s, "indexOf", &[Value::string("l")]), Value::Integer(2));
        assert_eq!(
            call(&s, "substring", &[Value::Integer(1), Value::Integer(3)]),
            Value::string("el")
        );
        assert_eq!(call(&s, "toUpperCase", &[]), Value::string("HELLO"));
        assert!(s.call_method("substring", &[Value::Integer(3), Value::Integer(1)]).is_err());
    }

    #[test]
    fn test_common_methods() {
        assert_eq!(call(&Value::Integer(3), "getClass", &[]), Value::string("Integer"));
        assert_eq!(call(&ints(&[1, 2]), "toString", &[]), Value::string("[1, 2]"));
        assert_eq!(call(&Value::Null, "getClass", &[]), Value::string("Null"));
    }

    #[test]
    fn test_unknown_method_names_kind() {
        let err = Value::Boolean(true).call_method("size", &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownMethod);
        assert_eq!(err.message, "Boolean has no method 'size'");
        let err = ints(&[]).call_method("frobnicate", &[]).unwrap_err();
        assert_eq!(err.message, "List has no method 'frobnicate'");
    }

    #[test]
    fn test_method_arity_checked() {
        let err = ints(&[]).call_method("append", &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        assert_eq!(err.message, "List.append(value) expects 1 argument(s), got 0");
    }
}
