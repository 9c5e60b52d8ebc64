//! Runtime values for the interpreter
//!
//! `Value` is a closed tagged union. Scalars are copied; List, Array and
//! Object are shared (`Rc<RefCell<..>>`) so method calls and indexed
//! assignment mutate the value every alias sees.

use super::error::{InterpResult, RuntimeError};
use super::function::FunctionDefinition;
use super::numeric::{self, Arith};
use crate::syntax::BinaryOp;
use std::any::Any;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Shared growable list
pub type ListRef = Rc<RefCell<Vec<Value>>>;
/// Shared fixed-capacity array
pub type ArrayRef = Rc<RefCell<ArrayValue>>;
/// Shared string-keyed object
pub type ObjectRef = Rc<RefCell<BTreeMap<String, Value>>>;

/// Nested values deeper than this are elided when formatting
const MAX_FORMAT_DEPTH: usize = 32;
/// Collection nesting followed by equality before giving up
const MAX_COMPARE_DEPTH: usize = 256;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// Uninitialised variable / no-value marker
    Null,
    Integer(i64),
    Long(i64),
    /// Rational number backed by a double
    Rational(f64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(Rc<str>),
    List(ListRef),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(FunctionValue),
    /// Opaque host object handed back by a native function
    Native(NativeHandle),
}

/// Kind tag of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Integer,
    Long,
    Rational,
    Float,
    Double,
    Boolean,
    String,
    List,
    Array,
    Object,
    Function,
    Native,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "Null",
            ValueKind::Integer => "Integer",
            ValueKind::Long => "Long",
            ValueKind::Rational => "Rational",
            ValueKind::Float => "Float",
            ValueKind::Double => "Double",
            ValueKind::Boolean => "Boolean",
            ValueKind::String => "String",
            ValueKind::List => "List",
            ValueKind::Array => "Array",
            ValueKind::Object => "Object",
            ValueKind::Function => "Function",
            ValueKind::Native => "NativeHandle",
        }
    }

    pub fn is_numeric(self) -> bool {
        numeric::rank(self).is_some()
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Items plus an explicit capacity; appending past the capacity fails
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub items: Vec<Value>,
    pub capacity: usize,
}

impl ArrayValue {
    pub fn with_capacity(capacity: usize) -> Self {
        ArrayValue {
            items: Vec::new(),
            capacity,
        }
    }

    /// Array holding `items`, exactly full
    pub fn from_items(items: Vec<Value>) -> Self {
        let capacity = items.len();
        ArrayValue { items, capacity }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn push(&mut self, value: Value) -> InterpResult<()> {
        if self.is_full() {
            return Err(RuntimeError::capacity_exceeded(self.capacity));
        }
        self.items.push(value);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, value: Value) -> InterpResult<()> {
        if self.is_full() {
            return Err(RuntimeError::capacity_exceeded(self.capacity));
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Change the capacity; it may not drop below the current size
    pub fn resize(&mut self, capacity: usize) -> InterpResult<()> {
        if capacity < self.items.len() {
            return Err(RuntimeError::type_error(format!(
                "cannot resize array of size {} to capacity {capacity}",
                self.items.len()
            )));
        }
        self.capacity = capacity;
        Ok(())
    }
}

/// A function used as a value
#[derive(Clone)]
pub struct FunctionValue {
    pub definition: Rc<FunctionDefinition>,
    /// Display level the value was created at
    pub captured_at: usize,
}

impl FunctionValue {
    pub fn new(definition: Rc<FunctionDefinition>, captured_at: usize) -> Self {
        FunctionValue {
            definition,
            captured_at,
        }
    }

    /// Named functions compare by name, anonymous ones by definition identity
    pub fn same_function(&self, other: &FunctionValue) -> bool {
        match (&self.definition.name, &other.definition.name) {
            (Some(a), Some(b)) => a == b,
            _ => Rc::ptr_eq(&self.definition, &other.definition),
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("signature", &self.definition.signature())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

/// Opaque reference to a host-side object
#[derive(Clone)]
pub struct NativeHandle {
    inner: Rc<dyn Any>,
    type_name: &'static str,
}

impl NativeHandle {
    pub fn new<T: Any>(object: T) -> Self {
        NativeHandle {
            inner: Rc::new(object),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wrap an already type-erased object
    pub fn from_box(object: Box<dyn Any>) -> Self {
        NativeHandle {
            inner: Rc::from(object),
            type_name: "host object",
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn ptr_eq(&self, other: &NativeHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({})", self.type_name)
    }
}

impl Value {
    pub fn string(text: impl Into<Rc<str>>) -> Value {
        Value::String(text.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn array(array: ArrayValue) -> Value {
        Value::Array(Rc::new(RefCell::new(array)))
    }

    pub fn object(entries: BTreeMap<String, Value>) -> Value {
        Value::Object(Rc::new(RefCell::new(entries)))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Integer(_) => ValueKind::Integer,
            Value::Long(_) => ValueKind::Long,
            Value::Rational(_) => ValueKind::Rational,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::String(_) => ValueKind::String,
            Value::List(_) => ValueKind::List,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Function(_) => ValueKind::Function,
            Value::Native(_) => ValueKind::Native,
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The payload of an `Integer`
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Kind and formatted value, e.g. `String "abc"`, for diagnostics
    pub fn describe(&self) -> String {
        format!("{} {}", self.type_name(), self.repr())
    }

    /// Display form with strings quoted
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) => format!("{:?}", &**s),
            other => other.to_string(),
        }
    }

    // ==================================================================
    // Arithmetic
    // ==================================================================

    /// Numeric addition, or concatenation when the receiver is a String
    pub fn add(&self, other: &Value) -> InterpResult<Value> {
        if let Value::String(s) = self {
            let mut joined = String::with_capacity(s.len());
            joined.push_str(s);
            match other {
                Value::String(t) => joined.push_str(t),
                v => joined.push_str(&v.to_string()),
            }
            return Ok(Value::string(joined));
        }
        numeric::arithmetic(Arith::Add, self, other)
    }

    pub fn subtract(&self, other: &Value) -> InterpResult<Value> {
        numeric::arithmetic(Arith::Subtract, self, other)
    }

    pub fn multiply(&self, other: &Value) -> InterpResult<Value> {
        numeric::arithmetic(Arith::Multiply, self, other)
    }

    pub fn divide(&self, other: &Value) -> InterpResult<Value> {
        numeric::arithmetic(Arith::Divide, self, other)
    }

    pub fn modulo(&self, other: &Value) -> InterpResult<Value> {
        numeric::arithmetic(Arith::Modulo, self, other)
    }

    pub fn negate(&self) -> InterpResult<Value> {
        numeric::negate(self)
    }

    // ==================================================================
    // Logic
    // ==================================================================

    pub fn and(&self, other: &Value) -> InterpResult<Value> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a && *b)),
            _ => Err(unsupported("and", self, other)),
        }
    }

    pub fn or(&self, other: &Value) -> InterpResult<Value> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a || *b)),
            _ => Err(unsupported("or", self, other)),
        }
    }

    pub fn not(&self) -> InterpResult<Value> {
        match self {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            _ => Err(RuntimeError::type_error(format!(
                "cannot apply 'not' to {}",
                self.describe()
            ))),
        }
    }

    // ==================================================================
    // Comparison
    // ==================================================================

    /// Language-level equality. Cross-kind pairs (other than numeric
    /// promotion) are incomparable and fail.
    pub fn equals(&self, other: &Value) -> InterpResult<bool> {
        if self.is_numeric() && other.is_numeric() {
            return Ok(numeric::compare(self, other) == Some(Ordering::Equal));
        }
        match (self, other) {
            (Value::Null, Value::Null) => Ok(true),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
            (Value::String(a), Value::String(b)) => Ok(a == b),
            (Value::List(_), Value::List(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_)) => structural_eq(self, other, 0),
            (Value::Function(a), Value::Function(b)) => Ok(a.same_function(b)),
            (Value::Native(a), Value::Native(b)) => Ok(a.ptr_eq(b)),
            _ => Err(incomparable(self, other)),
        }
    }

    /// Ordering for numerics, Booleans and Strings. Collections, functions
    /// and handles only support equality.
    pub fn compare(&self, other: &Value) -> InterpResult<Ordering> {
        if self.is_numeric() && other.is_numeric() {
            return numeric::compare(self, other).ok_or_else(|| incomparable(self, other));
        }
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            _ => Err(incomparable(self, other)),
        }
    }

    /// Apply a binary operator from the parse tree
    pub fn apply(&self, op: BinaryOp, other: &Value) -> InterpResult<Value> {
        match op {
            BinaryOp::Add => self.add(other),
            BinaryOp::Subtract => self.subtract(other),
            BinaryOp::Multiply => self.multiply(other),
            BinaryOp::Divide => self.divide(other),
            BinaryOp::Modulo => self.modulo(other),
            BinaryOp::Equal => self.equals(other).map(Value::Boolean),
            BinaryOp::NotEqual => self.equals(other).map(|eq| Value::Boolean(!eq)),
            BinaryOp::Less => self.compare(other).map(|o| Value::Boolean(o.is_lt())),
            BinaryOp::LessEqual => self.compare(other).map(|o| Value::Boolean(o.is_le())),
            BinaryOp::Greater => self.compare(other).map(|o| Value::Boolean(o.is_gt())),
            BinaryOp::GreaterEqual => self.compare(other).map(|o| Value::Boolean(o.is_ge())),
            BinaryOp::And => self.and(other),
            BinaryOp::Or => self.or(other),
        }
    }

    // ==================================================================
    // Formatting
    // ==================================================================

    /// Kind-tagged debug dump, e.g. `List[Integer(1), String("a")]`
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        use std::fmt::Write as _;
        if depth > MAX_FORMAT_DEPTH {
            out.push_str("...");
            return;
        }
        let dump_items = |out: &mut String, items: &[Value]| {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                item.dump_into(out, depth + 1);
            }
            out.push(']');
        };
        match self {
            Value::Null => out.push_str("Null"),
            Value::String(s) => {
                let _ = write!(out, "String({:?})", &**s);
            }
            Value::List(items) => {
                out.push_str("List");
                dump_items(out, &items.borrow());
            }
            Value::Array(array) => {
                let array = array.borrow();
                let _ = write!(out, "Array({}/{})", array.items.len(), array.capacity);
                dump_items(out, &array.items);
            }
            Value::Object(entries) => {
                out.push_str("Object{");
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{key}: ");
                    value.dump_into(out, depth + 1);
                }
                out.push('}');
            }
            Value::Function(func) => {
                let _ = write!(
                    out,
                    "Function({} @ level {})",
                    func.definition.signature(),
                    func.captured_at
                );
            }
            Value::Native(handle) => {
                let _ = write!(out, "NativeHandle({})", handle.type_name());
            }
            scalar => {
                let _ = write!(out, "{}({})", scalar.type_name(), scalar);
            }
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        if depth > MAX_FORMAT_DEPTH {
            return f.write_str("...");
        }
        let fmt_items = |f: &mut fmt::Formatter<'_>, items: &[Value]| -> fmt::Result {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                item.fmt_element(f, depth + 1)?;
            }
            f.write_str("]")
        };
        match self {
            Value::Null => f.write_str("null"),
            Value::Integer(n) | Value::Long(n) => write!(f, "{n}"),
            Value::Rational(x) | Value::Double(x) => write!(f, "{x}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => fmt_items(f, &items.borrow()),
            Value::Array(array) => fmt_items(f, &array.borrow().items),
            Value::Object(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: ")?;
                    value.fmt_element(f, depth + 1)?;
                }
                f.write_str("}")
            }
            Value::Function(func) => write!(f, "function {}", func.definition.signature()),
            Value::Native(handle) => write!(f, "<native {}>", handle.type_name()),
        }
    }

    /// Elements inside collections quote their strings
    fn fmt_element(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", &**s),
            other => other.fmt_nested(f, depth),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, 0)
    }
}

/// Strict structural equality: same kind and same contents. Used by tests;
/// never fails, and collections nested past the compare limit are unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        strict_eq(self, other, 0)
    }
}

fn strict_eq(a: &Value, b: &Value, depth: usize) -> bool {
    let items = |x: &[Value], y: &[Value]| {
        depth < MAX_COMPARE_DEPTH
            && x.len() == y.len()
            && x.iter().zip(y).all(|(x, y)| strict_eq(x, y, depth + 1))
    };
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Integer(a), Value::Integer(b)) | (Value::Long(a), Value::Long(b)) => a == b,
        (Value::Rational(a), Value::Rational(b)) | (Value::Double(a), Value::Double(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::List(x), Value::List(y)) => Rc::ptr_eq(x, y) || items(&x.borrow(), &y.borrow()),
        (Value::Array(x), Value::Array(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.capacity == y.capacity && items(&x.items, &y.items)
        }
        (Value::Object(x), Value::Object(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            depth < MAX_COMPARE_DEPTH
                && x.len() == y.len()
                && x.iter().all(|(key, value)| {
                    y.get(key).is_some_and(|other| strict_eq(value, other, depth + 1))
                })
        }
        (Value::Function(a), Value::Function(b)) => a.same_function(b),
        (Value::Native(a), Value::Native(b)) => a.ptr_eq(b),
        _ => false,
    }
}

/// Collection equality: elements are compared with numeric promotion,
/// everything else by kind and content. Distinct cyclic collections hit
/// the depth limit and fail instead of recursing forever.
fn structural_eq(a: &Value, b: &Value, depth: usize) -> InterpResult<bool> {
    if depth >= MAX_COMPARE_DEPTH {
        return Err(RuntimeError::type_error(format!(
            "cannot compare collections nested deeper than {MAX_COMPARE_DEPTH} levels"
        )));
    }
    match (a, b) {
        (Value::List(x), Value::List(y)) => {
            if Rc::ptr_eq(x, y) {
                return Ok(true);
            }
            items_eq(&x.borrow(), &y.borrow(), depth)
        }
        (Value::Array(x), Value::Array(y)) => {
            if Rc::ptr_eq(x, y) {
                return Ok(true);
            }
            items_eq(&x.borrow().items, &y.borrow().items, depth)
        }
        (Value::Object(x), Value::Object(y)) => {
            if Rc::ptr_eq(x, y) {
                return Ok(true);
            }
            let (x, y) = (x.borrow(), y.borrow());
            if x.len() != y.len() {
                return Ok(false);
            }
            for (key, value) in x.iter() {
                match y.get(key) {
                    Some(other) if structural_eq(value, other, depth + 1)? => {}
                    _ => return Ok(false),
                }
            }
            Ok(true)
        }
        (Value::List(_) | Value::Array(_) | Value::Object(_), _)
        | (_, Value::List(_) | Value::Array(_) | Value::Object(_)) => Ok(false),
        _ => Ok(a.equals(b).unwrap_or(false)),
    }
}

fn items_eq(a: &[Value], b: &[Value], depth: usize) -> InterpResult<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if !structural_eq(x, y, depth + 1)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub(crate) fn unsupported(op: &str, a: &Value, b: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "cannot apply '{op}' to {} and {}",
        a.describe(),
        b.describe()
    ))
}

fn incomparable(a: &Value, b: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "cannot compare {} with {}",
        a.describe(),
        b.describe()
    ))
}
