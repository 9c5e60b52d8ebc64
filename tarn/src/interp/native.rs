//! Native bridge: host functions callable from programs
//!
//! Natives are registered by name in a [`NativeRegistry`]; there is no
//! reflective lookup of host types. Each native receives a
//! [`NativeContext`] with the output sink and program inputs.

use super::error::{InterpResult, RuntimeError};
use super::value::{NativeHandle, Value};
use rand::Rng;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Native function type
pub type NativeFn = fn(&mut NativeContext<'_>, &[Value]) -> InterpResult<Value>;

/// Host-side state a native may touch
pub struct NativeContext<'a> {
    pub out: &'a mut dyn Write,
    pub args: &'a [String],
    pub flags: &'a BTreeMap<String, String>,
}

/// Name -> native function table
#[derive(Clone, Default)]
pub struct NativeRegistry {
    functions: HashMap<String, NativeFn>,
}

impl NativeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in natives
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("write", builtin_write);
        registry.register("writeln", builtin_writeln);
        registry.register("dump", builtin_dump);
        registry.register("argv", builtin_argv);
        registry.register("flag", builtin_flag);
        registry.register("random", builtin_random);
        registry.register("readFile", builtin_read_file);
        registry.register("writeFile", builtin_write_file);
        registry.register("fileExists", builtin_file_exists);
        registry.register("time", builtin_time);
        registry
    }

    /// Add or replace a native
    pub fn register(&mut self, name: &str, function: NativeFn) {
        self.functions.insert(name.to_string(), function);
    }

    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

/// Convert a host object into a Value. Primitive and string types map to
/// their Value counterparts; anything else is wrapped in a handle.
pub fn value_of_native(object: Box<dyn Any>) -> Value {
    if let Some(b) = object.downcast_ref::<bool>() {
        return Value::Boolean(*b);
    }
    if let Some(n) = object.downcast_ref::<i16>() {
        return Value::Integer(i64::from(*n));
    }
    if let Some(n) = object.downcast_ref::<i32>() {
        return Value::Integer(i64::from(*n));
    }
    if let Some(n) = object.downcast_ref::<i64>() {
        return Value::Long(*n);
    }
    if let Some(x) = object.downcast_ref::<f32>() {
        return Value::Float(*x);
    }
    if let Some(x) = object.downcast_ref::<f64>() {
        return Value::Double(*x);
    }
    if let Some(s) = object.downcast_ref::<String>() {
        return Value::string(s.as_str());
    }
    if let Some(s) = object.downcast_ref::<&'static str>() {
        return Value::string(*s);
    }
    Value::Native(NativeHandle::from_box(object))
}

// ============================================================================
// Built-ins
// ============================================================================

fn check_arity(name: &str, expected: usize, args: &[Value]) -> InterpResult<()> {
    if args.len() != expected {
        return Err(RuntimeError::arity_mismatch(name, expected, args.len()));
    }
    Ok(())
}

fn string_arg<'a>(name: &str, value: &'a Value) -> InterpResult<&'a str> {
    value.as_str().ok_or_else(|| {
        RuntimeError::type_error(format!("{name} expects a String, got {}", value.describe()))
    })
}

/// Log a host failure and turn it into a runtime error
fn host_failure(function: &str, error: impl std::fmt::Display) -> RuntimeError {
    tracing::warn!(native = function, %error, "host call failed");
    RuntimeError::native(function, error)
}

fn emit(ctx: &mut NativeContext<'_>, name: &str, args: &[Value], newline: bool) -> InterpResult<Value> {
    let mut text = String::new();
    for arg in args {
        text.push_str(&arg.to_string());
    }
    if newline {
        text.push('\n');
    }
    ctx.out
        .write_all(text.as_bytes())
        .and_then(|()| ctx.out.flush())
        .map_err(|e| host_failure(name, e))?;
    Ok(Value::Null)
}

/// write(v...) - display forms, no newline
fn builtin_write(ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    emit(ctx, "write", args, false)
}

/// writeln(v...) - display forms and a newline
fn builtin_writeln(ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    emit(ctx, "writeln", args, true)
}

/// dump(v) - kind-tagged debug form
fn builtin_dump(ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    check_arity("dump(value)", 1, args)?;
    writeln!(ctx.out, "{}", args[0].dump()).map_err(|e| host_failure("dump", e))?;
    Ok(Value::Null)
}

/// argv() - program arguments as a List of Strings
fn builtin_argv(ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    check_arity("argv()", 0, args)?;
    Ok(Value::list(
        ctx.args.iter().map(|a| Value::string(a.as_str())).collect(),
    ))
}

/// flag(name) - value of a program flag, or null
fn builtin_flag(ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    check_arity("flag(name)", 1, args)?;
    let name = string_arg("flag", &args[0])?;
    Ok(ctx
        .flags
        .get(name)
        .map_or(Value::Null, |v| Value::string(v.as_str())))
}

/// random() - Double in [0, 1); random(n) - Integer in [0, n)
fn builtin_random(_ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    let mut rng = rand::rng();
    match args {
        [] => Ok(Value::Double(rng.random::<f64>())),
        [Value::Integer(n)] if *n > 0 => Ok(Value::Integer(rng.random_range(0..*n))),
        [other] => Err(RuntimeError::type_error(format!(
            "random expects a positive Integer bound, got {}",
            other.describe()
        ))),
        _ => Err(RuntimeError::arity_mismatch("random(bound)", 1, args.len())),
    }
}

/// readFile(path) - whole file as a String
fn builtin_read_file(_ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    check_arity("readFile(path)", 1, args)?;
    let path = string_arg("readFile", &args[0])?;
    fs::read_to_string(path)
        .map(Value::string)
        .map_err(|e| host_failure("readFile", format!("'{path}': {e}")))
}

/// writeFile(path, text) - replace the file's contents
fn builtin_write_file(_ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    check_arity("writeFile(path, text)", 2, args)?;
    let path = string_arg("writeFile", &args[0])?;
    fs::write(path, args[1].to_string())
        .map_err(|e| host_failure("writeFile", format!("'{path}': {e}")))?;
    Ok(Value::Null)
}

/// fileExists(path) - Boolean
fn builtin_file_exists(_ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    check_arity("fileExists(path)", 1, args)?;
    let path = string_arg("fileExists", &args[0])?;
    Ok(Value::Boolean(Path::new(path).exists()))
}

/// time() - milliseconds since the Unix epoch as a Long
fn builtin_time(_ctx: &mut NativeContext<'_>, args: &[Value]) -> InterpResult<Value> {
    check_arity("time()", 0, args)?;
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| host_failure("time", e))?;
    Ok(Value::Long(i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::error::ErrorKind;

    struct Harness {
        out: Vec<u8>,
        args: Vec<String>,
        flags: BTreeMap<String, String>,
    }

    impl Harness {
        fn new() -> Self {
            Harness {
                out: Vec::new(),
                args: vec!["one".to_string(), "two".to_string()],
                flags: BTreeMap::from([("mode".to_string(), "fast".to_string())]),
            }
        }

        fn call(&mut self, name: &str, args: &[Value]) -> InterpResult<Value> {
            let function = NativeRegistry::with_builtins().get(name).unwrap();
            let mut ctx = NativeContext {
                out: &mut self.out,
                args: &self.args,
                flags: &self.flags,
            };
            function(&mut ctx, args)
        }

        fn output(&self) -> String {
            String::from_utf8(self.out.clone()).unwrap()
        }
    }

    #[test]
    fn test_write_and_writeln() {
        let mut h = Harness::new();
        h.call("write", &[Value::Integer(3), Value::string("x")]).unwrap();
        h.call("writeln", &[Value::Boolean(true)]).unwrap();
        h.call("writeln", &[]).unwrap();
        assert_eq!(h.output(), "3xtrue\n\n");
    }

    #[test]
    fn test_dump() {
        let mut h = Harness::new();
        h.call("dump", &[Value::list(vec![Value::Double(0.5)])]).unwrap();
        assert_eq!(h.output(), "List[Double(0.5)]\n");
    }

    #[test]
    fn test_argv_and_flag() {
        let mut h = Harness::new();
        assert_eq!(
            h.call("argv", &[]).unwrap(),
            Value::list(vec![Value::string("one"), Value::string("two")])
        );
        assert_eq!(h.call("flag", &[Value::string("mode")]).unwrap(), Value::string("fast"));
        assert_eq!(h.call("flag", &[Value::string("nope")]).unwrap(), Value::Null);
        assert!(h.call("flag", &[Value::Integer(1)]).is_err());
    }

    #[test]
    fn test_random_ranges() {
        let mut h = Harness::new();
        for _ in 0..50 {
            match h.call("random", &[]).unwrap() {
                Value::Double(x) => assert!((0.0..1.0).contains(&x)),
                other => panic!("unexpected {other:?}"),
            }
            match h.call("random", &[Value::Integer(3)]).unwrap() {
                Value::Integer(n) => assert!((0..3).contains(&n)),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(h.call("random", &[Value::Integer(0)]).is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let path = Value::string(path.to_string_lossy().as_ref());
        let mut h = Harness::new();
        assert_eq!(h.call("fileExists", &[path.clone()]).unwrap(), Value::Boolean(false));
        h.call("writeFile", &[path.clone(), Value::Integer(42)]).unwrap();
        assert_eq!(h.call("fileExists", &[path.clone()]).unwrap(), Value::Boolean(true));
        assert_eq!(h.call("readFile", &[path]).unwrap(), Value::string("42"));
    }

    #[test]
    fn test_missing_file_is_a_native_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let mut h = Harness::new();
        let err = h
            .call("readFile", &[Value::string(path.to_string_lossy().as_ref())])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Native);
        assert!(err.message.starts_with("readFile: "));
    }

    #[test]
    fn test_time_is_a_long() {
        let mut h = Harness::new();
        assert!(matches!(h.call("time", &[]).unwrap(), Value::Long(ms) if ms > 0));
    }

    #[test]
    fn test_value_of_native() {
        assert_eq!(value_of_native(Box::new(true)), Value::Boolean(true));
        assert_eq!(value_of_native(Box::new(7i16)), Value::Integer(7));
        assert_eq!(value_of_native(Box::new(7i32)), Value::Integer(7));
        assert_eq!(value_of_native(Box::new(7i64)), Value::Long(7));
        assert_eq!(value_of_native(Box::new(1.5f32)), Value::Float(1.5));
        assert_eq!(value_of_native(Box::new(1.5f64)), Value::Double(1.5));
        assert_eq!(value_of_native(Box::new(String::from("s"))), Value::string("s"));
        assert_eq!(value_of_native(Box::new("s")), Value::string("s"));

        struct Socket;
        match value_of_native(Box::new(Socket)) {
            Value::Native(handle) => assert!(handle.downcast_ref::<Socket>().is_some()),
            other => panic!("expected a handle, got {other:?}"),
        }
    }

    #[test]
    fn test_registry_names() {
        let mut registry = NativeRegistry::new();
        assert!(!registry.contains("write"));
        registry.register("zeta", builtin_time);
        registry.register("alpha", builtin_time);
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }
}
