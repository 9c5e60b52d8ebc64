//! Tree evaluator

use super::cache::{Cached, NodeCache};
use super::deref::Subscript;
use super::error::{InterpResult, RuntimeError};
use super::function::{FunctionDefinition, FunctionInvocation, Name};
use super::native::{NativeContext, NativeFn, NativeRegistry};
use super::numeric;
use super::scope::{Evaluate, Reference, ScopeDisplay};
use super::value::{ArrayValue, FunctionValue, Value};
use crate::config::Config;
use crate::syntax::{BinaryOp, NodeId, NodeKind, ParseTree};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::rc::Rc;

/// Name the program frame reports in logs and diagnostics
const PROGRAM_NAME: &str = "<program>";

/// What a call resolves to
enum Callee {
    Function(Rc<FunctionDefinition>),
    Native(NativeFn),
}

/// The interpreter
pub struct Interpreter {
    tree: Rc<ParseTree>,
    cache: NodeCache,
    natives: NativeRegistry,
    /// Sink for `write` and friends
    out: Box<dyn Write>,
    config: Config,
    /// Program arguments for `argv()`
    args: Vec<String>,
}

impl Interpreter {
    /// Interpreter over `tree` with the default config, writing to stdout
    pub fn new(tree: ParseTree) -> Self {
        Self::with_config(tree, Config::default())
    }

    pub fn with_config(tree: ParseTree, config: Config) -> Self {
        Interpreter {
            cache: NodeCache::new(tree.len()),
            tree: Rc::new(tree),
            natives: NativeRegistry::with_builtins(),
            out: Box::new(io::stdout()),
            config,
            args: Vec::new(),
        }
    }

    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Add or replace a native function
    pub fn register_native(&mut self, name: &str, function: NativeFn) {
        self.natives.register(name, function);
    }

    /// Run the program in a fresh frame at depth 0 of `display`
    pub fn run(&mut self, display: &mut ScopeDisplay) -> InterpResult<Value> {
        let program = Rc::new(FunctionDefinition::new(
            Some(Name::from(PROGRAM_NAME)),
            Vec::new(),
            0,
            self.tree.root(),
            None,
        ));
        let result = display.execute(FunctionInvocation::new(program), self);
        let flushed = self
            .out
            .flush()
            .map_err(|e| RuntimeError::native("output", e));
        let value = result?;
        flushed?;
        Ok(value)
    }

    /// Run with a display sized from the config
    pub fn run_program(&mut self) -> InterpResult<Value> {
        let mut display = ScopeDisplay::from_config(&self.config);
        self.run(&mut display)
    }

    /// Evaluate a node with automatic stack growth for deep recursion
    fn eval(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let (red_zone, grow_size) = (self.config.stack_red_zone, self.config.stack_grow_size);
        stacker::maybe_grow(red_zone, grow_size, || self.eval_inner(env, id))
            .map_err(|e| e.at(self.tree.span(id)))
    }

    fn eval_inner(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let kind = tree.kind(id);
        tracing::trace!(node = %id, %kind, level = env.current_level(), "eval");

        match kind {
            NodeKind::Program => {
                for &statement in tree.children(id) {
                    self.eval(env, statement)?;
                }
                Ok(Value::Null)
            }
            NodeKind::Block => self.eval_block(env, id),
            NodeKind::Empty => Ok(Value::Null),

            NodeKind::LetDefinition => self.eval_definition(env, id, false),
            NodeKind::ConstDefinition => self.eval_definition(env, id, true),
            NodeKind::Declaration => {
                env.define_variable(token(&tree, id)?)?;
                Ok(Value::Null)
            }
            NodeKind::ArrayDeclaration => self.eval_array_declaration(env, id),
            NodeKind::ConstDeclaration => {
                Err(RuntimeError::uninitialized_constant(token(&tree, id)?))
            }

            NodeKind::Assign
            | NodeKind::AddAssign
            | NodeKind::SubtractAssign
            | NodeKind::MultiplyAssign
            | NodeKind::DivideAssign => self.eval_assign(env, id),

            NodeKind::If => self.eval_if(env, id),
            NodeKind::For => self.eval_for(env, id),
            NodeKind::While => self.eval_while(env, id),

            NodeKind::FunctionDefinition => {
                let definition = self.function_definition(env, id)?;
                env.define_function(definition)?;
                Ok(Value::Null)
            }
            NodeKind::AnonymousFunction => {
                let definition = self.function_definition(env, id)?;
                Ok(Value::Function(FunctionValue::new(definition, env.current_level())))
            }
            NodeKind::Call => self.eval_call(env, id, false),
            NodeKind::Invocation => self.eval_call(env, id, true),
            NodeKind::MethodCall => self.eval_method_call(env, id),

            NodeKind::PreIncrement => self.eval_step(env, id, BinaryOp::Add, true),
            NodeKind::PreDecrement => self.eval_step(env, id, BinaryOp::Subtract, true),
            NodeKind::PostIncrement => self.eval_step(env, id, BinaryOp::Add, false),
            NodeKind::PostDecrement => self.eval_step(env, id, BinaryOp::Subtract, false),

            NodeKind::Identifier => self.eval_identifier(env, id),
            NodeKind::NumberLiteral | NodeKind::StringLiteral | NodeKind::BooleanLiteral => {
                self.eval_literal(id)
            }
            NodeKind::ListLiteral => {
                let items = self.eval_all(env, tree.children(id))?;
                Ok(Value::list(items))
            }
            NodeKind::ArrayLiteral => {
                let items = self.eval_all(env, tree.children(id))?;
                Ok(Value::array(ArrayValue::from_items(items)))
            }
            NodeKind::ObjectLiteral => self.eval_object(env, id),
            NodeKind::Dereference => self.eval_dereference(env, id),

            NodeKind::Not => self.eval(env, child(&tree, id, 0)?)?.not(),
            NodeKind::Negate => self.eval(env, child(&tree, id, 0)?)?.negate(),

            NodeKind::Parameters
            | NodeKind::Parameter
            | NodeKind::Entry
            | NodeKind::Index
            | NodeKind::Member => Err(RuntimeError::malformed(format!(
                "{kind} node {id} cannot be evaluated on its own"
            ))),

            operator => match operator.binary_op() {
                Some(op) => self.eval_binary(env, id, op),
                None => Err(RuntimeError::malformed(format!(
                    "{operator} node {id} is not an expression"
                ))),
            },
        }
    }

    fn eval_all(&mut self, env: &mut ScopeDisplay, nodes: &[NodeId]) -> InterpResult<Vec<Value>> {
        nodes.iter().map(|node| self.eval(env, *node)).collect()
    }

    // ==================================================================
    // Blocks and bindings
    // ==================================================================

    fn eval_block(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let statements = tree.children(id);
        for &statement in statements {
            self.eval(env, statement)?;
        }
        // newest first, so released slots can be reclaimed
        for &statement in statements.iter().rev() {
            remove_bindings(env, &tree, statement);
        }
        Ok(Value::Null)
    }

    fn eval_definition(&mut self, env: &mut ScopeDisplay, id: NodeId, constant: bool) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let name = token(&tree, id)?;
        let init = child(&tree, id, 0)?;
        let reference = if constant {
            env.define_constant(name)?
        } else {
            env.define_variable(name)?
        };
        let value = self.eval(env, init)?;
        env.write(reference, value)?;
        Ok(Value::Null)
    }

    fn eval_array_declaration(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let name = token(&tree, id)?;
        let capacity = match tree.child(id, 0) {
            Some(expr) => {
                let value = self.eval(env, expr)?;
                value
                    .as_integer()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| {
                        RuntimeError::type_error(format!(
                            "array capacity must be a non-negative Integer, got {}",
                            value.describe()
                        ))
                    })?
            }
            None => 0,
        };
        let reference = env.define_variable(name)?;
        env.write(reference, Value::array(ArrayValue::with_capacity(capacity)))?;
        Ok(Value::Null)
    }

    // ==================================================================
    // Assignment
    // ==================================================================

    fn eval_assign(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let op = tree.kind(id).assign_op().flatten();
        let target = child(&tree, id, 0)?;
        let value = self.eval(env, child(&tree, id, 1)?)?;

        match tree.kind(target) {
            NodeKind::Identifier => {
                let reference = assignable(env, token(&tree, target)?)?;
                let value = match op {
                    Some(op) => env.read(reference)?.apply(op, &value)?,
                    None => value,
                };
                env.write(reference, value)?;
            }
            NodeKind::Dereference => {
                let (parent, subscript) = self.resolve_parent(env, target)?;
                let value = match op {
                    Some(op) => parent.dereference(&subscript)?.apply(op, &value)?,
                    None => value,
                };
                parent.set(&subscript, value)?;
            }
            other => {
                return Err(RuntimeError::malformed(format!(
                    "cannot assign to a {other} node"
                )));
            }
        }
        Ok(Value::Null)
    }

    /// `++`/`--`: prefix forms yield the new value, postfix the old one
    fn eval_step(&mut self, env: &mut ScopeDisplay, id: NodeId, op: BinaryOp, prefix: bool) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let target = child(&tree, id, 0)?;
        let step = |old: &Value| -> InterpResult<Value> {
            if !old.is_numeric() {
                let verb = if op == BinaryOp::Add { "increment" } else { "decrement" };
                return Err(RuntimeError::type_error(format!("cannot {verb} {}", old.describe())));
            }
            old.apply(op, &Value::Integer(1))
        };

        let (old, new) = match tree.kind(target) {
            NodeKind::Identifier => {
                let reference = assignable(env, token(&tree, target)?)?;
                let old = env.read(reference)?;
                let new = step(&old)?;
                env.write(reference, new.clone())?;
                (old, new)
            }
            NodeKind::Dereference => {
                let (parent, subscript) = self.resolve_parent(env, target)?;
                let old = parent.dereference(&subscript)?;
                let new = step(&old)?;
                parent.set(&subscript, new.clone())?;
                (old, new)
            }
            other => {
                return Err(RuntimeError::malformed(format!(
                    "cannot increment or decrement a {other} node"
                )));
            }
        };
        Ok(if prefix { new } else { old })
    }

    // ==================================================================
    // Control flow
    // ==================================================================

    fn eval_if(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let condition = self.eval(env, child(&tree, id, 0)?)?;
        let branch = if truth(&condition, "if")? {
            Some(child(&tree, id, 1)?)
        } else {
            tree.child(id, 2)
        };
        if let Some(branch) = branch {
            self.eval(env, branch)?;
            remove_bindings(env, &tree, branch);
        }
        Ok(Value::Null)
    }

    fn eval_for(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let &[init, test, step, body] = tree.children(id) else {
            return Err(RuntimeError::malformed(format!("for node {id} needs four children")));
        };
        self.eval(env, init)?;
        loop {
            let condition = self.eval(env, test)?;
            if !truth(&condition, "for")? {
                break;
            }
            self.eval(env, body)?;
            remove_bindings(env, &tree, body);
            self.eval(env, step)?;
        }
        remove_bindings(env, &tree, init);
        Ok(Value::Null)
    }

    fn eval_while(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let test = child(&tree, id, 0)?;
        let body = child(&tree, id, 1)?;
        loop {
            let condition = self.eval(env, test)?;
            if !truth(&condition, "while")? {
                break;
            }
            self.eval(env, body)?;
            remove_bindings(env, &tree, body);
        }
        Ok(Value::Null)
    }

    // ==================================================================
    // Functions and calls
    // ==================================================================

    /// Build (once) the definition a function node describes
    fn function_definition(&mut self, env: &ScopeDisplay, id: NodeId) -> InterpResult<Rc<FunctionDefinition>> {
        if let Some(definition) = self.cache.function(id) {
            return Ok(definition);
        }
        let tree = Rc::clone(&self.tree);
        let name = match tree.kind(id) {
            NodeKind::FunctionDefinition => Some(Name::from(token(&tree, id)?)),
            _ => None,
        };
        let mut params: Vec<Name> = Vec::new();
        for &param in tree.children(child(&tree, id, 0)?) {
            let param = token(&tree, param)?;
            if params.iter().any(|p| &**p == param) {
                return Err(RuntimeError::redefinition("parameter", param));
            }
            params.push(Name::from(param));
        }
        let definition = Rc::new(FunctionDefinition::new(
            name,
            params,
            env.current_level() + 1,
            child(&tree, id, 1)?,
            tree.child(id, 2),
        ));
        self.cache.insert(id, Cached::Function(Rc::clone(&definition)));
        Ok(definition)
    }

    fn eval_call(&mut self, env: &mut ScopeDisplay, id: NodeId, needs_value: bool) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let children = tree.children(id);
        let (callee, args) = match tree.token(id) {
            Some(name) => (self.resolve_named(env, name)?, children),
            None => {
                let (&callee, args) = children.split_first().ok_or_else(|| {
                    RuntimeError::malformed(format!("call node {id} has no callee"))
                })?;
                (callable(self.eval(env, callee)?)?, args)
            }
        };

        match callee {
            Callee::Function(definition) => {
                if needs_value && definition.ret.is_none() {
                    return Err(RuntimeError::type_error(format!(
                        "{} has no return expression and cannot be used as a value",
                        definition.signature()
                    )));
                }
                if args.len() != definition.arity() {
                    return Err(RuntimeError::arity_mismatch(
                        &definition.signature(),
                        definition.arity(),
                        args.len(),
                    ));
                }
                let mut invocation = FunctionInvocation::new(definition);
                for &arg in args {
                    let value = self.eval(env, arg)?;
                    invocation.bind_argument(value)?;
                }
                invocation.check_arguments()?;
                env.execute(invocation, self)
            }
            Callee::Native(function) => {
                let values = self.eval_all(env, args)?;
                let mut ctx = NativeContext {
                    out: &mut *self.out,
                    args: &self.args,
                    flags: &self.config.flags,
                };
                function(&mut ctx, &values)
            }
        }
    }

    /// Function table, then a variable holding a function, then natives
    fn resolve_named(&self, env: &ScopeDisplay, name: &str) -> InterpResult<Callee> {
        if let Some(definition) = env.find_function(name) {
            return Ok(Callee::Function(definition));
        }
        if let Some(reference) = env.find_reference(name) {
            return callable(env.read(reference)?);
        }
        if let Some(function) = self.natives.get(name) {
            return Ok(Callee::Native(function));
        }
        Err(RuntimeError::undefined_function(name))
    }

    fn eval_method_call(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let method = token(&tree, id)?;
        let receiver = self.eval(env, child(&tree, id, 0)?)?;
        let args = self.eval_all(env, &tree.children(id)[1..])?;
        receiver.call_method(method, &args)
    }

    // ==================================================================
    // Expressions
    // ==================================================================

    fn eval_identifier(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let name = token(&self.tree, id)?;
        if let Some(reference) = env.find_reference(name) {
            return env.read(reference);
        }
        if let Some(definition) = env.find_function(name) {
            return Ok(Value::Function(FunctionValue::new(definition, env.current_level())));
        }
        Err(RuntimeError::undefined_variable(name))
    }

    fn eval_literal(&mut self, id: NodeId) -> InterpResult<Value> {
        if let Some(value) = self.cache.literal(id) {
            return Ok(value);
        }
        let text = token(&self.tree, id)?;
        let value = match self.tree.kind(id) {
            NodeKind::NumberLiteral => numeric::parse_number(text).ok_or_else(|| {
                RuntimeError::malformed(format!("invalid number literal {text:?}"))
            })?,
            NodeKind::BooleanLiteral => match text {
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                _ => {
                    return Err(RuntimeError::malformed(format!(
                        "invalid boolean literal {text:?}"
                    )));
                }
            },
            _ => Value::string(text),
        };
        self.cache.insert(id, Cached::Literal(value.clone()));
        Ok(value)
    }

    fn eval_object(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let mut entries = BTreeMap::new();
        for &entry in tree.children(id) {
            let key = token(&tree, entry)?;
            let value = self.eval(env, child(&tree, entry, 0)?)?;
            entries.insert(key.to_string(), value);
        }
        Ok(Value::object(entries))
    }

    fn eval_dereference(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let (&base, steps) = tree.children(id).split_first().ok_or_else(|| {
            RuntimeError::malformed(format!("dereference node {id} has no base"))
        })?;
        let mut current = self.eval(env, base)?;
        for &step in steps {
            let subscript = self.subscript(env, step)?;
            current = current
                .dereference(&subscript)
                .map_err(|e| e.at(tree.span(step)))?;
        }
        Ok(current)
    }

    /// Walk all but the last step; the caller reads or writes the last one
    fn resolve_parent(&mut self, env: &mut ScopeDisplay, id: NodeId) -> InterpResult<(Value, Subscript)> {
        let tree = Rc::clone(&self.tree);
        let [base, steps @ .., last] = tree.children(id) else {
            return Err(RuntimeError::malformed(format!(
                "dereference node {id} needs a base and at least one step"
            )));
        };
        let mut parent = self.eval(env, *base)?;
        for &step in steps {
            let subscript = self.subscript(env, step)?;
            parent = parent
                .dereference(&subscript)
                .map_err(|e| e.at(tree.span(step)))?;
        }
        let subscript = self.subscript(env, *last)?;
        Ok((parent, subscript))
    }

    fn subscript(&mut self, env: &mut ScopeDisplay, step: NodeId) -> InterpResult<Subscript> {
        let tree = Rc::clone(&self.tree);
        match tree.kind(step) {
            NodeKind::Index => Ok(Subscript::Index(self.eval(env, child(&tree, step, 0)?)?)),
            NodeKind::Member => Ok(Subscript::Member(Rc::from(token(&tree, step)?))),
            other => Err(RuntimeError::malformed(format!(
                "{other} node {step} is not a dereference step"
            ))),
        }
    }

    fn eval_binary(&mut self, env: &mut ScopeDisplay, id: NodeId, op: BinaryOp) -> InterpResult<Value> {
        let tree = Rc::clone(&self.tree);
        let left = self.eval(env, child(&tree, id, 0)?)?;
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            match (op, left.as_bool()) {
                (BinaryOp::And, Some(false)) => return Ok(Value::Boolean(false)),
                (BinaryOp::Or, Some(true)) => return Ok(Value::Boolean(true)),
                (_, Some(_)) => {}
                (_, None) => {
                    return Err(RuntimeError::type_error(format!(
                        "'{}' expects Boolean operands, got {}",
                        op.name(),
                        left.describe()
                    )));
                }
            }
        }
        let right = self.eval(env, child(&tree, id, 1)?)?;
        left.apply(op, &right)
    }
}

impl Evaluate for Interpreter {
    fn evaluate(&mut self, display: &mut ScopeDisplay, node: NodeId) -> InterpResult<Value> {
        self.eval(display, node)
    }

    /// A block body runs without teardown; the invocation is dropped on
    /// return anyway and the return expression still needs its locals.
    fn evaluate_body(&mut self, display: &mut ScopeDisplay, node: NodeId) -> InterpResult<Value> {
        if self.tree.kind(node) != NodeKind::Block {
            return self.eval(display, node);
        }
        let tree = Rc::clone(&self.tree);
        for &statement in tree.children(node) {
            self.eval(display, statement)?;
        }
        Ok(Value::Null)
    }
}

fn token(tree: &ParseTree, id: NodeId) -> InterpResult<&str> {
    tree.token(id).ok_or_else(|| {
        RuntimeError::malformed(format!("{} node {id} has no token", tree.kind(id)))
    })
}

fn child(tree: &ParseTree, id: NodeId, index: usize) -> InterpResult<NodeId> {
    tree.child(id, index).ok_or_else(|| {
        RuntimeError::malformed(format!(
            "{} node {id} is missing child {index}",
            tree.kind(id)
        ))
    })
}

fn truth(condition: &Value, construct: &str) -> InterpResult<bool> {
    condition.as_bool().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{construct} test must be a Boolean, got {}",
            condition.describe()
        ))
    })
}

fn callable(value: Value) -> InterpResult<Callee> {
    match value {
        Value::Function(function) => Ok(Callee::Function(function.definition)),
        other => Err(RuntimeError::type_error(format!(
            "cannot call {}",
            other.describe()
        ))),
    }
}

/// Reference for a write through `name`; constants are rejected
fn assignable(env: &ScopeDisplay, name: &str) -> InterpResult<Reference> {
    let reference = env
        .find_reference(name)
        .ok_or_else(|| RuntimeError::undefined_variable(name))?;
    if reference.constant {
        return Err(RuntimeError::constant_violation(name));
    }
    Ok(reference)
}

/// Undo the binding a statement made directly in the current level
fn remove_bindings(env: &mut ScopeDisplay, tree: &ParseTree, statement: NodeId) {
    let kind = tree.kind(statement);
    let Some(name) = tree.token(statement) else {
        return;
    };
    if kind.binds_variable() {
        env.remove_variable(name);
    } else if kind == NodeKind::FunctionDefinition {
        env.remove_function(name);
    }
}
