//! Constructors for assembling syntax trees in Rust
//!
//! Mirrors the node shapes the external parser emits. Used by the tests
//! and by embedders that generate programs directly.

use super::{NodeKind, SyntaxNode};

fn leaf(kind: NodeKind, token: impl Into<String>) -> SyntaxNode {
    SyntaxNode::new(kind).with_token(token)
}

fn node(kind: NodeKind, children: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::new(kind).with_children(children)
}

fn named(kind: NodeKind, name: &str, children: Vec<SyntaxNode>) -> SyntaxNode {
    leaf(kind, name).with_children(children)
}

// ============================================================================
// Structure
// ============================================================================

pub fn program(statements: Vec<SyntaxNode>) -> SyntaxNode {
    node(NodeKind::Program, statements)
}

pub fn block(statements: Vec<SyntaxNode>) -> SyntaxNode {
    node(NodeKind::Block, statements)
}

pub fn empty() -> SyntaxNode {
    SyntaxNode::new(NodeKind::Empty)
}

// ============================================================================
// Definitions
// ============================================================================

pub fn let_(name: &str, init: SyntaxNode) -> SyntaxNode {
    named(NodeKind::LetDefinition, name, vec![init])
}

pub fn const_(name: &str, init: SyntaxNode) -> SyntaxNode {
    named(NodeKind::ConstDefinition, name, vec![init])
}

pub fn declare(name: &str) -> SyntaxNode {
    leaf(NodeKind::Declaration, name)
}

/// Array declaration, with an explicit capacity expression or none (zero)
pub fn declare_array(name: &str, capacity: Option<SyntaxNode>) -> SyntaxNode {
    named(NodeKind::ArrayDeclaration, name, capacity.into_iter().collect())
}

pub fn declare_const(name: &str) -> SyntaxNode {
    leaf(NodeKind::ConstDeclaration, name)
}

// ============================================================================
// Assignment
// ============================================================================

pub fn assign(target: SyntaxNode, value: SyntaxNode) -> SyntaxNode {
    node(NodeKind::Assign, vec![target, value])
}

pub fn add_assign(target: SyntaxNode, value: SyntaxNode) -> SyntaxNode {
    node(NodeKind::AddAssign, vec![target, value])
}

pub fn sub_assign(target: SyntaxNode, value: SyntaxNode) -> SyntaxNode {
    node(NodeKind::SubtractAssign, vec![target, value])
}

pub fn mul_assign(target: SyntaxNode, value: SyntaxNode) -> SyntaxNode {
    node(NodeKind::MultiplyAssign, vec![target, value])
}

pub fn div_assign(target: SyntaxNode, value: SyntaxNode) -> SyntaxNode {
    node(NodeKind::DivideAssign, vec![target, value])
}

pub fn pre_inc(target: SyntaxNode) -> SyntaxNode {
    node(NodeKind::PreIncrement, vec![target])
}

pub fn pre_dec(target: SyntaxNode) -> SyntaxNode {
    node(NodeKind::PreDecrement, vec![target])
}

pub fn post_inc(target: SyntaxNode) -> SyntaxNode {
    node(NodeKind::PostIncrement, vec![target])
}

pub fn post_dec(target: SyntaxNode) -> SyntaxNode {
    node(NodeKind::PostDecrement, vec![target])
}

// ============================================================================
// Control flow
// ============================================================================

pub fn if_(test: SyntaxNode, then: SyntaxNode, otherwise: Option<SyntaxNode>) -> SyntaxNode {
    let mut children = vec![test, then];
    children.extend(otherwise);
    node(NodeKind::If, children)
}

pub fn for_(init: SyntaxNode, test: SyntaxNode, step: SyntaxNode, body: SyntaxNode) -> SyntaxNode {
    node(NodeKind::For, vec![init, test, step, body])
}

pub fn while_(test: SyntaxNode, body: SyntaxNode) -> SyntaxNode {
    node(NodeKind::While, vec![test, body])
}

// ============================================================================
// Functions
// ============================================================================

fn parameters(params: &[&str]) -> SyntaxNode {
    node(
        NodeKind::Parameters,
        params.iter().map(|p| leaf(NodeKind::Parameter, *p)).collect(),
    )
}

fn function_children(params: &[&str], body: SyntaxNode, ret: Option<SyntaxNode>) -> Vec<SyntaxNode> {
    let mut children = vec![parameters(params), body];
    children.extend(ret);
    children
}

pub fn function(name: &str, params: &[&str], body: SyntaxNode, ret: Option<SyntaxNode>) -> SyntaxNode {
    named(NodeKind::FunctionDefinition, name, function_children(params, body, ret))
}

pub fn lambda(params: &[&str], body: SyntaxNode, ret: Option<SyntaxNode>) -> SyntaxNode {
    node(NodeKind::AnonymousFunction, function_children(params, body, ret))
}

/// Call statement by name
pub fn call(name: &str, args: Vec<SyntaxNode>) -> SyntaxNode {
    named(NodeKind::Call, name, args)
}

/// Call statement through a callee expression
pub fn call_value(callee: SyntaxNode, args: Vec<SyntaxNode>) -> SyntaxNode {
    let mut children = vec![callee];
    children.extend(args);
    node(NodeKind::Call, children)
}

/// Invocation expression by name
pub fn invoke(name: &str, args: Vec<SyntaxNode>) -> SyntaxNode {
    named(NodeKind::Invocation, name, args)
}

/// Invocation expression through a callee expression
pub fn invoke_value(callee: SyntaxNode, args: Vec<SyntaxNode>) -> SyntaxNode {
    let mut children = vec![callee];
    children.extend(args);
    node(NodeKind::Invocation, children)
}

pub fn method(receiver: SyntaxNode, name: &str, args: Vec<SyntaxNode>) -> SyntaxNode {
    let mut children = vec![receiver];
    children.extend(args);
    named(NodeKind::MethodCall, name, children)
}

pub fn write(args: Vec<SyntaxNode>) -> SyntaxNode {
    call("write", args)
}

// ============================================================================
// Atoms
// ============================================================================

pub fn ident(name: &str) -> SyntaxNode {
    leaf(NodeKind::Identifier, name)
}

pub fn int(value: i64) -> SyntaxNode {
    leaf(NodeKind::NumberLiteral, value.to_string())
}

/// Number literal from its source text (`"1.5"`, `"7L"`, `"2f"`, `"0.5r"`)
pub fn number(text: &str) -> SyntaxNode {
    leaf(NodeKind::NumberLiteral, text)
}

pub fn string(text: &str) -> SyntaxNode {
    leaf(NodeKind::StringLiteral, text)
}

pub fn boolean(value: bool) -> SyntaxNode {
    leaf(NodeKind::BooleanLiteral, if value { "true" } else { "false" })
}

pub fn list(items: Vec<SyntaxNode>) -> SyntaxNode {
    node(NodeKind::ListLiteral, items)
}

pub fn array(items: Vec<SyntaxNode>) -> SyntaxNode {
    node(NodeKind::ArrayLiteral, items)
}

pub fn object(entries: Vec<(&str, SyntaxNode)>) -> SyntaxNode {
    node(
        NodeKind::ObjectLiteral,
        entries
            .into_iter()
            .map(|(key, value)| named(NodeKind::Entry, key, vec![value]))
            .collect(),
    )
}

// ============================================================================
// Dereference chains
// ============================================================================

pub fn deref(base: SyntaxNode, steps: Vec<SyntaxNode>) -> SyntaxNode {
    let mut children = vec![base];
    children.extend(steps);
    node(NodeKind::Dereference, children)
}

pub fn index(key: SyntaxNode) -> SyntaxNode {
    node(NodeKind::Index, vec![key])
}

pub fn member(name: &str) -> SyntaxNode {
    leaf(NodeKind::Member, name)
}

// ============================================================================
// Operators
// ============================================================================

pub fn binary(kind: NodeKind, left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    node(kind, vec![left, right])
}

pub fn add(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::Add, left, right)
}

pub fn sub(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::Subtract, left, right)
}

pub fn mul(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::Multiply, left, right)
}

pub fn div(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::Divide, left, right)
}

pub fn modulo(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::Modulo, left, right)
}

pub fn eq(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::Equal, left, right)
}

pub fn ne(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::NotEqual, left, right)
}

pub fn lt(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::Less, left, right)
}

pub fn le(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::LessEqual, left, right)
}

pub fn gt(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::Greater, left, right)
}

pub fn ge(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::GreaterEqual, left, right)
}

pub fn and(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::And, left, right)
}

pub fn or(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
    binary(NodeKind::Or, left, right)
}

pub fn not(operand: SyntaxNode) -> SyntaxNode {
    node(NodeKind::Not, vec![operand])
}

pub fn neg(operand: SyntaxNode) -> SyntaxNode {
    node(NodeKind::Negate, vec![operand])
}
