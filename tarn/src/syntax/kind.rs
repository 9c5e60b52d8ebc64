//! Parse-tree node kinds
//!
//! The external parser tags every node with one of these kinds. The tag
//! fixes how many children the node carries and whether it has a token
//! (see [`NodeKind::shape`]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // Structure
    Program,
    Block,
    Empty,

    // Definitions and declarations
    LetDefinition,
    ConstDefinition,
    Declaration,
    ArrayDeclaration,
    ConstDeclaration,

    // Assignment
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,

    // Control flow
    If,
    For,
    While,

    // Functions
    FunctionDefinition,
    AnonymousFunction,
    Parameters,
    Parameter,
    Call,
    Invocation,
    MethodCall,

    // Increment / decrement
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,

    // Atoms
    Identifier,
    NumberLiteral,
    StringLiteral,
    BooleanLiteral,
    ListLiteral,
    ArrayLiteral,
    ObjectLiteral,
    Entry,

    // Dereference chains
    Dereference,
    Index,
    Member,

    // Operators
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Not,
    Negate,
}

/// Binary operator carried by an operator node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    /// Operator name as used in diagnostics ("add", "less", ...)
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "subtract",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Divide => "divide",
            BinaryOp::Modulo => "modulo",
            BinaryOp::Equal => "equal",
            BinaryOp::NotEqual => "not equal",
            BinaryOp::Less => "less",
            BinaryOp::LessEqual => "less or equal",
            BinaryOp::Greater => "greater",
            BinaryOp::GreaterEqual => "greater or equal",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

/// How many children a node kind takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {n}"),
            Arity::Between(lo, hi) => write!(f, "{lo} to {hi}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Whether a node kind carries a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRule {
    Required,
    Optional,
    Forbidden,
}

/// Structural contract of a node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub token: TokenRule,
    pub children: Arity,
}

impl Shape {
    const fn new(token: TokenRule, children: Arity) -> Self {
        Shape { token, children }
    }
}

impl NodeKind {
    /// Token and child-count contract for this kind
    pub fn shape(self) -> Shape {
        use Arity::*;
        use TokenRule::*;
        match self {
            NodeKind::Program | NodeKind::Block => Shape::new(Forbidden, AtLeast(0)),
            NodeKind::Empty => Shape::new(Forbidden, Exact(0)),
            NodeKind::LetDefinition | NodeKind::ConstDefinition => Shape::new(Required, Exact(1)),
            NodeKind::Declaration | NodeKind::ConstDeclaration => Shape::new(Required, Exact(0)),
            NodeKind::ArrayDeclaration => Shape::new(Required, Between(0, 1)),
            NodeKind::Assign
            | NodeKind::AddAssign
            | NodeKind::SubtractAssign
            | NodeKind::MultiplyAssign
            | NodeKind::DivideAssign => Shape::new(Forbidden, Exact(2)),
            NodeKind::If => Shape::new(Forbidden, Between(2, 3)),
            NodeKind::For => Shape::new(Forbidden, Exact(4)),
            NodeKind::While => Shape::new(Forbidden, Exact(2)),
            NodeKind::FunctionDefinition => Shape::new(Required, Between(2, 3)),
            NodeKind::AnonymousFunction => Shape::new(Forbidden, Between(2, 3)),
            NodeKind::Parameters => Shape::new(Forbidden, AtLeast(0)),
            NodeKind::Parameter => Shape::new(Required, Exact(0)),
            NodeKind::Call | NodeKind::Invocation => Shape::new(Optional, AtLeast(0)),
            NodeKind::MethodCall => Shape::new(Required, AtLeast(1)),
            NodeKind::PreIncrement
            | NodeKind::PreDecrement
            | NodeKind::PostIncrement
            | NodeKind::PostDecrement => Shape::new(Forbidden, Exact(1)),
            NodeKind::Identifier
            | NodeKind::NumberLiteral
            | NodeKind::StringLiteral
            | NodeKind::BooleanLiteral
            | NodeKind::Member => Shape::new(Required, Exact(0)),
            NodeKind::ListLiteral | NodeKind::ArrayLiteral | NodeKind::ObjectLiteral => {
                Shape::new(Forbidden, AtLeast(0))
            }
            NodeKind::Entry => Shape::new(Required, Exact(1)),
            NodeKind::Dereference => Shape::new(Forbidden, AtLeast(2)),
            NodeKind::Index => Shape::new(Forbidden, Exact(1)),
            NodeKind::Add
            | NodeKind::Subtract
            | NodeKind::Multiply
            | NodeKind::Divide
            | NodeKind::Modulo
            | NodeKind::Equal
            | NodeKind::NotEqual
            | NodeKind::Less
            | NodeKind::LessEqual
            | NodeKind::Greater
            | NodeKind::GreaterEqual
            | NodeKind::And
            | NodeKind::Or => Shape::new(Forbidden, Exact(2)),
            NodeKind::Not | NodeKind::Negate => Shape::new(Forbidden, Exact(1)),
        }
    }

    /// The binary operator for operator kinds
    pub fn binary_op(self) -> Option<BinaryOp> {
        Some(match self {
            NodeKind::Add => BinaryOp::Add,
            NodeKind::Subtract => BinaryOp::Subtract,
            NodeKind::Multiply => BinaryOp::Multiply,
            NodeKind::Divide => BinaryOp::Divide,
            NodeKind::Modulo => BinaryOp::Modulo,
            NodeKind::Equal => BinaryOp::Equal,
            NodeKind::NotEqual => BinaryOp::NotEqual,
            NodeKind::Less => BinaryOp::Less,
            NodeKind::LessEqual => BinaryOp::LessEqual,
            NodeKind::Greater => BinaryOp::Greater,
            NodeKind::GreaterEqual => BinaryOp::GreaterEqual,
            NodeKind::And => BinaryOp::And,
            NodeKind::Or => BinaryOp::Or,
            _ => return None,
        })
    }

    /// The arithmetic operator a shorthand assignment applies, if any.
    /// `Some(None)` is plain assignment.
    pub fn assign_op(self) -> Option<Option<BinaryOp>> {
        match self {
            NodeKind::Assign => Some(None),
            NodeKind::AddAssign => Some(Some(BinaryOp::Add)),
            NodeKind::SubtractAssign => Some(Some(BinaryOp::Subtract)),
            NodeKind::MultiplyAssign => Some(Some(BinaryOp::Multiply)),
            NodeKind::DivideAssign => Some(Some(BinaryOp::Divide)),
            _ => None,
        }
    }

    /// Kinds that bind a variable or constant name in the enclosing scope
    pub fn binds_variable(self) -> bool {
        matches!(
            self,
            NodeKind::LetDefinition
                | NodeKind::ConstDefinition
                | NodeKind::Declaration
                | NodeKind::ArrayDeclaration
        )
    }

    /// Snake-case tag, identical to the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::Block => "block",
            NodeKind::Empty => "empty",
            NodeKind::LetDefinition => "let_definition",
            NodeKind::ConstDefinition => "const_definition",
            NodeKind::Declaration => "declaration",
            NodeKind::ArrayDeclaration => "array_declaration",
            NodeKind::ConstDeclaration => "const_declaration",
            NodeKind::Assign => "assign",
            NodeKind::AddAssign => "add_assign",
            NodeKind::SubtractAssign => "subtract_assign",
            NodeKind::MultiplyAssign => "multiply_assign",
            NodeKind::DivideAssign => "divide_assign",
            NodeKind::If => "if",
            NodeKind::For => "for",
            NodeKind::While => "while",
            NodeKind::FunctionDefinition => "function_definition",
            NodeKind::AnonymousFunction => "anonymous_function",
            NodeKind::Parameters => "parameters",
            NodeKind::Parameter => "parameter",
            NodeKind::Call => "call",
            NodeKind::Invocation => "invocation",
            NodeKind::MethodCall => "method_call",
            NodeKind::PreIncrement => "pre_increment",
            NodeKind::PreDecrement => "pre_decrement",
            NodeKind::PostIncrement => "post_increment",
            NodeKind::PostDecrement => "post_decrement",
            NodeKind::Identifier => "identifier",
            NodeKind::NumberLiteral => "number_literal",
            NodeKind::StringLiteral => "string_literal",
            NodeKind::BooleanLiteral => "boolean_literal",
            NodeKind::ListLiteral => "list_literal",
            NodeKind::ArrayLiteral => "array_literal",
            NodeKind::ObjectLiteral => "object_literal",
            NodeKind::Entry => "entry",
            NodeKind::Dereference => "dereference",
            NodeKind::Index => "index",
            NodeKind::Member => "member",
            NodeKind::Add => "add",
            NodeKind::Subtract => "subtract",
            NodeKind::Multiply => "multiply",
            NodeKind::Divide => "divide",
            NodeKind::Modulo => "modulo",
            NodeKind::Equal => "equal",
            NodeKind::NotEqual => "not_equal",
            NodeKind::Less => "less",
            NodeKind::LessEqual => "less_equal",
            NodeKind::Greater => "greater",
            NodeKind::GreaterEqual => "greater_equal",
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Not => "not",
            NodeKind::Negate => "negate",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
