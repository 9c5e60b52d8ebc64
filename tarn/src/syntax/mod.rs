//! Parse-tree interchange
//!
//! The external parser hands Tarn a nested [`SyntaxNode`] (usually as JSON).
//! It is flattened once into a [`ParseTree`] arena so the evaluator can refer
//! to nodes by [`NodeId`] and keep per-node memoisation in a side table.

pub mod build;
mod kind;
mod span;

pub use kind::*;
pub use span::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

/// Nested parse-tree node as produced by the external parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind) -> Self {
        SyntaxNode {
            kind,
            children: Vec::new(),
            token: None,
            span: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// Index of a node inside a [`ParseTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Flattened node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub token: Option<String>,
    pub span: Option<Span>,
}

/// Arena of nodes with a distinguished root
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree {
    nodes: Vec<Node>,
    root: NodeId,
}

/// A structural defect found by [`ParseTree::validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct TreeProblem {
    pub node: NodeId,
    pub kind: NodeKind,
    pub span: Option<Span>,
    pub message: String,
}

impl fmt::Display for TreeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} node {}", self.kind, self.node)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl ParseTree {
    /// Flatten a nested syntax tree into an arena (pre-order ids)
    pub fn from_syntax(root: SyntaxNode) -> Self {
        let mut nodes = Vec::new();
        let root = Self::flatten(&mut nodes, root);
        ParseTree { nodes, root }
    }

    fn flatten(nodes: &mut Vec<Node>, syntax: SyntaxNode) -> NodeId {
        let id = NodeId(nodes.len() as u32);
        nodes.push(Node {
            kind: syntax.kind,
            children: Vec::with_capacity(syntax.children.len()),
            token: syntax.token,
            span: syntax.span,
        });
        let children: Vec<NodeId> = syntax
            .children
            .into_iter()
            .map(|child| Self::flatten(nodes, child))
            .collect();
        nodes[id.index()].children = children;
        id
    }

    /// Decode the JSON form of a syntax tree
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let syntax: SyntaxNode = serde_json::from_str(text)?;
        Ok(Self::from_syntax(syntax))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).children.get(index).copied()
    }

    pub fn token(&self, id: NodeId) -> Option<&str> {
        self.node(id).token.as_deref()
    }

    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.node(id).span
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check every node against its kind's shape and the cross-node rules
    /// (parameter lists, object entries, dereference steps).
    pub fn validate(&self) -> Result<(), Vec<TreeProblem>> {
        let mut problems = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index as u32);
            let mut report = |message: String| {
                problems.push(TreeProblem {
                    node: id,
                    kind: node.kind,
                    span: node.span,
                    message,
                })
            };

            let shape = node.kind.shape();
            if !shape.children.accepts(node.children.len()) {
                report(format!(
                    "expected {} children, found {}",
                    shape.children,
                    node.children.len()
                ));
            }
            match (shape.token, &node.token) {
                (TokenRule::Required, None) => report("missing token".to_string()),
                (TokenRule::Forbidden, Some(token)) => {
                    report(format!("unexpected token {token:?}"))
                }
                _ => {}
            }

            let child_kinds = node.children.iter().map(|c| self.kind(*c));
            match node.kind {
                NodeKind::Call | NodeKind::Invocation => {
                    if node.token.is_none() && node.children.is_empty() {
                        report("call without a callee".to_string());
                    }
                }
                NodeKind::FunctionDefinition | NodeKind::AnonymousFunction => {
                    if let Some(first) = node.children.first() {
                        if self.kind(*first) != NodeKind::Parameters {
                            report("first child must be parameters".to_string());
                        }
                    }
                }
                NodeKind::Parameters => {
                    if child_kinds.clone().any(|k| k != NodeKind::Parameter) {
                        report("parameters may only contain parameter nodes".to_string());
                    }
                }
                NodeKind::ObjectLiteral => {
                    if child_kinds.clone().any(|k| k != NodeKind::Entry) {
                        report("object literal may only contain entry nodes".to_string());
                    }
                }
                NodeKind::Dereference => {
                    if child_kinds
                        .clone()
                        .skip(1)
                        .any(|k| !matches!(k, NodeKind::Index | NodeKind::Member))
                    {
                        report("dereference steps must be index or member nodes".to_string());
                    }
                }
                NodeKind::BooleanLiteral => {
                    if let Some(token) = &node.token {
                        if token != "true" && token != "false" {
                            report(format!("invalid boolean literal {token:?}"));
                        }
                    }
                }
                _ => {}
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// Indented one-node-per-line rendering of the tree
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            let _ = write!(out, "{:indent$}{}", "", node.kind, indent = depth * 2);
            if let Some(token) = &node.token {
                let _ = write!(out, " {token:?}");
            }
            out.push('\n');
            for child in node.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }
}
