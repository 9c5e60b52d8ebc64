//! Per-node memoisation side table

use super::function::FunctionDefinition;
use super::value::Value;
use crate::syntax::NodeId;
use std::rc::Rc;

/// What a node evaluated to the first time, when that is reusable
#[derive(Debug, Clone)]
pub enum Cached {
    /// Literal value; compound literals are never cached
    Literal(Value),
    Function(Rc<FunctionDefinition>),
}

/// One optional entry per parse-tree node
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: Vec<Option<Cached>>,
}

impl NodeCache {
    pub fn new(nodes: usize) -> Self {
        NodeCache {
            entries: vec![None; nodes],
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Cached> {
        self.entries.get(id.index())?.as_ref()
    }

    pub fn literal(&self, id: NodeId) -> Option<Value> {
        match self.get(id)? {
            Cached::Literal(value) => Some(value.clone()),
            Cached::Function(_) => None,
        }
    }

    pub fn function(&self, id: NodeId) -> Option<Rc<FunctionDefinition>> {
        match self.get(id)? {
            Cached::Function(definition) => Some(Rc::clone(definition)),
            Cached::Literal(_) => None,
        }
    }

    pub fn insert(&mut self, id: NodeId, entry: Cached) {
        if id.index() >= self.entries.len() {
            self.entries.resize(id.index() + 1, None);
        }
        self.entries[id.index()] = Some(entry);
    }

    /// Number of populated entries
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
