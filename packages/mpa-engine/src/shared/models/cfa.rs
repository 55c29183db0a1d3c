//! Control-flow automaton (CFA)
//!
//! The program under analysis as a directed graph: nodes are program
//! locations, edges carry the operation executed between them. Built
//! upstream (parsing is out of scope); analyses only read it.

use std::fmt;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;

/// Program location
pub type NodeId = NodeIndex;

/// Operation on a CFA edge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// No-op (joins, gotos)
    Blank,
    /// Local declaration
    Declaration,
    /// Statement/expression
    Statement,
    /// Branch condition taken with the given truth value
    Assume { truth: bool },
    /// Call of a named function
    FunctionCall { function: String },
    /// Return from a named function
    FunctionReturn { function: String },
}

/// Program location node
#[derive(Debug, Clone)]
pub struct CfaNode {
    pub function: String,
    pub is_exit: bool,
}

/// Edge between two program locations
#[derive(Debug, Clone)]
pub struct CfaEdge {
    pub id: EdgeIndex,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    /// Source text of the operation
    pub label: String,
    /// Set by [`CfaBuilder::build`]
    pub target_is_exit: bool,
}

impl fmt::Display for CfaEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N{} -{{{}}}-> N{}",
            self.source.index(),
            self.label,
            self.target.index()
        )
    }
}

/// Control-flow automaton of one program
#[derive(Debug, Clone)]
pub struct Cfa {
    graph: DiGraph<CfaNode, CfaEdge>,
    entry: NodeId,
}

impl Cfa {
    /// Start building a CFA whose entry node belongs to `function`
    pub fn builder(function: impl Into<String>) -> CfaBuilder {
        CfaBuilder::new(function)
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn node(&self, id: NodeId) -> Option<&CfaNode> {
        self.graph.node_weight(id)
    }

    pub fn is_exit(&self, id: NodeId) -> bool {
        self.node(id).map_or(false, |n| n.is_exit)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Leaving edges of `node` in insertion order
    pub fn leaving_edges(&self, node: NodeId) -> Vec<&CfaEdge> {
        let mut edges: Vec<&CfaEdge> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| e.weight())
            .collect();
        edges.sort_by_key(|e| e.id.index());
        edges
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &CfaEdge> {
        self.graph.edge_weights()
    }
}

/// Incremental CFA construction
#[derive(Debug)]
pub struct CfaBuilder {
    graph: DiGraph<CfaNode, CfaEdge>,
    entry: NodeId,
    function: String,
}

impl CfaBuilder {
    pub fn new(function: impl Into<String>) -> Self {
        let function = function.into();
        let mut graph = DiGraph::new();
        let entry = graph.add_node(CfaNode {
            function: function.clone(),
            is_exit: false,
        });
        Self {
            graph,
            entry,
            function,
        }
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Switch the function that new nodes belong to
    pub fn in_function(&mut self, function: impl Into<String>) -> &mut Self {
        self.function = function.into();
        self
    }

    pub fn add_node(&mut self) -> NodeId {
        self.graph.add_node(CfaNode {
            function: self.function.clone(),
            is_exit: false,
        })
    }

    pub fn mark_exit(&mut self, node: NodeId) -> &mut Self {
        if let Some(n) = self.graph.node_weight_mut(node) {
            n.is_exit = true;
        }
        self
    }

    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: EdgeKind,
        label: impl Into<String>,
    ) -> EdgeIndex {
        let id = self.graph.add_edge(
            from,
            to,
            CfaEdge {
                id: EdgeIndex::end(),
                source: from,
                target: to,
                kind,
                label: label.into(),
                target_is_exit: false,
            },
        );
        if let Some(edge) = self.graph.edge_weight_mut(id) {
            edge.id = id;
        }
        id
    }

    pub fn statement(&mut self, from: NodeId, to: NodeId, code: impl Into<String>) -> EdgeIndex {
        self.add_edge(from, to, EdgeKind::Statement, code)
    }

    pub fn assume(
        &mut self,
        from: NodeId,
        to: NodeId,
        condition: impl Into<String>,
        truth: bool,
    ) -> EdgeIndex {
        self.add_edge(from, to, EdgeKind::Assume { truth }, condition)
    }

    pub fn call(&mut self, from: NodeId, to: NodeId, function: impl Into<String>) -> EdgeIndex {
        let function = function.into();
        let label = format!("{}();", function);
        self.add_edge(from, to, EdgeKind::FunctionCall { function }, label)
    }

    pub fn blank(&mut self, from: NodeId, to: NodeId) -> EdgeIndex {
        self.add_edge(from, to, EdgeKind::Blank, "")
    }

    /// Append a chain of statements starting at `from`; returns the last node
    pub fn chain<I, S>(&mut self, from: NodeId, statements: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut current = from;
        for code in statements {
            let next = self.add_node();
            self.statement(current, next, code);
            current = next;
        }
        current
    }

    pub fn build(mut self) -> Cfa {
        let exits: Vec<bool> = self
            .graph
            .edge_indices()
            .map(|e| {
                self.graph
                    .edge_endpoints(e)
                    .and_then(|(_, target)| self.graph.node_weight(target))
                    .map_or(false, |n| n.is_exit)
            })
            .collect();
        for (edge, is_exit) in self.graph.edge_weights_mut().zip(exits) {
            edge.target_is_exit = is_exit;
        }

        Cfa {
            graph: self.graph,
            entry: self.entry,
        }
    }
}
