//! BelGraph: interned BEL terms and annotated multi-edges.
//!
//! - **Term interning**: every structurally distinct [`Term`] is stored once and
//!   referenced by a `u32` node id.
//! - **Edge keys**: parallel edges between two nodes are kept apart by a digest
//!   of their data (relation, provenance, modifiers). Re-asserting the same
//!   statement does not add an edge.
//! - **Bitmap indexes**: nodes by function and edges by relation are Roaring
//!   bitmaps, so selections compose with set operations.
//! - **Implied edges**: adding a term adds its structural edges (`hasVariant`
//!   from the parent, `hasComponent` to members, `hasReactant`/`hasProduct`).
//!
//! [`document`] builds a graph from BEL text.

pub mod document;

use ahash::AHashMap;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use belgraph_dsl::control::Citation;
use belgraph_dsl::digest::{edge_key, term_digest};
use belgraph_dsl::language::{Function, Relation};
use belgraph_dsl::term::{Concept, Modifier, Term, TermExpr};

pub use document::{parse_bel_document, BelDocument, DocumentError};

pub type NodeId = u32;
pub type EdgeId = u32;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to encode edge data: {0}")]
    Encode(#[from] serde_json::Error),
}

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub term: Term,
    /// `fnv1a64:` digest of the canonical BEL rendering.
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Interned term storage
#[derive(Debug, Default, Clone)]
pub struct NodeStore {
    nodes: Vec<Node>,
    by_term: AHashMap<Term, NodeId>,
    /// Function index: function -> bitmap of node IDs
    function_index: AHashMap<Function, RoaringBitmap>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node id for `term` and whether it was newly inserted.
    pub fn intern(&mut self, term: &Term) -> (NodeId, bool) {
        if let Some(&id) = self.by_term.get(term) {
            return (id, false);
        }
        let id = self.nodes.len() as NodeId;
        self.function_index
            .entry(term.function())
            .or_insert_with(RoaringBitmap::new)
            .insert(id);
        self.by_term.insert(term.clone(), id);
        self.nodes.push(Node {
            id,
            term: term.clone(),
            digest: term_digest(term),
            description: None,
        });
        (id, true)
    }

    pub fn id_of(&self, term: &Term) -> Option<NodeId> {
        self.by_term.get(term).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    pub fn by_function(&self, function: Function) -> Option<&RoaringBitmap> {
        self.function_index.get(&function)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

// ============================================================================
// Edges
// ============================================================================

/// Location and modifier of one side of an edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeModifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Concept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
}

impl EdgeModifier {
    /// The edge-level part of a term expression, if it has one.
    pub fn of(expr: &TermExpr) -> Option<Self> {
        if expr.is_bare() {
            return None;
        }
        Some(Self {
            location: expr.location.clone(),
            modifier: expr.modifier.clone(),
        })
    }
}

/// Everything an edge carries besides its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub relation: Relation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<EdgeModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<EdgeModifier>,
    /// Line of the statement that first asserted the edge; not part of the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl EdgeData {
    /// An edge with no provenance and no modifiers.
    pub fn unqualified(relation: Relation) -> Self {
        Self {
            relation,
            citation: None,
            evidence: None,
            annotations: BTreeMap::new(),
            subject: None,
            object: None,
            line: None,
        }
    }

    /// The same assertion read in the other direction.
    pub fn reversed(&self) -> Self {
        Self {
            subject: self.object.clone(),
            object: self.subject.clone(),
            ..self.clone()
        }
    }

    /// Equal in everything but the line.
    pub fn same_assertion(&self, other: &EdgeData) -> bool {
        EdgeData {
            line: None,
            ..self.clone()
        } == EdgeData {
            line: None,
            ..other.clone()
        }
    }

    fn key_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&EdgeData {
            line: None,
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub key: String,
    pub data: EdgeData,
}

/// Indexed edge storage
#[derive(Debug, Default, Clone)]
pub struct EdgeStore {
    edges: Vec<Edge>,
    /// Digest -> edges filed under it; more than one only on a digest collision.
    keys: AHashMap<String, Vec<EdgeId>>,
    /// Forward index: (source, relation) -> edge IDs
    forward_index: AHashMap<(NodeId, Relation), Vec<EdgeId>>,
    /// Backward index: (target, relation) -> edge IDs
    backward_index: AHashMap<(NodeId, Relation), Vec<EdgeId>>,
    /// Relation index: relation -> edge IDs
    relation_index: AHashMap<Relation, RoaringBitmap>,
}

impl EdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Adds an edge unless the same assertion is already stored under `key`.
    ///
    /// A different edge that collides on `key` is still added, with `~n` appended to its key.
    pub fn add(&mut self, source: NodeId, target: NodeId, key: String, data: EdgeData) -> Option<EdgeId> {
        let id = self.edges.len() as EdgeId;
        let filed = self.keys.entry(key.clone()).or_default();
        let duplicate = filed.iter().any(|&existing| {
            self.edges.get(existing as usize).is_some_and(|edge| {
                edge.source == source && edge.target == target && edge.data.same_assertion(&data)
            })
        });
        if duplicate {
            return None;
        }
        let key = match filed.len() {
            0 => key,
            n => {
                tracing::warn!(key = %key, "edge key collision");
                format!("{key}~{n}")
            }
        };
        filed.push(id);
        let relation = data.relation;

        self.forward_index
            .entry((source, relation))
            .or_insert_with(Vec::new)
            .push(id);
        self.backward_index
            .entry((target, relation))
            .or_insert_with(Vec::new)
            .push(id);
        self.relation_index
            .entry(relation)
            .or_insert_with(RoaringBitmap::new)
            .insert(id);

        self.edges.push(Edge {
            id,
            source,
            target,
            key,
            data,
        });
        Some(id)
    }

    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id as usize)
    }

    pub fn outgoing(&self, source: NodeId, relation: Relation) -> Vec<&Edge> {
        self.forward_index
            .get(&(source, relation))
            .map(|ids| ids.iter().filter_map(|&id| self.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn incoming(&self, target: NodeId, relation: Relation) -> Vec<&Edge> {
        self.backward_index
            .get(&(target, relation))
            .map(|ids| ids.iter().filter_map(|&id| self.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn by_relation(&self, relation: Relation) -> Option<&RoaringBitmap> {
        self.relation_index.get(&relation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct BelGraph {
    nodes: NodeStore,
    edges: EdgeStore,
}

impl BelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn node_id(&self, term: &Term) -> Option<NodeId> {
        self.nodes.id_of(term)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, term: &Term) -> bool {
        self.nodes.id_of(term).is_some()
    }

    /// Adds a term and, the first time it is seen, its implied structural edges.
    pub fn add_node(&mut self, term: &Term) -> Result<NodeId, GraphError> {
        let (id, inserted) = self.nodes.intern(term);
        if !inserted {
            return Ok(id);
        }

        if let Some(parent) = term.parent() {
            self.add_unqualified_edge(&parent, term, Relation::HasVariant)?;
        }
        for member in term.members() {
            self.add_unqualified_edge(term, member, Relation::HasComponent)?;
        }
        if let Some(reaction) = term.as_reaction() {
            for reactant in &reaction.reactants {
                self.add_unqualified_edge(term, reactant, Relation::HasReactant)?;
            }
            for product in &reaction.products {
                self.add_unqualified_edge(term, product, Relation::HasProduct)?;
            }
        }
        Ok(id)
    }

    /// Adds an edge between two terms, adding the terms as needed.
    ///
    /// Returns `None` when an identical edge already exists.
    pub fn add_edge(
        &mut self,
        source: &Term,
        target: &Term,
        data: EdgeData,
    ) -> Result<Option<EdgeId>, GraphError> {
        let source_id = self.add_node(source)?;
        let target_id = self.add_node(target)?;
        let key = {
            let source = &self.nodes.nodes[source_id as usize].digest;
            let target = &self.nodes.nodes[target_id as usize].digest;
            edge_key(source, target, &data.key_json()?)
        };
        let added = self.edges.add(source_id, target_id, key, data);
        if added.is_none() {
            tracing::trace!(source = source_id, target = target_id, "duplicate edge skipped");
        }
        Ok(added)
    }

    pub fn add_unqualified_edge(
        &mut self,
        source: &Term,
        target: &Term,
        relation: Relation,
    ) -> Result<Option<EdgeId>, GraphError> {
        self.add_edge(source, target, EdgeData::unqualified(relation))
    }

    /// Sets a node description, adding the node if needed.
    ///
    /// Returns the existing description when it differs; it is kept.
    pub fn set_description(&mut self, term: &Term, description: &str) -> Result<Option<String>, GraphError> {
        let id = self.add_node(term)?;
        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(None);
        };
        match &node.description {
            Some(existing) if existing != description => Ok(Some(existing.clone())),
            Some(_) => Ok(None),
            None => {
                node.description = Some(description.to_string());
                Ok(None)
            }
        }
    }

    pub fn description(&self, term: &Term) -> Option<&str> {
        let id = self.nodes.id_of(term)?;
        self.nodes.get(id)?.description.as_deref()
    }

    /// Nodes of one function.
    pub fn find_by_function(&self, function: Function) -> RoaringBitmap {
        self.nodes.by_function(function).cloned().unwrap_or_default()
    }

    /// Edges of one relation.
    pub fn find_by_relation(&self, relation: Relation) -> RoaringBitmap {
        self.edges.by_relation(relation).cloned().unwrap_or_default()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// All edges from `source` to `target`, in insertion order.
    pub fn edges_between(&self, source: &Term, target: &Term) -> Vec<&Edge> {
        let (Some(s), Some(t)) = (self.nodes.id_of(source), self.nodes.id_of(target)) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .filter(|e| e.source == s && e.target == t)
            .collect()
    }

    pub fn has_edge(&self, source: &Term, relation: Relation, target: &Term) -> bool {
        let (Some(s), Some(t)) = (self.nodes.id_of(source), self.nodes.id_of(target)) else {
            return false;
        };
        self.edges
            .outgoing(s, relation)
            .iter()
            .any(|e| e.target == t)
    }

    /// Targets reachable from `source` via `relation`.
    pub fn targets(&self, source: NodeId, relation: Relation) -> RoaringBitmap {
        self.edges
            .outgoing(source, relation)
            .iter()
            .map(|e| e.target)
            .collect()
    }

    /// Sources reaching `target` via `relation`.
    pub fn sources(&self, target: NodeId, relation: Relation) -> RoaringBitmap {
        self.edges
            .incoming(target, relation)
            .iter()
            .map(|e| e.source)
            .collect()
    }
}
