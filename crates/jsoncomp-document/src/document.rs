//! Pointer-addressable document
//!
//! [`Document`] owns a tree of nodes stored in an arena. Every node has a
//! [`NodeId`] that stays valid until the node is removed, so a node can be
//! swapped for a new subtree in place without disturbing its parent or any
//! other id held elsewhere.
//!
//! # Addressing
//!
//! All operations take a [`Pointer`]. Mapping children are addressed by key,
//! sequence children by canonical non-negative index. Negative and
//! out-of-bounds indices are rejected with [`DocumentError::IndexRange`]
//! instead of wrapping or clamping.

use crate::error::DocumentError;
use crate::pointer::{Pointer, SequenceToken, Token};
use crate::value::{Map, Value};
use indexmap::IndexMap;
use std::fmt::{self, Display, Formatter};

/// Stable index of a node within a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw slot index
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena node
#[derive(Debug, Clone)]
pub enum Node {
    /// Leaf: null, bool, number, string or matcher (never a container)
    Scalar(Value),
    /// Ordered key -> child mapping
    Mapping(IndexMap<String, NodeId>),
    /// Ordered child list
    Sequence(Vec<NodeId>),
}

impl Node {
    /// Borrow mapping children
    #[inline]
    #[must_use]
    pub fn as_mapping(&self) -> Option<&IndexMap<String, NodeId>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Check for container node
    #[inline]
    #[must_use]
    pub fn is_container(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }
}

/// Owned tree of nodes addressed by pointers
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
    live: usize,
}

impl Document {
    /// Build document from a value
    #[must_use]
    pub fn new(value: Value) -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            live: 0,
        };
        doc.root = doc.alloc(value);
        doc
    }

    /// Root node id
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check whether the root is an empty container or `null`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.node(self.root) {
            Some(Node::Mapping(map)) => map.is_empty(),
            Some(Node::Sequence(items)) => items.is_empty(),
            Some(Node::Scalar(value)) => value.is_null(),
            None => true,
        }
    }

    /// Borrow node by id
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Check whether id refers to a live node
    #[inline]
    #[must_use]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Resolve pointer to node id
    ///
    /// # Errors
    /// - [`DocumentError::NotFound`] if a segment is absent or type-incompatible
    /// - [`DocumentError::IndexRange`] for negative or out-of-bounds indices
    pub fn node_id(&self, pointer: &Pointer) -> Result<NodeId, DocumentError> {
        let mut current = self.root;
        for (depth, token) in pointer.iter().enumerate() {
            current = self.child_of(current, token, pointer, depth)?;
        }
        Ok(current)
    }

    /// Resolve pointer to the ids of every node along the path
    ///
    /// The first element is the root, the last is the addressed node.
    ///
    /// # Errors
    /// Same as [`Document::node_id`]
    pub fn path_ids(&self, pointer: &Pointer) -> Result<Vec<NodeId>, DocumentError> {
        let mut ids = Vec::with_capacity(pointer.len() + 1);
        let mut current = self.root;
        ids.push(current);
        for (depth, token) in pointer.iter().enumerate() {
            current = self.child_of(current, token, pointer, depth)?;
            ids.push(current);
        }
        Ok(ids)
    }

    /// Check that pointer refers to an existing node
    #[inline]
    #[must_use]
    pub fn contains(&self, pointer: &Pointer) -> bool {
        self.node_id(pointer).is_ok()
    }

    /// Get deep copy of value at pointer
    ///
    /// # Errors
    /// Same as [`Document::node_id`]
    pub fn get(&self, pointer: &Pointer) -> Result<Value, DocumentError> {
        let id = self.node_id(pointer)?;
        self.value_of(id).ok_or(DocumentError::StaleNode(id))
    }

    /// Get value at pointer, or `default` if it does not resolve
    #[must_use]
    pub fn get_or(&self, pointer: &Pointer, default: Value) -> Value {
        self.get(pointer).unwrap_or(default)
    }

    /// Materialize the subtree rooted at `id`
    #[must_use]
    pub fn value_of(&self, id: NodeId) -> Option<Value> {
        Some(match self.node(id)? {
            Node::Scalar(value) => value.clone(),
            Node::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, child)| (k.clone(), self.value_of(*child).unwrap_or_default()))
                    .collect(),
            ),
            Node::Sequence(items) => Value::Array(
                items
                    .iter()
                    .map(|child| self.value_of(*child).unwrap_or_default())
                    .collect(),
            ),
        })
    }

    /// Set value at pointer
    ///
    /// The parent must exist; only the final token may introduce a new
    /// mapping key or (with `-`) append to a sequence. Setting an existing
    /// node swaps its content in place and keeps its id.
    ///
    /// # Errors
    /// - [`DocumentError::RootModification`] for the root pointer
    /// - [`DocumentError::NotFound`] if the parent is missing or not a container
    /// - [`DocumentError::IndexRange`] for bad sequence indices
    pub fn set(&mut self, pointer: &Pointer, value: Value) -> Result<NodeId, DocumentError> {
        let (Some(parent_ptr), Some(token)) = (pointer.parent(), pointer.last()) else {
            return Err(DocumentError::RootModification);
        };
        let parent = self.node_id(&parent_ptr)?;

        let existing = match self.node(parent) {
            Some(Node::Mapping(map)) => match token {
                Token::Key(key) => map.get(key).copied(),
                Token::Index(_) => return Err(DocumentError::not_found(pointer)),
            },
            Some(Node::Sequence(items)) => match token.as_sequence_token() {
                SequenceToken::Index(i) if i < items.len() => Some(items[i]),
                SequenceToken::Append => None,
                SequenceToken::Index(_) | SequenceToken::OutOfRange => {
                    return Err(DocumentError::index_range(
                        pointer,
                        token.as_text(),
                        items.len(),
                    ));
                }
                SequenceToken::NotIndex => return Err(DocumentError::not_found(pointer)),
            },
            Some(Node::Scalar(_)) => return Err(DocumentError::not_found(pointer)),
            None => return Err(DocumentError::StaleNode(parent)),
        };

        if let Some(id) = existing {
            self.replace(id, value)?;
            return Ok(id);
        }

        let id = self.alloc(value);
        match self.slots.get_mut(parent.0).and_then(Option::as_mut) {
            Some(Node::Mapping(map)) => {
                map.insert(token.as_text().into_owned(), id);
            }
            Some(Node::Sequence(items)) => items.push(id),
            _ => return Err(DocumentError::StaleNode(parent)),
        }
        Ok(id)
    }

    /// Delete node at pointer, returning its value
    ///
    /// Deleting a sequence element shifts the following elements down.
    ///
    /// # Errors
    /// - [`DocumentError::RootModification`] for the root pointer
    /// - [`DocumentError::NotFound`] / [`DocumentError::IndexRange`] if absent
    pub fn delete(&mut self, pointer: &Pointer) -> Result<Value, DocumentError> {
        let (Some(parent_ptr), Some(token)) = (pointer.parent(), pointer.last()) else {
            return Err(DocumentError::RootModification);
        };
        let parent = self.node_id(&parent_ptr)?;
        let id = self.child_of(parent, token, pointer, pointer.len() - 1)?;
        let value = self.value_of(id).ok_or(DocumentError::StaleNode(id))?;

        match self.slots.get_mut(parent.0).and_then(Option::as_mut) {
            Some(Node::Mapping(map)) => {
                map.shift_remove(token.as_text().as_ref());
            }
            Some(Node::Sequence(items)) => items.retain(|child| *child != id),
            _ => return Err(DocumentError::StaleNode(parent)),
        }
        self.free_subtree(id);
        Ok(value)
    }

    /// Replace the subtree at `id` with a new value, keeping the id
    ///
    /// # Errors
    /// Returns [`DocumentError::StaleNode`] if `id` is not live
    pub fn replace(&mut self, id: NodeId, value: Value) -> Result<(), DocumentError> {
        let old = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(DocumentError::StaleNode(id))?;
        for child in Self::children_ids(&old) {
            self.free_subtree(child);
        }
        let node = self.build(value);
        self.slots[id.0] = Some(node);
        Ok(())
    }

    /// Flatten into `(pointer, value)` pairs for every node
    ///
    /// Depth-first pre-order, children in insertion order, root first.
    #[must_use]
    pub fn flatten(&self) -> Vec<(Pointer, Value)> {
        self.walk()
            .into_iter()
            .filter_map(|(ptr, id)| self.value_of(id).map(|v| (ptr, v)))
            .collect()
    }

    /// Flatten scalar leaves only
    #[must_use]
    pub fn leaves(&self) -> Vec<(Pointer, Value)> {
        self.walk()
            .into_iter()
            .filter_map(|(ptr, id)| match self.node(id) {
                Some(Node::Scalar(value)) => Some((ptr, value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Walk every node, yielding pointer and id in pre-order
    #[must_use]
    pub fn walk(&self) -> Vec<(Pointer, NodeId)> {
        self.walk_from(self.root, &Pointer::root())
    }

    /// Walk the subtree at `id`, pointers prefixed with `base`
    #[must_use]
    pub fn walk_from(&self, id: NodeId, base: &Pointer) -> Vec<(Pointer, NodeId)> {
        let mut out = Vec::new();
        let mut stack = vec![(base.clone(), id)];
        while let Some((ptr, id)) = stack.pop() {
            match self.node(id) {
                Some(Node::Mapping(map)) => {
                    for (key, child) in map.iter().rev() {
                        stack.push((ptr.child(key.as_str()), *child));
                    }
                }
                Some(Node::Sequence(items)) => {
                    for (i, child) in items.iter().enumerate().rev() {
                        stack.push((ptr.child(i), *child));
                    }
                }
                Some(Node::Scalar(_)) => {}
                None => continue,
            }
            out.push((ptr, id));
        }
        out
    }

    /// Materialize the whole document
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.value_of(self.root).unwrap_or_default()
    }

    /// Consume document into a value
    #[must_use]
    pub fn into_value(self) -> Value {
        self.to_value()
    }

    fn child_of(
        &self,
        parent: NodeId,
        token: &Token,
        pointer: &Pointer,
        depth: usize,
    ) -> Result<NodeId, DocumentError> {
        let at = || Pointer::new(pointer.tokens()[..=depth].to_vec());
        match self.node(parent) {
            Some(Node::Mapping(map)) => match token {
                Token::Key(key) => map
                    .get(key)
                    .copied()
                    .ok_or_else(|| DocumentError::not_found(pointer)),
                Token::Index(_) => Err(DocumentError::not_found(pointer)),
            },
            Some(Node::Sequence(items)) => match token.as_sequence_token() {
                SequenceToken::Index(i) => items
                    .get(i)
                    .copied()
                    .ok_or_else(|| DocumentError::index_range(&at(), token.as_text(), items.len())),
                SequenceToken::OutOfRange => Err(DocumentError::index_range(
                    &at(),
                    token.as_text(),
                    items.len(),
                )),
                SequenceToken::Append | SequenceToken::NotIndex => {
                    Err(DocumentError::not_found(pointer))
                }
            },
            Some(Node::Scalar(_)) => Err(DocumentError::not_found(pointer)),
            None => Err(DocumentError::StaleNode(parent)),
        }
    }

    fn alloc(&mut self, value: Value) -> NodeId {
        let node = self.build(value);
        self.insert_slot(node)
    }

    fn build(&mut self, value: Value) -> Node {
        match value {
            Value::Object(map) => Node::Mapping(self.alloc_map(map)),
            Value::Array(items) => {
                Node::Sequence(items.into_iter().map(|item| self.alloc(item)).collect())
            }
            scalar => Node::Scalar(scalar),
        }
    }

    fn alloc_map(&mut self, map: Map) -> IndexMap<String, NodeId> {
        map.into_iter()
            .map(|(key, item)| (key, self.alloc(item)))
            .collect()
    }

    fn insert_slot(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(node);
            NodeId(index)
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.slots.get_mut(id.0).and_then(Option::take) {
                stack.extend(Self::children_ids(&node));
                self.free.push(id.0);
                self.live -= 1;
            }
        }
    }

    fn children_ids(node: &Node) -> Vec<NodeId> {
        match node {
            Node::Mapping(map) => map.values().copied().collect(),
            Node::Sequence(items) => items.clone(),
            Node::Scalar(_) => Vec::new(),
        }
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        Self::new(Value::from(value))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Value::object())
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.to_value() == other.to_value()
    }
}
