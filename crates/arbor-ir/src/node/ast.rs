//! Arena that owns every node of a tree.

use super::{Node, NodeData, NodeId, NodeKind};
use crate::error::{ConstructionError, NodeError};
use crate::location::SourceLocation;
use crate::types::Type;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

static NEXT_TREE: AtomicU32 = AtomicU32::new(1);
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Owner of a syntax tree.
///
/// Nodes are created through the constructor methods (`binary_op`, `block`,
/// `function`, ...), which validate their inputs and attach the given
/// children. A child can be attached to one parent only.
#[derive(Debug)]
pub struct Ast {
    id: u32,
    nodes: Vec<Node>,
    pending_loc: Option<SourceLocation>,
}

impl Ast {
    pub fn new() -> Self {
        Self {
            id: NEXT_TREE.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            pending_loc: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, NodeError> {
        if id.tree != self.id {
            return Err(NodeError::Foreign);
        }
        self.nodes
            .get(id.index as usize)
            .ok_or(NodeError::Missing(id.index))
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind, NodeError> {
        Ok(self.node(id)?.kind())
    }

    pub fn data(&self, id: NodeId) -> Result<&NodeData, NodeError> {
        Ok(&self.node(id)?.data)
    }

    /// All nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        let tree = self.id;
        self.nodes.iter().enumerate().map(move |(index, node)| {
            (
                NodeId {
                    tree,
                    index: index as u32,
                },
                node,
            )
        })
    }

    /// Set the source location of the next constructed node.
    ///
    /// ```ignore
    /// let x = ast.at(SourceLocation::new(3, 5)).int32(1);
    /// ```
    pub fn at(&mut self, loc: SourceLocation) -> &mut Self {
        self.pending_loc = Some(loc);
        self
    }

    pub(crate) fn take_location(&mut self) -> SourceLocation {
        self.pending_loc.take().unwrap_or_default()
    }

    pub fn set_comment(&mut self, id: NodeId, comment: impl Into<String>) -> Result<(), NodeError> {
        self.node(id)?;
        self.nodes[id.index as usize].comment = comment.into();
        Ok(())
    }

    /// Store a node whose payload has no child slots.
    pub(crate) fn alloc_leaf(&mut self, data: NodeData) -> NodeId {
        let loc = self.take_location();
        self.push(loc, data)
    }

    /// Store a node and attach its children to it.
    pub(crate) fn alloc(
        &mut self,
        loc: SourceLocation,
        data: NodeData,
    ) -> Result<NodeId, ConstructionError> {
        let children = data.children();
        for (i, child) in children.iter().enumerate() {
            let node = self.node(*child)?;
            if node.parent.is_some() || children[..i].contains(child) {
                return Err(ConstructionError::AlreadyAttached { kind: node.kind() });
            }
        }

        let id = self.push(loc, data);
        for child in children {
            self.nodes[child.index as usize].parent = Some(id);
        }
        Ok(id)
    }

    fn push(&mut self, loc: SourceLocation, data: NodeData) -> NodeId {
        let id = NodeId {
            tree: self.id,
            index: self.nodes.len() as u32,
        };
        let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(kind = %data.kind(), index = id.index, instance, "alloc node");
        self.nodes.push(Node {
            instance,
            loc,
            parent: None,
            comment: String::new(),
            data,
        });
        id
    }

    /// Append a statement to a `Block` or `Module`.
    pub fn append(&mut self, block: NodeId, child: NodeId) -> Result<(), ConstructionError> {
        let block_kind = self.kind(block)?;
        if !matches!(block_kind, NodeKind::Block | NodeKind::Module) {
            return Err(ConstructionError::NotABlock { kind: block_kind });
        }

        let child_node = self.node(child)?;
        let child_kind = child_node.kind();
        super::build::check_statement(child_kind)?;
        if child_node.parent.is_some() {
            return Err(ConstructionError::AlreadyAttached { kind: child_kind });
        }
        if child == block || self.ancestors(block).any(|a| a == child) {
            return Err(ConstructionError::Cycle { kind: child_kind });
        }

        self.nodes[child.index as usize].parent = Some(block);
        match &mut self.nodes[block.index as usize].data {
            NodeData::Block(b) => b.nodes.push(child),
            NodeData::Module(m) => m.nodes.push(child),
            _ => {}
        }
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, NodeError> {
        Ok(self.node(id)?.parent)
    }

    /// Parents of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            ast: self,
            next: self.node(id).ok().and_then(|n| n.parent),
        }
    }

    /// Nearest ancestor of the given kind.
    pub fn enclosing(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.ancestors(id)
            .find(|a| self.kind(*a).is_ok_and(|k| k == kind))
    }

    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>, NodeError> {
        Ok(self.node(id)?.data.children())
    }

    /// `root` and everything below it, depth-first in child order.
    pub fn descendants(&self, root: NodeId) -> Result<Vec<NodeId>, NodeError> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let children = self.children(id)?;
            out.push(id);
            stack.extend(children.into_iter().rev());
        }
        Ok(out)
    }

    /// Value type of an expression node, `None` for statements.
    pub fn type_of(&self, id: NodeId) -> Result<Option<Type>, NodeError> {
        Ok(self.node(id)?.data.value_type().cloned())
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`Ast::ancestors`].
pub struct Ancestors<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ast.node(current).ok().and_then(|n| n.parent);
        Some(current)
    }
}
