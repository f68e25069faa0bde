//! Node model.
//!
//! Nodes live in an [`Ast`] arena and refer to each other by [`NodeId`].
//! Every concrete node kind is one [`NodeData`] variant carrying a payload
//! struct with its typed child slots. Parent links are plain ids, so a child
//! never owns its parent.
//!
//! ```text
//! Ast ──owns──> Vec<Node>
//!                 │
//!                 ├─ kind / loc / instance tag / comment
//!                 ├─ parent: Option<NodeId>   (non-owning)
//!                 └─ data: NodeData           (child slots as NodeId)
//! ```

mod ast;
mod build;

pub use ast::{Ancestors, Ast};

use crate::location::SourceLocation;
use crate::modifiers::{Mutability, ScopeKind, Visibility};
use crate::ops::{BinaryOperator, UnaryOperator};
use crate::types::Type;
use std::fmt;

/// Handle to a node inside the [`Ast`] that allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) tree: u32,
    pub(crate) index: u32,
}

impl NodeId {
    /// Position of the node in its arena.
    pub fn index(self) -> u32 {
        self.index
    }
}

/// Discriminant of a node variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Literal,
    CollectionLiteral,
    MapLiteral,
    Variable,
    VariableDeclaration,
    VariableAssignment,
    UnaryOp,
    BinaryOp,
    TypeCast,
    Block,
    Module,
    Argument,
    FunctionPrototype,
    FunctionDef,
    FunctionCall,
    FunctionReturn,
    IfStmt,
    WhileStmt,
    ForStmt,
    ForRangeStmt,
    Break,
    Continue,
    ComprehensionClause,
    Comprehension,
    ClassDecl,
    ClassDef,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A node stored in an [`Ast`].
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) instance: u64,
    pub(crate) loc: SourceLocation,
    pub(crate) parent: Option<NodeId>,
    pub(crate) comment: String,
    pub(crate) data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn loc(&self) -> SourceLocation {
        self.loc
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Per-process-unique tag assigned at construction.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }
}

/// Value carried by a [`Literal`].
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Bool(bool),
    Int(i128),
    UInt(u128),
    Float(f64),
    Complex { real: f64, imag: f64 },
    Str(String),
    Char(char),
    /// ISO-8601 text for date/time types.
    Temporal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Set,
    Tuple,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionLiteral {
    pub kind: CollectionKind,
    pub elements: Vec<NodeId>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLiteral {
    pub entries: Vec<(NodeId, NodeId)>,
    pub ty: Type,
}

/// Use of a name.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
}

/// Introduces a binding.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: String,
    pub ty: Type,
    pub mutability: Mutability,
    pub visibility: Visibility,
    pub scope: ScopeKind,
    pub value: Option<NodeId>,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            mutability: Mutability::Constant,
            visibility: Visibility::Public,
            scope: ScopeKind::Local,
            value: None,
        }
    }

    pub fn with_value(mut self, value: NodeId) -> Self {
        self.value = Some(value);
        self
    }

    pub fn mutable(mut self) -> Self {
        self.mutability = Mutability::Mutable;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = scope;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableAssignment {
    pub name: String,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    pub op: UnaryOperator,
    pub operand: NodeId,
    /// Resolved result type.
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub op: BinaryOperator,
    pub lhs: NodeId,
    pub rhs: NodeId,
    /// Resolved result type.
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeCast {
    pub expr: NodeId,
    pub target: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub nodes: Vec<NodeId>,
}

/// A named block used as a tree root.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub nodes: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub ty: Type,
    pub mutability: Mutability,
    pub default: Option<NodeId>,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            mutability: Mutability::Constant,
            default: None,
        }
    }

    pub fn with_default(mut self, default: NodeId) -> Self {
        self.default = Some(default);
        self
    }

    pub fn mutable(mut self) -> Self {
        self.mutability = Mutability::Mutable;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionPrototype {
    pub name: String,
    /// `Argument` nodes, in order.
    pub args: Vec<NodeId>,
    pub return_type: Type,
    pub scope: ScopeKind,
    pub visibility: Visibility,
    pub mutability: Mutability,
}

impl FunctionPrototype {
    pub fn new(name: impl Into<String>, args: Vec<NodeId>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            args,
            return_type,
            scope: ScopeKind::Global,
            visibility: Visibility::Public,
            mutability: Mutability::Constant,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_mutability(mut self, mutability: Mutability) -> Self {
        self.mutability = mutability;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub prototype: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub callee: String,
    pub args: Vec<NodeId>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionReturn {
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: NodeId,
    pub then: NodeId,
    pub else_: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub target: NodeId,
    pub iterable: NodeId,
    /// Filters; the body runs only when all hold.
    pub conditions: Vec<NodeId>,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForRangeStmt {
    /// A `VariableDeclaration` without a value.
    pub variable: NodeId,
    pub start: NodeId,
    pub end: NodeId,
    pub step: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComprehensionClause {
    pub target: NodeId,
    pub iterable: NodeId,
    pub conditions: Vec<NodeId>,
    pub is_async: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComprehensionKind {
    List,
    Set,
    Generator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub kind: ComprehensionKind,
    pub element: NodeId,
    /// `ComprehensionClause` nodes, outermost first.
    pub generators: Vec<NodeId>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub bases: Vec<NodeId>,
    pub decorators: Vec<NodeId>,
    pub is_abstract: bool,
    pub visibility: Visibility,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            decorators: Vec::new(),
            is_abstract: false,
            visibility: Visibility::Public,
        }
    }

    pub fn with_bases(mut self, bases: Vec<NodeId>) -> Self {
        self.bases = bases;
        self
    }

    pub fn with_decorators(mut self, decorators: Vec<NodeId>) -> Self {
        self.decorators = decorators;
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<NodeId>,
    pub decorators: Vec<NodeId>,
    pub is_abstract: bool,
    pub visibility: Visibility,
    /// `VariableDeclaration` nodes.
    pub attributes: Vec<NodeId>,
    /// `FunctionDef` nodes.
    pub methods: Vec<NodeId>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from(ClassDecl::new(name))
    }

    pub fn with_attributes(mut self, attributes: Vec<NodeId>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_methods(mut self, methods: Vec<NodeId>) -> Self {
        self.methods = methods;
        self
    }
}

impl From<ClassDecl> for ClassDef {
    fn from(decl: ClassDecl) -> Self {
        Self {
            name: decl.name,
            bases: decl.bases,
            decorators: decl.decorators,
            is_abstract: decl.is_abstract,
            visibility: decl.visibility,
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }
}

/// Payload of every node kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Literal(Literal),
    CollectionLiteral(CollectionLiteral),
    MapLiteral(MapLiteral),
    Variable(Variable),
    VariableDeclaration(VariableDeclaration),
    VariableAssignment(VariableAssignment),
    UnaryOp(UnaryOp),
    BinaryOp(BinaryOp),
    TypeCast(TypeCast),
    Block(Block),
    Module(Module),
    Argument(Argument),
    FunctionPrototype(FunctionPrototype),
    FunctionDef(FunctionDef),
    FunctionCall(FunctionCall),
    FunctionReturn(FunctionReturn),
    IfStmt(IfStmt),
    WhileStmt(WhileStmt),
    ForStmt(ForStmt),
    ForRangeStmt(ForRangeStmt),
    Break,
    Continue,
    ComprehensionClause(ComprehensionClause),
    Comprehension(Comprehension),
    ClassDecl(ClassDecl),
    ClassDef(ClassDef),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Literal(_) => NodeKind::Literal,
            NodeData::CollectionLiteral(_) => NodeKind::CollectionLiteral,
            NodeData::MapLiteral(_) => NodeKind::MapLiteral,
            NodeData::Variable(_) => NodeKind::Variable,
            NodeData::VariableDeclaration(_) => NodeKind::VariableDeclaration,
            NodeData::VariableAssignment(_) => NodeKind::VariableAssignment,
            NodeData::UnaryOp(_) => NodeKind::UnaryOp,
            NodeData::BinaryOp(_) => NodeKind::BinaryOp,
            NodeData::TypeCast(_) => NodeKind::TypeCast,
            NodeData::Block(_) => NodeKind::Block,
            NodeData::Module(_) => NodeKind::Module,
            NodeData::Argument(_) => NodeKind::Argument,
            NodeData::FunctionPrototype(_) => NodeKind::FunctionPrototype,
            NodeData::FunctionDef(_) => NodeKind::FunctionDef,
            NodeData::FunctionCall(_) => NodeKind::FunctionCall,
            NodeData::FunctionReturn(_) => NodeKind::FunctionReturn,
            NodeData::IfStmt(_) => NodeKind::IfStmt,
            NodeData::WhileStmt(_) => NodeKind::WhileStmt,
            NodeData::ForStmt(_) => NodeKind::ForStmt,
            NodeData::ForRangeStmt(_) => NodeKind::ForRangeStmt,
            NodeData::Break => NodeKind::Break,
            NodeData::Continue => NodeKind::Continue,
            NodeData::ComprehensionClause(_) => NodeKind::ComprehensionClause,
            NodeData::Comprehension(_) => NodeKind::Comprehension,
            NodeData::ClassDecl(_) => NodeKind::ClassDecl,
            NodeData::ClassDef(_) => NodeKind::ClassDef,
        }
    }

    /// Type of the value this node produces, or `None` for statements.
    pub fn value_type(&self) -> Option<&Type> {
        match self {
            NodeData::Literal(n) => Some(&n.ty),
            NodeData::CollectionLiteral(n) => Some(&n.ty),
            NodeData::MapLiteral(n) => Some(&n.ty),
            NodeData::Variable(n) => Some(&n.ty),
            NodeData::UnaryOp(n) => Some(&n.ty),
            NodeData::BinaryOp(n) => Some(&n.ty),
            NodeData::TypeCast(n) => Some(&n.target),
            NodeData::FunctionCall(n) => Some(&n.ty),
            NodeData::Comprehension(n) => Some(&n.ty),
            _ => None,
        }
    }

    /// Child slots in declaration order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeData::Literal(_)
            | NodeData::Variable(_)
            | NodeData::Break
            | NodeData::Continue => Vec::new(),
            NodeData::CollectionLiteral(n) => n.elements.clone(),
            NodeData::MapLiteral(n) => n.entries.iter().flat_map(|(k, v)| [*k, *v]).collect(),
            NodeData::VariableDeclaration(n) => n.value.into_iter().collect(),
            NodeData::VariableAssignment(n) => vec![n.value],
            NodeData::UnaryOp(n) => vec![n.operand],
            NodeData::BinaryOp(n) => vec![n.lhs, n.rhs],
            NodeData::TypeCast(n) => vec![n.expr],
            NodeData::Block(n) => n.nodes.clone(),
            NodeData::Module(n) => n.nodes.clone(),
            NodeData::Argument(n) => n.default.into_iter().collect(),
            NodeData::FunctionPrototype(n) => n.args.clone(),
            NodeData::FunctionDef(n) => vec![n.prototype, n.body],
            NodeData::FunctionCall(n) => n.args.clone(),
            NodeData::FunctionReturn(n) => n.value.into_iter().collect(),
            NodeData::IfStmt(n) => {
                let mut out = vec![n.condition, n.then];
                out.extend(n.else_);
                out
            }
            NodeData::WhileStmt(n) => vec![n.condition, n.body],
            NodeData::ForStmt(n) => {
                let mut out = vec![n.target, n.iterable];
                out.extend(&n.conditions);
                out.push(n.body);
                out
            }
            NodeData::ForRangeStmt(n) => {
                let mut out = vec![n.variable, n.start, n.end];
                out.extend(n.step);
                out.push(n.body);
                out
            }
            NodeData::ComprehensionClause(n) => {
                let mut out = vec![n.target, n.iterable];
                out.extend(&n.conditions);
                out
            }
            NodeData::Comprehension(n) => {
                let mut out = vec![n.element];
                out.extend(&n.generators);
                out
            }
            NodeData::ClassDecl(n) => n.bases.iter().chain(&n.decorators).copied().collect(),
            NodeData::ClassDef(n) => n
                .bases
                .iter()
                .chain(&n.decorators)
                .chain(&n.attributes)
                .chain(&n.methods)
                .copied()
                .collect(),
        }
    }
}
