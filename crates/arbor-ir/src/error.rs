//! Error types for tree construction, scoping, serialization and rendering.

use crate::node::NodeKind;
use crate::types::Type;

/// Operand types that a type rule rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("expected a numeric type, got {0}")]
    NonNumeric(Type),

    #[error("expected a boolean type, got {0}")]
    NonBoolean(Type),

    #[error("expected an integer type, got {0}")]
    NonInteger(Type),

    #[error("{0} is not iterable")]
    NotIterable(Type),

    #[error("operator `{op}` cannot combine {lhs} and {rhs}")]
    Incompatible { op: String, lhs: Type, rhs: Type },
}

/// A `NodeId` that does not resolve in the tree it was used with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("node id belongs to another tree")]
    Foreign,

    #[error("node id {0} is out of range")]
    Missing(u32),
}

/// Invalid input to a node constructor. The tree is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("`{name}` is declared as {declared} but its value is {found}")]
    TypeMismatch {
        name: String,
        declared: Type,
        found: Type,
    },

    #[error("`{token}` is not a valid {position} operator")]
    UnknownOperator {
        token: String,
        position: &'static str,
    },

    #[error("{kind} node is already attached to a parent")]
    AlreadyAttached { kind: NodeKind },

    #[error("{kind} node cannot be used as an expression")]
    NotAnExpression { kind: NodeKind },

    #[error("expected {expected} in `{slot}`, got {found}")]
    UnexpectedKind {
        slot: &'static str,
        expected: &'static str,
        found: NodeKind,
    },

    #[error("invalid {ty} literal: {reason}")]
    InvalidLiteral { ty: Type, reason: String },

    #[error("{kind} node is not a block")]
    NotABlock { kind: NodeKind },

    #[error("`{name}` takes {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("a comprehension needs at least one generator clause")]
    MissingGenerator,

    #[error("appending would make {kind} node its own ancestor")]
    Cycle { kind: NodeKind },
}

/// Symbol table failure. The table state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("`{name}` is already defined in scope `{scope}`")]
    DuplicateBinding { name: String, scope: String },

    #[error("name `{0}` is not defined")]
    UnboundName(String),

    #[error("the root scope cannot be popped")]
    RootScope,

    #[error("scope `{0}` is held by a guard and cannot be popped")]
    GuardedScope(String),
}

/// Rendering failure. The tree stays valid and can be rendered again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("no rendering rule for {kind} nodes")]
    UnsupportedNode { kind: NodeKind },

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Failure while exporting a structural representation.
#[derive(Debug, thiserror::Error)]
pub enum ReprError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure while loading a render configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
