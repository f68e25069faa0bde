//! Typed, language-agnostic syntax trees.
//!
//! `arbor-ir` builds abstract syntax trees whose nodes are type-checked as
//! they are constructed, exports them as ordered structural data (JSON or
//! YAML) for inspection and golden tests, and renders them as source code.
//!
//! # Architecture
//!
//! ```text
//! Construction            Tree               Consumers
//! ────────────────    ─────────────    ──────────────────────
//! Ast::int32      ─┐                ┌─> get_struct ─> JSON / YAML
//! Ast::binary_op  ─┼─> Ast arena ───┼─> structure_eq
//! Ast::function   ─┘  (node/)       └─> Writer ─────> Python
//!        │
//!        └── SymbolTable (name ─> NodeId, lexical scopes)
//! ```
//!
//! # Example
//!
//! ```
//! use arbor_ir::{Argument, Ast, FunctionPrototype, PythonWriter, Type};
//!
//! let mut ast = Ast::new();
//! let x = ast.argument(Argument::new("x", Type::INT32))?;
//! let y = ast.argument(Argument::new("y", Type::INT32))?;
//! let proto = ast.prototype(FunctionPrototype::new("add", vec![x, y], Type::INT32))?;
//!
//! let lhs = ast.variable("x", Type::INT32);
//! let rhs = ast.variable("y", Type::INT32);
//! let sum = ast.binary_op("+", lhs, rhs)?;
//! let ret = ast.function_return(Some(sum))?;
//! let body = ast.block("body", vec![ret])?;
//! let add = ast.function(proto, body)?;
//! let module = ast.module("main", vec![add])?;
//!
//! let source = PythonWriter::emit(&ast, module)?;
//! assert!(source.contains("def add(x: int, y: int) -> int:"));
//! assert!(source.contains("return x + y"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Invariants
//!
//! Every constructor on [`Ast`] validates before allocating: a failed call
//! returns a [`ConstructionError`] and leaves the tree unchanged. A node
//! has at most one parent, and a child slot only holds nodes allocated by
//! the same tree.

pub mod config;
pub mod error;
pub mod location;
pub mod modifiers;
pub mod node;
pub mod ops;
pub mod output;
pub mod registry;
pub mod repr;
pub mod symbols;
pub mod traits;
pub mod types;

// Re-exports: tree
pub use node::{
    Ancestors, Argument, Ast, BinaryOp, Block, ClassDecl, ClassDef, CollectionKind,
    CollectionLiteral, Comprehension, ComprehensionClause, ComprehensionKind, ForRangeStmt,
    ForStmt, FunctionCall, FunctionDef, FunctionPrototype, FunctionReturn, IfStmt, Literal,
    LiteralValue, MapLiteral, Module, Node, NodeData, NodeId, NodeKind, TypeCast, UnaryOp,
    Variable, VariableAssignment, VariableDeclaration, WhileStmt,
};

// Re-exports: types and attributes
pub use location::SourceLocation;
pub use modifiers::{Mutability, ScopeKind, Visibility};
pub use ops::{BinaryOperator, OperatorClass, UnaryOperator};
pub use types::{ComplexWidth, FloatWidth, IntWidth, Type, promote};

// Re-exports: errors
pub use error::{
    ConfigError, ConstructionError, NodeError, RenderError, ReprError, ScopeError, TypeError,
};

// Re-exports: structural export
pub use repr::{Fidelity, ReprStruct, StructureEq};

// Re-exports: scopes
pub use symbols::{ROOT_SCOPE, Scope, ScopeGuard, SymbolTable};

// Re-exports: config
pub use config::{PythonOptions, RenderConfig};

// Re-exports: output
pub use output::{Visitor, dispatch};
pub use registry::{register_writer, writer_for_extension, writer_for_language, writers};
pub use traits::Writer;

// Re-exports: built-in writers
#[cfg(feature = "write-python")]
pub use output::python::{PYTHON_WRITER, PythonWriter, PythonWriterImpl, type_hint};
