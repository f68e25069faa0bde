//! Output writers - render trees as source code.
//!
//! A writer implements [`Visitor`]: one method per node kind, each returning
//! the rendered text of that node. Kinds a writer has no rule for fall back
//! to [`RenderError::UnsupportedNode`]. [`dispatch`] routes a node id to the
//! matching method, so writers recurse through it rather than matching on
//! payloads themselves.

#[cfg(feature = "write-python")]
pub mod python;

#[cfg(feature = "write-python")]
pub use python::{PYTHON_WRITER, PythonWriter, PythonWriterImpl};

use crate::error::RenderError;
use crate::node::{
    Argument, Ast, BinaryOp, Block, ClassDecl, ClassDef, CollectionLiteral, Comprehension,
    ComprehensionClause, ForRangeStmt, ForStmt, FunctionCall, FunctionDef, FunctionPrototype,
    FunctionReturn, IfStmt, Literal, MapLiteral, Module, NodeData, NodeId, NodeKind, TypeCast,
    UnaryOp, Variable, VariableAssignment, VariableDeclaration, WhileStmt,
};

fn unsupported(kind: NodeKind) -> Result<String, RenderError> {
    Err(RenderError::UnsupportedNode { kind })
}

/// Per-kind rendering rules.
///
/// Every method receives the tree, the node id and its payload. Statement
/// methods return their lines without leading indentation; the enclosing
/// block is responsible for indenting them.
#[allow(unused_variables)]
pub trait Visitor {
    fn visit_literal(&mut self, ast: &Ast, id: NodeId, node: &Literal) -> Result<String, RenderError> {
        unsupported(NodeKind::Literal)
    }

    fn visit_collection_literal(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &CollectionLiteral,
    ) -> Result<String, RenderError> {
        unsupported(NodeKind::CollectionLiteral)
    }

    fn visit_map_literal(&mut self, ast: &Ast, id: NodeId, node: &MapLiteral) -> Result<String, RenderError> {
        unsupported(NodeKind::MapLiteral)
    }

    fn visit_variable(&mut self, ast: &Ast, id: NodeId, node: &Variable) -> Result<String, RenderError> {
        unsupported(NodeKind::Variable)
    }

    fn visit_variable_declaration(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &VariableDeclaration,
    ) -> Result<String, RenderError> {
        unsupported(NodeKind::VariableDeclaration)
    }

    fn visit_variable_assignment(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &VariableAssignment,
    ) -> Result<String, RenderError> {
        unsupported(NodeKind::VariableAssignment)
    }

    fn visit_unary_op(&mut self, ast: &Ast, id: NodeId, node: &UnaryOp) -> Result<String, RenderError> {
        unsupported(NodeKind::UnaryOp)
    }

    fn visit_binary_op(&mut self, ast: &Ast, id: NodeId, node: &BinaryOp) -> Result<String, RenderError> {
        unsupported(NodeKind::BinaryOp)
    }

    fn visit_type_cast(&mut self, ast: &Ast, id: NodeId, node: &TypeCast) -> Result<String, RenderError> {
        unsupported(NodeKind::TypeCast)
    }

    fn visit_block(&mut self, ast: &Ast, id: NodeId, node: &Block) -> Result<String, RenderError> {
        unsupported(NodeKind::Block)
    }

    fn visit_module(&mut self, ast: &Ast, id: NodeId, node: &Module) -> Result<String, RenderError> {
        unsupported(NodeKind::Module)
    }

    fn visit_argument(&mut self, ast: &Ast, id: NodeId, node: &Argument) -> Result<String, RenderError> {
        unsupported(NodeKind::Argument)
    }

    fn visit_function_prototype(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &FunctionPrototype,
    ) -> Result<String, RenderError> {
        unsupported(NodeKind::FunctionPrototype)
    }

    fn visit_function_def(&mut self, ast: &Ast, id: NodeId, node: &FunctionDef) -> Result<String, RenderError> {
        unsupported(NodeKind::FunctionDef)
    }

    fn visit_function_call(&mut self, ast: &Ast, id: NodeId, node: &FunctionCall) -> Result<String, RenderError> {
        unsupported(NodeKind::FunctionCall)
    }

    fn visit_function_return(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &FunctionReturn,
    ) -> Result<String, RenderError> {
        unsupported(NodeKind::FunctionReturn)
    }

    fn visit_if_stmt(&mut self, ast: &Ast, id: NodeId, node: &IfStmt) -> Result<String, RenderError> {
        unsupported(NodeKind::IfStmt)
    }

    fn visit_while_stmt(&mut self, ast: &Ast, id: NodeId, node: &WhileStmt) -> Result<String, RenderError> {
        unsupported(NodeKind::WhileStmt)
    }

    fn visit_for_stmt(&mut self, ast: &Ast, id: NodeId, node: &ForStmt) -> Result<String, RenderError> {
        unsupported(NodeKind::ForStmt)
    }

    fn visit_for_range_stmt(&mut self, ast: &Ast, id: NodeId, node: &ForRangeStmt) -> Result<String, RenderError> {
        unsupported(NodeKind::ForRangeStmt)
    }

    fn visit_break(&mut self, ast: &Ast, id: NodeId) -> Result<String, RenderError> {
        unsupported(NodeKind::Break)
    }

    fn visit_continue(&mut self, ast: &Ast, id: NodeId) -> Result<String, RenderError> {
        unsupported(NodeKind::Continue)
    }

    fn visit_comprehension_clause(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &ComprehensionClause,
    ) -> Result<String, RenderError> {
        unsupported(NodeKind::ComprehensionClause)
    }

    fn visit_comprehension(&mut self, ast: &Ast, id: NodeId, node: &Comprehension) -> Result<String, RenderError> {
        unsupported(NodeKind::Comprehension)
    }

    fn visit_class_decl(&mut self, ast: &Ast, id: NodeId, node: &ClassDecl) -> Result<String, RenderError> {
        unsupported(NodeKind::ClassDecl)
    }

    fn visit_class_def(&mut self, ast: &Ast, id: NodeId, node: &ClassDef) -> Result<String, RenderError> {
        unsupported(NodeKind::ClassDef)
    }
}

/// Render `id` with the visitor method for its kind.
pub fn dispatch<V: Visitor + ?Sized>(
    visitor: &mut V,
    ast: &Ast,
    id: NodeId,
) -> Result<String, RenderError> {
    match ast.data(id)? {
        NodeData::Literal(n) => visitor.visit_literal(ast, id, n),
        NodeData::CollectionLiteral(n) => visitor.visit_collection_literal(ast, id, n),
        NodeData::MapLiteral(n) => visitor.visit_map_literal(ast, id, n),
        NodeData::Variable(n) => visitor.visit_variable(ast, id, n),
        NodeData::VariableDeclaration(n) => visitor.visit_variable_declaration(ast, id, n),
        NodeData::VariableAssignment(n) => visitor.visit_variable_assignment(ast, id, n),
        NodeData::UnaryOp(n) => visitor.visit_unary_op(ast, id, n),
        NodeData::BinaryOp(n) => visitor.visit_binary_op(ast, id, n),
        NodeData::TypeCast(n) => visitor.visit_type_cast(ast, id, n),
        NodeData::Block(n) => visitor.visit_block(ast, id, n),
        NodeData::Module(n) => visitor.visit_module(ast, id, n),
        NodeData::Argument(n) => visitor.visit_argument(ast, id, n),
        NodeData::FunctionPrototype(n) => visitor.visit_function_prototype(ast, id, n),
        NodeData::FunctionDef(n) => visitor.visit_function_def(ast, id, n),
        NodeData::FunctionCall(n) => visitor.visit_function_call(ast, id, n),
        NodeData::FunctionReturn(n) => visitor.visit_function_return(ast, id, n),
        NodeData::IfStmt(n) => visitor.visit_if_stmt(ast, id, n),
        NodeData::WhileStmt(n) => visitor.visit_while_stmt(ast, id, n),
        NodeData::ForStmt(n) => visitor.visit_for_stmt(ast, id, n),
        NodeData::ForRangeStmt(n) => visitor.visit_for_range_stmt(ast, id, n),
        NodeData::Break => visitor.visit_break(ast, id),
        NodeData::Continue => visitor.visit_continue(ast, id),
        NodeData::ComprehensionClause(n) => visitor.visit_comprehension_clause(ast, id, n),
        NodeData::Comprehension(n) => visitor.visit_comprehension(ast, id, n),
        NodeData::ClassDecl(n) => visitor.visit_class_decl(ast, id, n),
        NodeData::ClassDef(n) => visitor.visit_class_def(ast, id, n),
    }
}
