//! Python writer.
//!
//! Renders a tree as Python 3 source. Blocks are indented with
//! [`PythonOptions::indent`] spaces and empty blocks become `pass`.
//! Declared types become annotations unless [`PythonOptions::type_hints`]
//! is off.

use super::{Visitor, dispatch};
use crate::config::PythonOptions;
use crate::error::RenderError;
use crate::node::{
    Argument, Ast, BinaryOp, Block, ClassDecl, ClassDef, CollectionKind, CollectionLiteral,
    Comprehension, ComprehensionClause, ComprehensionKind, ForRangeStmt, ForStmt, FunctionCall,
    FunctionDef, FunctionPrototype, FunctionReturn, IfStmt, Literal, LiteralValue, MapLiteral,
    Module, NodeData, NodeId, NodeKind, TypeCast, UnaryOp, Variable, VariableAssignment,
    VariableDeclaration, WhileStmt,
};
use crate::ops::{BinaryOperator, UnaryOperator};
use crate::traits::Writer;
use crate::types::Type;
use std::collections::BTreeSet;

/// Static instance of the Python writer for registry.
pub static PYTHON_WRITER: PythonWriterImpl = PythonWriterImpl;

/// Python writer implementing the Writer trait.
pub struct PythonWriterImpl;

impl Writer for PythonWriterImpl {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extension(&self) -> &'static str {
        "py"
    }

    fn write(&self, ast: &Ast, root: NodeId) -> Result<String, RenderError> {
        PythonWriter::emit(ast, root)
    }
}

/// Names a rendered module refers to without defining them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Import {
    Datetime,
    Abc,
    Any,
}

impl Import {
    fn line(self) -> &'static str {
        match self {
            Import::Datetime => "import datetime",
            Import::Abc => "from abc import ABC",
            Import::Any => "from typing import Any",
        }
    }
}

/// Renders trees as Python source code.
#[derive(Debug, Clone, Default)]
pub struct PythonWriter {
    options: PythonOptions,
    // Filled while rendering; a module emits them as its header.
    imports: BTreeSet<Import>,
}

impl PythonWriter {
    pub fn new(options: PythonOptions) -> Self {
        Self {
            options,
            imports: BTreeSet::new(),
        }
    }

    /// Render with default options.
    pub fn emit(ast: &Ast, root: NodeId) -> Result<String, RenderError> {
        Self::default().render(ast, root)
    }

    /// Render the subtree at `root`. Module output ends with a newline.
    pub fn render(&mut self, ast: &Ast, root: NodeId) -> Result<String, RenderError> {
        let kind = ast.kind(root)?;
        tracing::debug!(%kind, root = root.index(), "rendering python");
        let mut out = dispatch(self, ast, root)?;
        if kind == NodeKind::Module && !out.is_empty() {
            out.push('\n');
        }
        tracing::debug!(bytes = out.len(), "rendered python");
        Ok(out)
    }

    fn indent_lines(&self, text: &str) -> String {
        let prefix = " ".repeat(self.options.indent);
        text.lines()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{prefix}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A statement preceded by its comment lines.
    fn statement(&mut self, ast: &Ast, id: NodeId) -> Result<String, RenderError> {
        let rendered = dispatch(self, ast, id)?;
        let comment = ast.node(id)?.comment();
        if comment.is_empty() {
            return Ok(rendered);
        }
        let mut out = String::new();
        for line in comment.lines() {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&rendered);
        Ok(out)
    }

    fn statements(&mut self, ast: &Ast, ids: &[NodeId]) -> Result<Vec<String>, RenderError> {
        ids.iter().map(|id| self.statement(ast, *id)).collect()
    }

    /// An indented block body.
    fn body(&mut self, ast: &Ast, block: NodeId) -> Result<String, RenderError> {
        let text = dispatch(self, ast, block)?;
        Ok(self.indent_lines(&text))
    }

    /// An operand, parenthesized when it is itself an operation.
    fn operand(&mut self, ast: &Ast, id: NodeId) -> Result<String, RenderError> {
        let text = dispatch(self, ast, id)?;
        Ok(match ast.kind(id)? {
            NodeKind::BinaryOp | NodeKind::UnaryOp => format!("({text})"),
            _ => text,
        })
    }

    fn list(&mut self, ast: &Ast, ids: &[NodeId]) -> Result<Vec<String>, RenderError> {
        ids.iter().map(|id| dispatch(self, ast, *id)).collect()
    }

    /// Loop targets render as bare names even when declared.
    fn target(&mut self, ast: &Ast, id: NodeId) -> Result<String, RenderError> {
        match ast.data(id)? {
            NodeData::Variable(v) => Ok(v.name.clone()),
            NodeData::VariableDeclaration(d) => Ok(d.name.clone()),
            _ => dispatch(self, ast, id),
        }
    }

    fn conditions(&mut self, ast: &Ast, ids: &[NodeId]) -> Result<String, RenderError> {
        if let [single] = ids {
            return dispatch(self, ast, *single);
        }
        let parts = ids
            .iter()
            .map(|id| self.operand(ast, *id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(" and "))
    }

    fn annotation(&mut self, ty: &Type) -> Option<String> {
        if !self.options.type_hints {
            return None;
        }
        self.note_type(ty);
        Some(type_hint(ty))
    }

    /// Record the imports a type hint depends on.
    fn note_type(&mut self, ty: &Type) {
        match ty {
            Type::Date | Type::Time | Type::DateTime | Type::Timestamp => {
                self.imports.insert(Import::Datetime);
            }
            Type::Any => {
                self.imports.insert(Import::Any);
            }
            Type::List(Some(t)) | Type::Set(Some(t)) => self.note_type(t),
            Type::Tuple(items) => items.iter().for_each(|t| self.note_type(t)),
            Type::Map(Some(kv)) => {
                self.note_type(&kv.0);
                self.note_type(&kv.1);
            }
            _ => {}
        }
    }

    /// The `else` block of an if statement when it holds only another if.
    fn elif_branch(ast: &Ast, else_: NodeId) -> Result<Option<NodeId>, RenderError> {
        if let NodeData::Block(block) = ast.data(else_)?
            && let &[only] = block.nodes.as_slice()
        {
            let node = ast.node(only)?;
            if node.kind() == NodeKind::IfStmt && node.comment().is_empty() {
                return Ok(Some(only));
            }
        }
        Ok(None)
    }

    fn class_header(
        &mut self,
        ast: &Ast,
        name: &str,
        bases: &[NodeId],
        decorators: &[NodeId],
        is_abstract: bool,
    ) -> Result<String, RenderError> {
        let mut out = String::new();
        for decorator in decorators {
            out.push('@');
            out.push_str(&dispatch(self, ast, *decorator)?);
            out.push('\n');
        }
        let mut bases = self.list(ast, bases)?;
        if is_abstract {
            self.imports.insert(Import::Abc);
            bases.push("ABC".to_string());
        }
        out.push_str("class ");
        out.push_str(name);
        if !bases.is_empty() {
            out.push('(');
            out.push_str(&bases.join(", "));
            out.push(')');
        }
        out.push(':');
        Ok(out)
    }
}

impl Visitor for PythonWriter {
    fn visit_literal(&mut self, _: &Ast, _: NodeId, node: &Literal) -> Result<String, RenderError> {
        Ok(match &node.value {
            LiteralValue::Bool(true) => "True".to_string(),
            LiteralValue::Bool(false) => "False".to_string(),
            LiteralValue::Int(i) => i.to_string(),
            LiteralValue::UInt(u) => u.to_string(),
            LiteralValue::Float(f) => float_literal(*f),
            LiteralValue::Complex { real, imag } => {
                format!("complex({}, {})", float_literal(*real), float_literal(*imag))
            }
            LiteralValue::Str(s) => quote(s),
            LiteralValue::Char(c) => quote(&c.to_string()),
            LiteralValue::Temporal(text) => {
                self.imports.insert(Import::Datetime);
                let ctor = match node.ty {
                    Type::Date => "datetime.date",
                    Type::Time => "datetime.time",
                    _ => "datetime.datetime",
                };
                format!("{ctor}.fromisoformat({})", quote(text))
            }
        })
    }

    fn visit_collection_literal(
        &mut self,
        ast: &Ast,
        _: NodeId,
        node: &CollectionLiteral,
    ) -> Result<String, RenderError> {
        let items = self.list(ast, &node.elements)?;
        Ok(match (node.kind, items.as_slice()) {
            (CollectionKind::List, _) => format!("[{}]", items.join(", ")),
            (CollectionKind::Set, []) => "set()".to_string(),
            (CollectionKind::Set, _) => format!("{{{}}}", items.join(", ")),
            (CollectionKind::Tuple, [single]) => format!("({single},)"),
            (CollectionKind::Tuple, _) => format!("({})", items.join(", ")),
        })
    }

    fn visit_map_literal(&mut self, ast: &Ast, _: NodeId, node: &MapLiteral) -> Result<String, RenderError> {
        let mut entries = Vec::with_capacity(node.entries.len());
        for (k, v) in &node.entries {
            entries.push(format!(
                "{}: {}",
                dispatch(self, ast, *k)?,
                dispatch(self, ast, *v)?
            ));
        }
        Ok(format!("{{{}}}", entries.join(", ")))
    }

    fn visit_variable(&mut self, _: &Ast, _: NodeId, node: &Variable) -> Result<String, RenderError> {
        Ok(node.name.clone())
    }

    fn visit_variable_declaration(
        &mut self,
        ast: &Ast,
        _: NodeId,
        node: &VariableDeclaration,
    ) -> Result<String, RenderError> {
        let value = node.value.map(|v| dispatch(self, ast, v)).transpose()?;
        Ok(match (self.annotation(&node.ty), value) {
            (Some(hint), Some(value)) => format!("{}: {hint} = {value}", node.name),
            (Some(hint), None) => format!("{}: {hint}", node.name),
            (None, Some(value)) => format!("{} = {value}", node.name),
            (None, None) => format!("{} = None", node.name),
        })
    }

    fn visit_variable_assignment(
        &mut self,
        ast: &Ast,
        _: NodeId,
        node: &VariableAssignment,
    ) -> Result<String, RenderError> {
        Ok(format!("{} = {}", node.name, dispatch(self, ast, node.value)?))
    }

    fn visit_unary_op(&mut self, ast: &Ast, _: NodeId, node: &UnaryOp) -> Result<String, RenderError> {
        let operand = self.operand(ast, node.operand)?;
        Ok(match node.op {
            UnaryOperator::Not => format!("not {operand}"),
            op => format!("{}{operand}", op.token()),
        })
    }

    fn visit_binary_op(&mut self, ast: &Ast, _: NodeId, node: &BinaryOp) -> Result<String, RenderError> {
        let lhs = self.operand(ast, node.lhs)?;
        let rhs = self.operand(ast, node.rhs)?;
        let op = match node.op {
            BinaryOperator::Xor => "^",
            op => op.token(),
        };
        Ok(format!("{lhs} {op} {rhs}"))
    }

    fn visit_type_cast(&mut self, ast: &Ast, _: NodeId, node: &TypeCast) -> Result<String, RenderError> {
        let expr = dispatch(self, ast, node.expr)?;
        let ctor = match &node.target {
            Type::Boolean => "bool",
            Type::Int { .. } => "int",
            Type::Float { .. } => "float",
            Type::Complex { .. } => "complex",
            Type::String | Type::Utf8String | Type::Utf8Char => "str",
            Type::List(_) => "list",
            Type::Set(_) => "set",
            Type::Tuple(_) => "tuple",
            Type::Map(_) => "dict",
            Type::Date | Type::Time | Type::DateTime | Type::Timestamp | Type::Null | Type::Any => {
                return Ok(expr);
            }
        };
        Ok(format!("{ctor}({expr})"))
    }

    fn visit_block(&mut self, ast: &Ast, _: NodeId, node: &Block) -> Result<String, RenderError> {
        if node.nodes.is_empty() {
            return Ok("pass".to_string());
        }
        Ok(self.statements(ast, &node.nodes)?.join("\n"))
    }

    fn visit_module(&mut self, ast: &Ast, _: NodeId, node: &Module) -> Result<String, RenderError> {
        self.imports.clear();
        let body = self.statements(ast, &node.nodes)?.join("\n");
        if self.imports.is_empty() {
            return Ok(body);
        }
        let header = self
            .imports
            .iter()
            .map(|import| import.line())
            .collect::<Vec<_>>()
            .join("\n");
        if body.is_empty() {
            return Ok(header);
        }
        Ok(format!("{header}\n\n{body}"))
    }

    fn visit_argument(&mut self, ast: &Ast, _: NodeId, node: &Argument) -> Result<String, RenderError> {
        let default = node.default.map(|d| dispatch(self, ast, d)).transpose()?;
        Ok(match (self.annotation(&node.ty), default) {
            (Some(hint), Some(default)) => format!("{}: {hint} = {default}", node.name),
            (Some(hint), None) => format!("{}: {hint}", node.name),
            (None, Some(default)) => format!("{}={default}", node.name),
            (None, None) => node.name.clone(),
        })
    }

    fn visit_function_prototype(
        &mut self,
        ast: &Ast,
        id: NodeId,
        node: &FunctionPrototype,
    ) -> Result<String, RenderError> {
        let is_method = ast
            .parent(id)?
            .and_then(|def| ast.parent(def).ok().flatten())
            .is_some_and(|owner| ast.kind(owner).is_ok_and(|k| k == NodeKind::ClassDef));

        let mut params = Vec::with_capacity(node.args.len() + 1);
        if is_method {
            params.push("self".to_string());
        }
        params.extend(self.list(ast, &node.args)?);

        let mut out = format!("def {}({})", node.name, params.join(", "));
        if let Some(hint) = self.annotation(&node.return_type) {
            out.push_str(" -> ");
            out.push_str(&hint);
        }
        Ok(out)
    }

    fn visit_function_def(&mut self, ast: &Ast, _: NodeId, node: &FunctionDef) -> Result<String, RenderError> {
        let signature = dispatch(self, ast, node.prototype)?;
        Ok(format!("{signature}:\n{}", self.body(ast, node.body)?))
    }

    fn visit_function_call(&mut self, ast: &Ast, _: NodeId, node: &FunctionCall) -> Result<String, RenderError> {
        let args = self.list(ast, &node.args)?;
        Ok(format!("{}({})", node.callee, args.join(", ")))
    }

    fn visit_function_return(
        &mut self,
        ast: &Ast,
        _: NodeId,
        node: &FunctionReturn,
    ) -> Result<String, RenderError> {
        match node.value {
            Some(value) => Ok(format!("return {}", dispatch(self, ast, value)?)),
            None => Ok("return".to_string()),
        }
    }

    fn visit_if_stmt(&mut self, ast: &Ast, _: NodeId, node: &IfStmt) -> Result<String, RenderError> {
        let condition = dispatch(self, ast, node.condition)?;
        let mut out = format!("if {condition}:\n{}", self.body(ast, node.then)?);
        if let Some(else_) = node.else_ {
            match Self::elif_branch(ast, else_)? {
                Some(nested) => {
                    out.push_str("\nel");
                    out.push_str(&dispatch(self, ast, nested)?);
                }
                None => {
                    out.push_str("\nelse:\n");
                    out.push_str(&self.body(ast, else_)?);
                }
            }
        }
        Ok(out)
    }

    fn visit_while_stmt(&mut self, ast: &Ast, _: NodeId, node: &WhileStmt) -> Result<String, RenderError> {
        let condition = dispatch(self, ast, node.condition)?;
        Ok(format!("while {condition}:\n{}", self.body(ast, node.body)?))
    }

    fn visit_for_stmt(&mut self, ast: &Ast, _: NodeId, node: &ForStmt) -> Result<String, RenderError> {
        let target = self.target(ast, node.target)?;
        let iterable = dispatch(self, ast, node.iterable)?;
        let mut body = self.body(ast, node.body)?;
        if !node.conditions.is_empty() {
            let filter = self.conditions(ast, &node.conditions)?;
            body = self.indent_lines(&format!("if {filter}:\n{body}"));
        }
        Ok(format!("for {target} in {iterable}:\n{body}"))
    }

    fn visit_for_range_stmt(&mut self, ast: &Ast, _: NodeId, node: &ForRangeStmt) -> Result<String, RenderError> {
        let variable = self.target(ast, node.variable)?;
        let mut bounds = vec![
            dispatch(self, ast, node.start)?,
            dispatch(self, ast, node.end)?,
        ];
        if let Some(step) = node.step {
            bounds.push(dispatch(self, ast, step)?);
        }
        Ok(format!(
            "for {variable} in range({}):\n{}",
            bounds.join(", "),
            self.body(ast, node.body)?
        ))
    }

    fn visit_break(&mut self, _: &Ast, _: NodeId) -> Result<String, RenderError> {
        Ok("break".to_string())
    }

    fn visit_continue(&mut self, _: &Ast, _: NodeId) -> Result<String, RenderError> {
        Ok("continue".to_string())
    }

    fn visit_comprehension_clause(
        &mut self,
        ast: &Ast,
        _: NodeId,
        node: &ComprehensionClause,
    ) -> Result<String, RenderError> {
        let target = self.target(ast, node.target)?;
        let iterable = dispatch(self, ast, node.iterable)?;
        let mut out = if node.is_async {
            format!("async for {target} in {iterable}")
        } else {
            format!("for {target} in {iterable}")
        };
        for condition in &node.conditions {
            out.push_str(" if ");
            out.push_str(&dispatch(self, ast, *condition)?);
        }
        Ok(out)
    }

    fn visit_comprehension(&mut self, ast: &Ast, _: NodeId, node: &Comprehension) -> Result<String, RenderError> {
        let mut inner = dispatch(self, ast, node.element)?;
        for clause in &node.generators {
            inner.push(' ');
            inner.push_str(&dispatch(self, ast, *clause)?);
        }
        Ok(match node.kind {
            ComprehensionKind::List => format!("[{inner}]"),
            ComprehensionKind::Set => format!("{{{inner}}}"),
            ComprehensionKind::Generator => format!("({inner})"),
        })
    }

    fn visit_class_decl(&mut self, ast: &Ast, _: NodeId, node: &ClassDecl) -> Result<String, RenderError> {
        let header = self.class_header(ast, &node.name, &node.bases, &node.decorators, node.is_abstract)?;
        Ok(format!("{header}\n{}", self.indent_lines("pass")))
    }

    fn visit_class_def(&mut self, ast: &Ast, _: NodeId, node: &ClassDef) -> Result<String, RenderError> {
        let header = self.class_header(ast, &node.name, &node.bases, &node.decorators, node.is_abstract)?;

        let mut members = self.statements(ast, &node.attributes)?;
        for method in &node.methods {
            if !members.is_empty() {
                members.push(String::new());
            }
            members.push(self.statement(ast, *method)?);
        }
        if members.is_empty() {
            members.push("pass".to_string());
        }
        Ok(format!("{header}\n{}", self.indent_lines(&members.join("\n"))))
    }
}

/// Python annotation for a type.
pub fn type_hint(ty: &Type) -> String {
    match ty {
        Type::Boolean => "bool".to_string(),
        Type::Int { .. } => "int".to_string(),
        Type::Float { .. } => "float".to_string(),
        Type::Complex { .. } => "complex".to_string(),
        Type::Date => "datetime.date".to_string(),
        Type::Time => "datetime.time".to_string(),
        Type::DateTime | Type::Timestamp => "datetime.datetime".to_string(),
        Type::String | Type::Utf8String | Type::Utf8Char => "str".to_string(),
        Type::List(None) => "list".to_string(),
        Type::List(Some(t)) => format!("list[{}]", type_hint(t)),
        Type::Set(None) => "set".to_string(),
        Type::Set(Some(t)) => format!("set[{}]", type_hint(t)),
        Type::Tuple(items) if items.is_empty() => "tuple".to_string(),
        Type::Tuple(items) => format!(
            "tuple[{}]",
            items.iter().map(type_hint).collect::<Vec<_>>().join(", ")
        ),
        Type::Map(None) => "dict".to_string(),
        Type::Map(Some(kv)) => format!("dict[{}, {}]", type_hint(&kv.0), type_hint(&kv.1)),
        Type::Null => "None".to_string(),
        Type::Any => "Any".to_string(),
    }
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "float('nan')".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "float('inf')".to_string()
        } else {
            "float('-inf')".to_string()
        }
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else if f.fract() == 0.0 {
        format!("{f:e}")
    } else {
        f.to_string()
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
