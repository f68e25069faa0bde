//! Validated node constructors.
//!
//! Each constructor checks its inputs before anything is stored, so a
//! failed call leaves the tree exactly as it was. Child ids passed in are
//! attached to the new node on success.

use super::{
    Argument, Ast, BinaryOp, Block, ClassDecl, ClassDef, CollectionKind, CollectionLiteral,
    Comprehension, ComprehensionClause, ComprehensionKind, ForRangeStmt, ForStmt, FunctionCall,
    FunctionDef, FunctionPrototype, FunctionReturn, IfStmt, Literal, LiteralValue, MapLiteral,
    Module, NodeData, NodeId, NodeKind, TypeCast, UnaryOp, Variable, VariableAssignment,
    VariableDeclaration, WhileStmt,
};
use crate::error::{ConstructionError, TypeError};
use crate::ops::{BinaryOperator, OperatorClass, UnaryOperator};
use crate::types::{Type, promote};

impl Ast {
    fn build(
        &mut self,
        make: impl FnOnce(&Self) -> Result<NodeData, ConstructionError>,
    ) -> Result<NodeId, ConstructionError> {
        let loc = self.take_location();
        let data = make(self)?;
        self.alloc(loc, data)
    }

    fn expr_type(&self, id: NodeId) -> Result<Type, ConstructionError> {
        let node = self.node(id)?;
        node.data
            .value_type()
            .cloned()
            .ok_or(ConstructionError::NotAnExpression { kind: node.kind() })
    }

    fn expect_kind(
        &self,
        id: NodeId,
        slot: &'static str,
        kind: NodeKind,
        expected: &'static str,
    ) -> Result<(), ConstructionError> {
        let found = self.kind(id)?;
        if found != kind {
            return Err(ConstructionError::UnexpectedKind {
                slot,
                expected,
                found,
            });
        }
        Ok(())
    }

    fn expect_block(&self, id: NodeId, slot: &'static str) -> Result<(), ConstructionError> {
        self.expect_kind(id, slot, NodeKind::Block, "Block")
    }

    fn expect_condition(&self, id: NodeId) -> Result<(), ConstructionError> {
        let ty = self.expr_type(id)?;
        if ty.is_boolean() || ty.is_any() {
            Ok(())
        } else {
            Err(TypeError::NonBoolean(ty).into())
        }
    }

    fn expect_conditions(&self, ids: &[NodeId]) -> Result<(), ConstructionError> {
        ids.iter().try_for_each(|id| self.expect_condition(*id))
    }

    /// Checks a loop target against the iterable's element type.
    fn expect_target(&self, target: NodeId, element: &Type) -> Result<(), ConstructionError> {
        let (name, declared) = match self.data(target)? {
            NodeData::Variable(v) => (&v.name, &v.ty),
            NodeData::VariableDeclaration(d) if d.value.is_none() => (&d.name, &d.ty),
            other => {
                return Err(ConstructionError::UnexpectedKind {
                    slot: "target",
                    expected: "Variable",
                    found: other.kind(),
                });
            }
        };
        if !declared.accepts(element) {
            return Err(ConstructionError::TypeMismatch {
                name: name.clone(),
                declared: declared.clone(),
                found: element.clone(),
            });
        }
        Ok(())
    }

    fn expect_integer(&self, id: NodeId) -> Result<Type, ConstructionError> {
        let ty = self.expr_type(id)?;
        if ty.is_integer() || ty.is_any() {
            Ok(ty)
        } else {
            Err(TypeError::NonInteger(ty).into())
        }
    }

    fn expr_types(&self, ids: &[NodeId]) -> Result<Vec<Type>, ConstructionError> {
        ids.iter().map(|id| self.expr_type(*id)).collect()
    }

    // Leaves

    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.literal_leaf(LiteralValue::Bool(value), Type::Boolean)
    }

    pub fn int8(&mut self, value: i8) -> NodeId {
        self.literal_leaf(LiteralValue::Int(value.into()), Type::INT8)
    }

    pub fn int16(&mut self, value: i16) -> NodeId {
        self.literal_leaf(LiteralValue::Int(value.into()), Type::INT16)
    }

    pub fn int32(&mut self, value: i32) -> NodeId {
        self.literal_leaf(LiteralValue::Int(value.into()), Type::INT32)
    }

    pub fn int64(&mut self, value: i64) -> NodeId {
        self.literal_leaf(LiteralValue::Int(value.into()), Type::INT64)
    }

    pub fn int128(&mut self, value: i128) -> NodeId {
        self.literal_leaf(LiteralValue::Int(value), Type::INT128)
    }

    pub fn uint8(&mut self, value: u8) -> NodeId {
        self.literal_leaf(LiteralValue::UInt(value.into()), Type::UINT8)
    }

    pub fn uint16(&mut self, value: u16) -> NodeId {
        self.literal_leaf(LiteralValue::UInt(value.into()), Type::UINT16)
    }

    pub fn uint32(&mut self, value: u32) -> NodeId {
        self.literal_leaf(LiteralValue::UInt(value.into()), Type::UINT32)
    }

    pub fn uint64(&mut self, value: u64) -> NodeId {
        self.literal_leaf(LiteralValue::UInt(value.into()), Type::UINT64)
    }

    pub fn uint128(&mut self, value: u128) -> NodeId {
        self.literal_leaf(LiteralValue::UInt(value), Type::UINT128)
    }

    pub fn float32(&mut self, value: f32) -> NodeId {
        self.literal_leaf(LiteralValue::Float(value.into()), Type::FLOAT32)
    }

    pub fn float64(&mut self, value: f64) -> NodeId {
        self.literal_leaf(LiteralValue::Float(value), Type::FLOAT64)
    }

    pub fn string(&mut self, value: impl Into<String>) -> NodeId {
        self.literal_leaf(LiteralValue::Str(value.into()), Type::String)
    }

    pub fn utf8_string(&mut self, value: impl Into<String>) -> NodeId {
        self.literal_leaf(LiteralValue::Str(value.into()), Type::Utf8String)
    }

    pub fn utf8_char(&mut self, value: char) -> NodeId {
        self.literal_leaf(LiteralValue::Char(value), Type::Utf8Char)
    }

    pub fn variable(&mut self, name: impl Into<String>, ty: Type) -> NodeId {
        self.alloc_leaf(NodeData::Variable(Variable {
            name: name.into(),
            ty,
        }))
    }

    pub fn break_stmt(&mut self) -> NodeId {
        self.alloc_leaf(NodeData::Break)
    }

    pub fn continue_stmt(&mut self) -> NodeId {
        self.alloc_leaf(NodeData::Continue)
    }

    fn literal_leaf(&mut self, value: LiteralValue, ty: Type) -> NodeId {
        self.alloc_leaf(NodeData::Literal(Literal { value, ty }))
    }

    // Literals checked against their type

    pub fn literal(&mut self, value: LiteralValue, ty: Type) -> Result<NodeId, ConstructionError> {
        self.build(|_| {
            validate_literal(&value, &ty)?;
            Ok(NodeData::Literal(Literal { value, ty }))
        })
    }

    pub fn int(&mut self, value: i128, ty: Type) -> Result<NodeId, ConstructionError> {
        self.literal(LiteralValue::Int(value), ty)
    }

    pub fn uint(&mut self, value: u128, ty: Type) -> Result<NodeId, ConstructionError> {
        self.literal(LiteralValue::UInt(value), ty)
    }

    pub fn float(&mut self, value: f64, ty: Type) -> Result<NodeId, ConstructionError> {
        self.literal(LiteralValue::Float(value), ty)
    }

    pub fn complex(&mut self, real: f64, imag: f64, ty: Type) -> Result<NodeId, ConstructionError> {
        self.literal(LiteralValue::Complex { real, imag }, ty)
    }

    /// `YYYY-MM-DD`
    pub fn date(&mut self, text: impl Into<String>) -> Result<NodeId, ConstructionError> {
        self.literal(LiteralValue::Temporal(text.into()), Type::Date)
    }

    /// `HH:MM:SS[.fraction]`
    pub fn time(&mut self, text: impl Into<String>) -> Result<NodeId, ConstructionError> {
        self.literal(LiteralValue::Temporal(text.into()), Type::Time)
    }

    /// `YYYY-MM-DDTHH:MM:SS[.fraction]`
    pub fn datetime(&mut self, text: impl Into<String>) -> Result<NodeId, ConstructionError> {
        self.literal(LiteralValue::Temporal(text.into()), Type::DateTime)
    }

    /// `YYYY-MM-DD HH:MM:SS[.fraction]`
    pub fn timestamp(&mut self, text: impl Into<String>) -> Result<NodeId, ConstructionError> {
        self.literal(LiteralValue::Temporal(text.into()), Type::Timestamp)
    }

    pub fn list_literal(&mut self, elements: Vec<NodeId>) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let types = ast.expr_types(&elements)?;
            Ok(NodeData::CollectionLiteral(CollectionLiteral {
                kind: CollectionKind::List,
                ty: Type::List(common_type(types).map(Box::new)),
                elements,
            }))
        })
    }

    pub fn set_literal(&mut self, elements: Vec<NodeId>) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let types = ast.expr_types(&elements)?;
            Ok(NodeData::CollectionLiteral(CollectionLiteral {
                kind: CollectionKind::Set,
                ty: Type::Set(common_type(types).map(Box::new)),
                elements,
            }))
        })
    }

    pub fn tuple_literal(&mut self, elements: Vec<NodeId>) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let types = ast.expr_types(&elements)?;
            Ok(NodeData::CollectionLiteral(CollectionLiteral {
                kind: CollectionKind::Tuple,
                ty: Type::Tuple(types),
                elements,
            }))
        })
    }

    pub fn map_literal(
        &mut self,
        entries: Vec<(NodeId, NodeId)>,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let mut keys = Vec::with_capacity(entries.len());
            let mut values = Vec::with_capacity(entries.len());
            for (k, v) in &entries {
                keys.push(ast.expr_type(*k)?);
                values.push(ast.expr_type(*v)?);
            }
            let ty = match (common_type(keys), common_type(values)) {
                (Some(k), Some(v)) => Type::map(k, v),
                _ => Type::Map(None),
            };
            Ok(NodeData::MapLiteral(MapLiteral { entries, ty }))
        })
    }

    // Variables

    pub fn declare(&mut self, decl: VariableDeclaration) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            if let Some(value) = decl.value {
                let found = ast.expr_type(value)?;
                if !decl.ty.accepts(&found) {
                    return Err(ConstructionError::TypeMismatch {
                        name: decl.name.clone(),
                        declared: decl.ty.clone(),
                        found,
                    });
                }
            }
            Ok(NodeData::VariableDeclaration(decl))
        })
    }

    pub fn assign(
        &mut self,
        name: impl Into<String>,
        value: NodeId,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            ast.expr_type(value)?;
            Ok(NodeData::VariableAssignment(VariableAssignment {
                name: name.into(),
                value,
            }))
        })
    }

    // Operators

    pub fn unary_op(&mut self, op: &str, operand: NodeId) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let op = UnaryOperator::from_token(op)?;
            let ty = unary_result(op, &ast.expr_type(operand)?)?;
            Ok(NodeData::UnaryOp(UnaryOp { op, operand, ty }))
        })
    }

    pub fn binary_op(
        &mut self,
        op: &str,
        lhs: NodeId,
        rhs: NodeId,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let op = BinaryOperator::from_token(op)?;
            let ty = binary_result(op, &ast.expr_type(lhs)?, &ast.expr_type(rhs)?)?;
            Ok(NodeData::BinaryOp(BinaryOp { op, lhs, rhs, ty }))
        })
    }

    pub fn cast(&mut self, expr: NodeId, target: Type) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            ast.expr_type(expr)?;
            Ok(NodeData::TypeCast(TypeCast { expr, target }))
        })
    }

    // Blocks

    pub fn block(
        &mut self,
        name: impl Into<String>,
        nodes: Vec<NodeId>,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            for id in &nodes {
                check_statement(ast.kind(*id)?)?;
            }
            Ok(NodeData::Block(Block {
                name: name.into(),
                nodes,
            }))
        })
    }

    pub fn module(
        &mut self,
        name: impl Into<String>,
        nodes: Vec<NodeId>,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            for id in &nodes {
                check_statement(ast.kind(*id)?)?;
            }
            Ok(NodeData::Module(Module {
                name: name.into(),
                nodes,
            }))
        })
    }

    // Functions

    pub fn argument(&mut self, arg: Argument) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            if let Some(default) = arg.default {
                let found = ast.expr_type(default)?;
                if !arg.ty.accepts(&found) {
                    return Err(ConstructionError::TypeMismatch {
                        name: arg.name.clone(),
                        declared: arg.ty.clone(),
                        found,
                    });
                }
            }
            Ok(NodeData::Argument(arg))
        })
    }

    pub fn prototype(&mut self, proto: FunctionPrototype) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            for arg in &proto.args {
                ast.expect_kind(*arg, "args", NodeKind::Argument, "Argument")?;
            }
            Ok(NodeData::FunctionPrototype(proto))
        })
    }

    pub fn function(
        &mut self,
        prototype: NodeId,
        body: NodeId,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            ast.expect_kind(
                prototype,
                "prototype",
                NodeKind::FunctionPrototype,
                "FunctionPrototype",
            )?;
            ast.expect_block(body, "body")?;
            Ok(NodeData::FunctionDef(FunctionDef { prototype, body }))
        })
    }

    /// Call a function defined in this tree, checking arity and argument types.
    pub fn call(
        &mut self,
        function: NodeId,
        args: Vec<NodeId>,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let proto = match ast.data(function)? {
                NodeData::FunctionDef(def) => match ast.data(def.prototype)? {
                    NodeData::FunctionPrototype(p) => p,
                    other => {
                        return Err(ConstructionError::UnexpectedKind {
                            slot: "prototype",
                            expected: "FunctionPrototype",
                            found: other.kind(),
                        });
                    }
                },
                NodeData::FunctionPrototype(p) => p,
                other => {
                    return Err(ConstructionError::UnexpectedKind {
                        slot: "function",
                        expected: "FunctionDef",
                        found: other.kind(),
                    });
                }
            };

            let mut params = Vec::with_capacity(proto.args.len());
            for id in &proto.args {
                if let NodeData::Argument(arg) = ast.data(*id)? {
                    params.push(arg);
                }
            }
            let required = params.iter().filter(|p| p.default.is_none()).count();
            if args.len() < required || args.len() > params.len() {
                return Err(ConstructionError::Arity {
                    name: proto.name.clone(),
                    expected: params.len(),
                    found: args.len(),
                });
            }
            for (param, arg) in params.iter().zip(&args) {
                let found = ast.expr_type(*arg)?;
                if !param.ty.accepts(&found) {
                    return Err(ConstructionError::TypeMismatch {
                        name: param.name.clone(),
                        declared: param.ty.clone(),
                        found,
                    });
                }
            }

            Ok(NodeData::FunctionCall(FunctionCall {
                callee: proto.name.clone(),
                ty: proto.return_type.clone(),
                args,
            }))
        })
    }

    /// Call a function by name without a definition to check against.
    pub fn call_named(
        &mut self,
        callee: impl Into<String>,
        args: Vec<NodeId>,
        ty: Type,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            ast.expr_types(&args)?;
            Ok(NodeData::FunctionCall(FunctionCall {
                callee: callee.into(),
                args,
                ty,
            }))
        })
    }

    pub fn function_return(&mut self, value: Option<NodeId>) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            if let Some(value) = value {
                ast.expr_type(value)?;
            }
            Ok(NodeData::FunctionReturn(FunctionReturn { value }))
        })
    }

    // Control flow

    pub fn if_stmt(
        &mut self,
        condition: NodeId,
        then: NodeId,
        else_: Option<NodeId>,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            ast.expect_condition(condition)?;
            ast.expect_block(then, "then")?;
            if let Some(else_) = else_ {
                ast.expect_block(else_, "else")?;
            }
            Ok(NodeData::IfStmt(IfStmt {
                condition,
                then,
                else_,
            }))
        })
    }

    pub fn while_stmt(
        &mut self,
        condition: NodeId,
        body: NodeId,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            ast.expect_condition(condition)?;
            ast.expect_block(body, "body")?;
            Ok(NodeData::WhileStmt(WhileStmt { condition, body }))
        })
    }

    pub fn for_stmt(
        &mut self,
        target: NodeId,
        iterable: NodeId,
        conditions: Vec<NodeId>,
        body: NodeId,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let element = element_type(&ast.expr_type(iterable)?)?;
            ast.expect_target(target, &element)?;
            ast.expect_conditions(&conditions)?;
            ast.expect_block(body, "body")?;
            Ok(NodeData::ForStmt(ForStmt {
                target,
                iterable,
                conditions,
                body,
            }))
        })
    }

    /// Counted loop over `start..end` by `step`.
    ///
    /// `variable` must be a `VariableDeclaration` without an initializer,
    /// declared with an integer type that accepts every bound.
    pub fn for_range(
        &mut self,
        variable: NodeId,
        start: NodeId,
        end: NodeId,
        step: Option<NodeId>,
        body: NodeId,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let (name, declared) = match ast.data(variable)? {
                NodeData::VariableDeclaration(d) if d.value.is_none() => (&d.name, &d.ty),
                other => {
                    return Err(ConstructionError::UnexpectedKind {
                        slot: "variable",
                        expected: "VariableDeclaration without a value",
                        found: other.kind(),
                    });
                }
            };
            if !declared.is_integer() && !declared.is_any() {
                return Err(TypeError::NonInteger(declared.clone()).into());
            }
            let mut bounds = vec![ast.expect_integer(start)?, ast.expect_integer(end)?];
            if let Some(step) = step {
                bounds.push(ast.expect_integer(step)?);
            }
            if let Some(found) = bounds.into_iter().find(|b| !declared.accepts(b)) {
                return Err(ConstructionError::TypeMismatch {
                    name: name.clone(),
                    declared: declared.clone(),
                    found,
                });
            }
            ast.expect_block(body, "body")?;
            Ok(NodeData::ForRangeStmt(ForRangeStmt {
                variable,
                start,
                end,
                step,
                body,
            }))
        })
    }

    pub fn comprehension_clause(
        &mut self,
        target: NodeId,
        iterable: NodeId,
        conditions: Vec<NodeId>,
        is_async: bool,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            let element = element_type(&ast.expr_type(iterable)?)?;
            ast.expect_target(target, &element)?;
            ast.expect_conditions(&conditions)?;
            Ok(NodeData::ComprehensionClause(ComprehensionClause {
                target,
                iterable,
                conditions,
                is_async,
            }))
        })
    }

    pub fn comprehension(
        &mut self,
        kind: ComprehensionKind,
        element: NodeId,
        generators: Vec<NodeId>,
    ) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            if generators.is_empty() {
                return Err(ConstructionError::MissingGenerator);
            }
            for id in &generators {
                ast.expect_kind(
                    *id,
                    "generators",
                    NodeKind::ComprehensionClause,
                    "ComprehensionClause",
                )?;
            }
            let element_ty = ast.expr_type(element)?;
            let ty = match kind {
                ComprehensionKind::List => Type::list(element_ty),
                ComprehensionKind::Set => Type::set(element_ty),
                ComprehensionKind::Generator => Type::Any,
            };
            Ok(NodeData::Comprehension(Comprehension {
                kind,
                element,
                generators,
                ty,
            }))
        })
    }

    // Classes

    pub fn class_decl(&mut self, decl: ClassDecl) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            ast.expr_types(&decl.bases)?;
            ast.expr_types(&decl.decorators)?;
            Ok(NodeData::ClassDecl(decl))
        })
    }

    pub fn class_def(&mut self, def: ClassDef) -> Result<NodeId, ConstructionError> {
        self.build(|ast| {
            ast.expr_types(&def.bases)?;
            ast.expr_types(&def.decorators)?;
            for id in &def.attributes {
                ast.expect_kind(
                    *id,
                    "attributes",
                    NodeKind::VariableDeclaration,
                    "VariableDeclaration",
                )?;
            }
            for id in &def.methods {
                ast.expect_kind(*id, "methods", NodeKind::FunctionDef, "FunctionDef")?;
            }
            Ok(NodeData::ClassDef(def))
        })
    }
}

/// Rejects kinds that only make sense inside another node.
pub(crate) fn check_statement(kind: NodeKind) -> Result<(), ConstructionError> {
    match kind {
        NodeKind::Module
        | NodeKind::Argument
        | NodeKind::FunctionPrototype
        | NodeKind::ComprehensionClause => Err(ConstructionError::UnexpectedKind {
            slot: "block",
            expected: "statement",
            found: kind,
        }),
        _ => Ok(()),
    }
}

/// Element type when every element agrees, `Any` otherwise. `None` if empty.
fn common_type(types: Vec<Type>) -> Option<Type> {
    let mut iter = types.into_iter();
    let first = iter.next()?;
    Some(if iter.all(|t| t == first) {
        first
    } else {
        Type::Any
    })
}

fn element_type(ty: &Type) -> Result<Type, TypeError> {
    match ty {
        Type::List(elem) | Type::Set(elem) => {
            Ok(elem.as_deref().cloned().unwrap_or(Type::Any))
        }
        Type::Tuple(items) => Ok(common_type(items.clone()).unwrap_or(Type::Any)),
        Type::Map(Some(kv)) => Ok(kv.0.clone()),
        Type::Map(None) | Type::Any => Ok(Type::Any),
        Type::String | Type::Utf8String => Ok(Type::Utf8Char),
        other => Err(TypeError::NotIterable(other.clone())),
    }
}

fn unary_result(op: UnaryOperator, operand: &Type) -> Result<Type, TypeError> {
    match op {
        UnaryOperator::Not if operand.is_boolean() || operand.is_any() => Ok(Type::Boolean),
        UnaryOperator::Not => Err(TypeError::NonBoolean(operand.clone())),
        _ if operand.is_any() => Ok(Type::Any),
        UnaryOperator::BitNot if operand.is_integer() => Ok(operand.clone()),
        UnaryOperator::BitNot => Err(TypeError::NonInteger(operand.clone())),
        UnaryOperator::Neg | UnaryOperator::Pos if operand.is_numeric() => Ok(operand.clone()),
        UnaryOperator::Neg | UnaryOperator::Pos => Err(TypeError::NonNumeric(operand.clone())),
    }
}

fn binary_result(op: BinaryOperator, lhs: &Type, rhs: &Type) -> Result<Type, TypeError> {
    if lhs.is_any() || rhs.is_any() {
        return Ok(match op.class() {
            OperatorClass::Arithmetic if lhs.is_any() => rhs.clone(),
            OperatorClass::Arithmetic => lhs.clone(),
            OperatorClass::Comparison | OperatorClass::Logical => Type::Boolean,
        });
    }

    match op.class() {
        OperatorClass::Arithmetic => {
            if lhs.is_string() && rhs.is_string() {
                return if op == BinaryOperator::Add && lhs == rhs {
                    Ok(lhs.clone())
                } else {
                    Err(TypeError::Incompatible {
                        op: op.token().to_string(),
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                    })
                };
            }
            promote(lhs, rhs)
        }
        OperatorClass::Comparison => {
            if matches!(op, BinaryOperator::Eq | BinaryOperator::Ne) && lhs == rhs {
                return Ok(Type::Boolean);
            }
            promote(lhs, rhs).map(|_| Type::Boolean)
        }
        OperatorClass::Logical => {
            for ty in [lhs, rhs] {
                if !ty.is_boolean() {
                    return Err(TypeError::NonBoolean(ty.clone()));
                }
            }
            Ok(Type::Boolean)
        }
    }
}

fn validate_literal(value: &LiteralValue, ty: &Type) -> Result<(), ConstructionError> {
    let invalid = |reason: &str| ConstructionError::InvalidLiteral {
        ty: ty.clone(),
        reason: reason.to_string(),
    };

    match (value, ty) {
        (LiteralValue::Bool(_), Type::Boolean) => Ok(()),
        (LiteralValue::Int(v), Type::Int { signed, width }) => {
            if int_fits(*v, *signed, width.bits()) {
                Ok(())
            } else {
                Err(invalid(&format!("{v} is out of range")))
            }
        }
        (LiteralValue::UInt(v), Type::Int { signed, width }) => {
            if uint_fits(*v, *signed, width.bits()) {
                Ok(())
            } else {
                Err(invalid(&format!("{v} is out of range")))
            }
        }
        (LiteralValue::Float(_), Type::Float { .. }) => Ok(()),
        (LiteralValue::Complex { .. }, Type::Complex { .. }) => Ok(()),
        (LiteralValue::Str(_), Type::String | Type::Utf8String) => Ok(()),
        (LiteralValue::Char(_), Type::Utf8Char) => Ok(()),
        (LiteralValue::Temporal(text), Type::Date) => check_date(text).map_err(|r| invalid(&r)),
        (LiteralValue::Temporal(text), Type::Time) => check_time(text).map_err(|r| invalid(&r)),
        (LiteralValue::Temporal(text), Type::DateTime) => {
            check_date_time(text, 'T').map_err(|r| invalid(&r))
        }
        (LiteralValue::Temporal(text), Type::Timestamp) => {
            check_date_time(text, ' ').map_err(|r| invalid(&r))
        }
        _ => Err(invalid("value does not match the literal type")),
    }
}

fn int_fits(v: i128, signed: bool, bits: u32) -> bool {
    match (signed, bits) {
        (true, 128) => true,
        (true, bits) => {
            let max = (1i128 << (bits - 1)) - 1;
            (-max - 1..=max).contains(&v)
        }
        (false, bits) => v >= 0 && uint_fits(v as u128, false, bits),
    }
}

fn uint_fits(v: u128, signed: bool, bits: u32) -> bool {
    match (signed, bits) {
        (false, 128) => true,
        (false, bits) => v < (1u128 << bits),
        (true, bits) => v < (1u128 << (bits - 1)),
    }
}

fn digits(part: &str, len: usize) -> Option<u32> {
    if part.len() == len && part.bytes().all(|b| b.is_ascii_digit()) {
        part.parse().ok()
    } else {
        None
    }
}

fn check_date(text: &str) -> Result<(), String> {
    let bad = || format!("`{text}` is not a YYYY-MM-DD date");
    let mut parts = text.split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(bad());
    };
    let year = digits(y, 4).ok_or_else(bad)?;
    let month = digits(m, 2).ok_or_else(bad)?;
    let day = digits(d, 2).ok_or_else(bad)?;
    if year == 0 || !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(bad());
    }
    Ok(())
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn check_time(text: &str) -> Result<(), String> {
    let bad = || format!("`{text}` is not an HH:MM:SS time");
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };
    if let Some(fraction) = fraction
        && (fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(bad());
    }
    let mut parts = clock.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(bad());
    };
    let (h, m, s) = (
        digits(h, 2).ok_or_else(bad)?,
        digits(m, 2).ok_or_else(bad)?,
        digits(s, 2).ok_or_else(bad)?,
    );
    if h > 23 || m > 59 || s > 59 {
        return Err(bad());
    }
    Ok(())
}

fn check_date_time(text: &str, separator: char) -> Result<(), String> {
    let (date, time) = text
        .split_once(separator)
        .ok_or_else(|| format!("`{text}` is missing the `{separator}` separator"))?;
    check_date(date)?;
    check_time(time)
}
