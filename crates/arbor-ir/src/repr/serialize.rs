use super::{Fidelity, ReprStruct};
use crate::error::NodeError;
use crate::node::{
    Ast, CollectionKind, ComprehensionKind, LiteralValue, Node, NodeData, NodeId,
};

impl Ast {
    /// Structural representation of the subtree rooted at `id`.
    pub fn get_struct(&self, id: NodeId, fidelity: Fidelity) -> Result<ReprStruct, NodeError> {
        let node = self.node(id)?;
        let (tag, content) = self.tag_and_content(node, fidelity)?;
        Ok(match fidelity {
            Fidelity::Simplified => ReprStruct::entry(tag, content),
            Fidelity::Full => ReprStruct::entry(
                format!("{tag}#{}", node.instance),
                ReprStruct::Map(vec![
                    ("content".into(), content),
                    ("metadata".into(), metadata(node)),
                ]),
            ),
        })
    }

    fn structs(&self, ids: &[NodeId], fidelity: Fidelity) -> Result<ReprStruct, NodeError> {
        ids.iter()
            .map(|id| self.get_struct(*id, fidelity))
            .collect::<Result<_, _>>()
            .map(ReprStruct::List)
    }

    fn optional(&self, id: Option<NodeId>, fidelity: Fidelity) -> Result<ReprStruct, NodeError> {
        match id {
            Some(id) => self.get_struct(id, fidelity),
            None => Ok(ReprStruct::empty_map()),
        }
    }

    fn tag_and_content(
        &self,
        node: &Node,
        fidelity: Fidelity,
    ) -> Result<(String, ReprStruct), NodeError> {
        let s = |id: NodeId| self.get_struct(id, fidelity);

        Ok(match &node.data {
            NodeData::Literal(lit) => (format!("LITERAL[{}]", lit.ty), literal_value(&lit.value)),
            NodeData::CollectionLiteral(c) => {
                let tag = match c.kind {
                    CollectionKind::List => "LIST-LITERAL",
                    CollectionKind::Set => "SET-LITERAL",
                    CollectionKind::Tuple => "TUPLE-LITERAL",
                };
                (tag.into(), self.structs(&c.elements, fidelity)?)
            }
            NodeData::MapLiteral(m) => {
                let entries = m
                    .entries
                    .iter()
                    .map(|(k, v)| {
                        Ok(ReprStruct::Map(vec![
                            ("key".into(), s(*k)?),
                            ("value".into(), s(*v)?),
                        ]))
                    })
                    .collect::<Result<_, NodeError>>()?;
                ("MAP-LITERAL".into(), ReprStruct::List(entries))
            }
            NodeData::Variable(v) => (format!("VARIABLE[{}]", v.name), ReprStruct::str(&v.name)),
            NodeData::VariableDeclaration(d) => (
                format!("VAR-DECL[{}: {}]", d.name, d.ty),
                self.optional(d.value, fidelity)?,
            ),
            NodeData::VariableAssignment(a) => (format!("ASSIGN[{}]", a.name), s(a.value)?),
            NodeData::UnaryOp(u) => (format!("UNARY[{}]", u.op), s(u.operand)?),
            NodeData::BinaryOp(b) => (
                format!("BINARY[{}]", b.op),
                ReprStruct::Map(vec![("lhs".into(), s(b.lhs)?), ("rhs".into(), s(b.rhs)?)]),
            ),
            NodeData::TypeCast(c) => (format!("CAST[{}]", c.target), s(c.expr)?),
            NodeData::Block(b) => (format!("BLOCK[{}]", b.name), self.structs(&b.nodes, fidelity)?),
            NodeData::Module(m) => (
                format!("MODULE[{}]", m.name),
                self.structs(&m.nodes, fidelity)?,
            ),
            NodeData::Argument(a) => (
                format!("ARGUMENT[{}: {}]", a.name, a.ty),
                self.optional(a.default, fidelity)?,
            ),
            NodeData::FunctionPrototype(p) => (
                format!("PROTOTYPE[{}]", p.name),
                ReprStruct::Map(vec![
                    ("args".into(), self.structs(&p.args, fidelity)?),
                    ("return_type".into(), ReprStruct::str(p.return_type.to_string())),
                ]),
            ),
            NodeData::FunctionDef(f) => {
                let NodeData::FunctionPrototype(proto) = &self.node(f.prototype)?.data else {
                    return Err(NodeError::Missing(f.prototype.index));
                };
                (
                    format!("FUNCTION-DEF[{}]", proto.name),
                    ReprStruct::Map(vec![
                        ("args".into(), self.structs(&proto.args, fidelity)?),
                        (
                            "return_type".into(),
                            ReprStruct::str(proto.return_type.to_string()),
                        ),
                        ("body".into(), s(f.body)?),
                    ]),
                )
            }
            NodeData::FunctionCall(c) => (
                format!("CALL[{}]", c.callee),
                self.structs(&c.args, fidelity)?,
            ),
            NodeData::FunctionReturn(r) => ("RETURN".into(), self.optional(r.value, fidelity)?),
            NodeData::IfStmt(i) => {
                let mut content = vec![
                    ("condition".into(), s(i.condition)?),
                    ("then".into(), s(i.then)?),
                ];
                if let Some(else_) = i.else_ {
                    content.push(("else".into(), s(else_)?));
                }
                ("IF-STMT".into(), ReprStruct::Map(content))
            }
            NodeData::WhileStmt(w) => (
                "WHILE-STMT".into(),
                ReprStruct::Map(vec![
                    ("condition".into(), s(w.condition)?),
                    ("body".into(), s(w.body)?),
                ]),
            ),
            NodeData::ForStmt(f) => (
                "FOR-STMT".into(),
                ReprStruct::Map(vec![
                    ("target".into(), s(f.target)?),
                    ("iterable".into(), s(f.iterable)?),
                    ("conditions".into(), self.structs(&f.conditions, fidelity)?),
                    ("body".into(), s(f.body)?),
                ]),
            ),
            NodeData::ForRangeStmt(f) => {
                let mut content = vec![
                    ("variable".into(), s(f.variable)?),
                    ("start".into(), s(f.start)?),
                    ("end".into(), s(f.end)?),
                ];
                if let Some(step) = f.step {
                    content.push(("step".into(), s(step)?));
                }
                content.push(("body".into(), s(f.body)?));
                ("FOR-RANGE".into(), ReprStruct::Map(content))
            }
            NodeData::Break => ("BREAK".into(), ReprStruct::empty_map()),
            NodeData::Continue => ("CONTINUE".into(), ReprStruct::empty_map()),
            NodeData::ComprehensionClause(c) => (
                if c.is_async {
                    "ASYNC-COMPREHENSION-CLAUSE".into()
                } else {
                    "COMPREHENSION-CLAUSE".into()
                },
                ReprStruct::Map(vec![
                    ("target".into(), s(c.target)?),
                    ("iterable".into(), s(c.iterable)?),
                    ("conditions".into(), self.structs(&c.conditions, fidelity)?),
                ]),
            ),
            NodeData::Comprehension(c) => {
                let tag = match c.kind {
                    ComprehensionKind::List => "LIST-COMPREHENSION",
                    ComprehensionKind::Set => "SET-COMPREHENSION",
                    ComprehensionKind::Generator => "GENERATOR-EXPR",
                };
                (
                    tag.into(),
                    ReprStruct::Map(vec![
                        ("element".into(), s(c.element)?),
                        ("generators".into(), self.structs(&c.generators, fidelity)?),
                    ]),
                )
            }
            NodeData::ClassDecl(c) => (
                class_tag("CLASS-DECL", c.visibility.marker(), &c.name, c.is_abstract),
                ReprStruct::Map(vec![
                    ("bases".into(), self.structs(&c.bases, fidelity)?),
                    ("decorators".into(), self.structs(&c.decorators, fidelity)?),
                ]),
            ),
            NodeData::ClassDef(c) => (
                class_tag("CLASS-DEF", c.visibility.marker(), &c.name, c.is_abstract),
                ReprStruct::Map(vec![
                    ("bases".into(), self.structs(&c.bases, fidelity)?),
                    ("decorators".into(), self.structs(&c.decorators, fidelity)?),
                    ("attributes".into(), self.structs(&c.attributes, fidelity)?),
                    ("methods".into(), self.structs(&c.methods, fidelity)?),
                ]),
            ),
        })
    }
}

fn class_tag(prefix: &str, marker: char, name: &str, is_abstract: bool) -> String {
    if is_abstract {
        format!("{prefix}[{marker}{name}, abstract]")
    } else {
        format!("{prefix}[{marker}{name}]")
    }
}

fn literal_value(value: &LiteralValue) -> ReprStruct {
    match value {
        LiteralValue::Bool(b) => ReprStruct::Bool(*b),
        LiteralValue::Int(i) => int_value(*i),
        LiteralValue::UInt(u) => match u64::try_from(*u) {
            Ok(small) => ReprStruct::Int(small.into()),
            Err(_) => ReprStruct::Str(u.to_string()),
        },
        LiteralValue::Float(f) => float_value(*f),
        LiteralValue::Complex { real, imag } => ReprStruct::Map(vec![
            ("real".into(), float_value(*real)),
            ("imag".into(), float_value(*imag)),
        ]),
        LiteralValue::Str(s) | LiteralValue::Temporal(s) => ReprStruct::str(s),
        LiteralValue::Char(c) => ReprStruct::Str(c.to_string()),
    }
}

/// Integers JSON numbers cannot carry exactly become decimal strings.
fn int_value(i: i128) -> ReprStruct {
    if i64::try_from(i).is_ok() || u64::try_from(i).is_ok() {
        ReprStruct::Int(i)
    } else {
        ReprStruct::Str(i.to_string())
    }
}

/// Non-finite floats become `"nan"`, `"inf"` or `"-inf"`.
fn float_value(f: f64) -> ReprStruct {
    if f.is_nan() {
        ReprStruct::str("nan")
    } else if f.is_infinite() {
        ReprStruct::str(if f > 0.0 { "inf" } else { "-inf" })
    } else {
        ReprStruct::Float(f)
    }
}

fn metadata(node: &Node) -> ReprStruct {
    let (line, col) = if node.loc.is_known() {
        (i128::from(node.loc.line), i128::from(node.loc.column))
    } else {
        (-1, -1)
    };
    let mut entries = vec![
        (
            "loc".into(),
            ReprStruct::Map(vec![
                ("line".into(), ReprStruct::Int(line)),
                ("col".into(), ReprStruct::Int(col)),
            ]),
        ),
        ("comment".into(), ReprStruct::str(&node.comment)),
        ("ref".into(), ReprStruct::Int(node.instance.into())),
        ("kind".into(), ReprStruct::Str(node.kind().to_string())),
    ];
    if let Some(ty) = node.data.value_type() {
        entries.push(("type".into(), ReprStruct::Str(ty.to_string())));
    }
    ReprStruct::Map(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceLocation;
    use crate::modifiers::Visibility;
    use crate::node::ClassDecl;
    use crate::types::Type;

    #[test]
    fn test_simplified_binary() {
        let mut ast = Ast::new();
        let a = ast.int32(1);
        let b = ast.int32(2);
        let sum = ast.binary_op("+", a, b).unwrap();
        let repr = ast.get_struct(sum, Fidelity::Simplified).unwrap();
        assert_eq!(
            repr,
            ReprStruct::entry(
                "BINARY[+]",
                ReprStruct::Map(vec![
                    ("lhs".into(), ReprStruct::entry("LITERAL[Int32]", ReprStruct::Int(1))),
                    ("rhs".into(), ReprStruct::entry("LITERAL[Int32]", ReprStruct::Int(2))),
                ])
            )
        );
    }

    #[test]
    fn test_full_metadata() {
        let mut ast = Ast::new();
        let x = ast.at(SourceLocation::new(3, 7)).variable("x", Type::INT32);
        ast.set_comment(x, "input").unwrap();
        let instance = ast.node(x).unwrap().instance();

        let repr = ast.get_struct(x, Fidelity::Full).unwrap();
        let key = format!("VARIABLE[x]#{instance}");
        assert_eq!(repr.keys(), vec![key.as_str()]);

        let body = repr.get(&key).unwrap();
        assert_eq!(body.get("content"), Some(&ReprStruct::str("x")));
        let meta = body.get("metadata").unwrap();
        assert_eq!(
            meta.get("loc"),
            Some(&ReprStruct::Map(vec![
                ("line".into(), ReprStruct::Int(3)),
                ("col".into(), ReprStruct::Int(7)),
            ]))
        );
        assert_eq!(meta.get("comment"), Some(&ReprStruct::str("input")));
        assert_eq!(meta.get("kind"), Some(&ReprStruct::str("Variable")));
        assert_eq!(meta.get("type"), Some(&ReprStruct::str("Int32")));
    }

    #[test]
    fn test_unknown_location_is_negative() {
        let mut ast = Ast::new();
        let brk = ast.break_stmt();
        let repr = ast.get_struct(brk, Fidelity::Full).unwrap();
        let loc = repr
            .single_value()
            .and_then(|v| v.get("metadata"))
            .and_then(|m| m.get("loc"))
            .unwrap();
        assert_eq!(loc.get("line"), Some(&ReprStruct::Int(-1)));
        assert_eq!(loc.get("col"), Some(&ReprStruct::Int(-1)));
    }

    #[test]
    fn test_class_tags() {
        let mut ast = Ast::new();
        let decl = ast
            .class_decl(
                ClassDecl::new("Shape")
                    .abstract_class()
                    .with_visibility(Visibility::Protected),
            )
            .unwrap();
        let repr = ast.get_struct(decl, Fidelity::Simplified).unwrap();
        assert_eq!(repr.keys(), vec!["CLASS-DECL[#Shape, abstract]"]);
    }

    #[test]
    fn test_absent_values_are_empty_maps() {
        let mut ast = Ast::new();
        let ret = ast.function_return(None).unwrap();
        assert_eq!(
            ast.get_struct(ret, Fidelity::Simplified).unwrap(),
            ReprStruct::entry("RETURN", ReprStruct::empty_map())
        );
    }

    #[test]
    fn test_wide_and_non_finite_literals_roundtrip() {
        let mut ast = Ast::new();
        let wide = ast.int128(1 << 100);
        let negative = ast.int128(i128::MIN);
        let nan = ast.float64(f64::NAN);
        let inf = ast.float64(f64::NEG_INFINITY);
        let c = ast.complex(f64::INFINITY, 0.5, Type::COMPLEX64).unwrap();

        assert_eq!(
            ast.get_struct(wide, Fidelity::Simplified).unwrap(),
            ReprStruct::entry("LITERAL[Int128]", ReprStruct::str((1i128 << 100).to_string()))
        );
        assert_eq!(
            ast.get_struct(nan, Fidelity::Simplified).unwrap(),
            ReprStruct::entry("LITERAL[Float64]", ReprStruct::str("nan"))
        );

        for id in [wide, negative, nan, inf, c] {
            let repr = ast.get_struct(id, Fidelity::Simplified).unwrap();
            let back = ReprStruct::from_json(&ast.to_json(id, Fidelity::Simplified).unwrap()).unwrap();
            assert_eq!(back, repr);
        }
    }

    #[test]
    fn test_complex_and_unsigned_literals() {
        let mut ast = Ast::new();
        let c = ast.complex(1.0, -2.0, Type::COMPLEX64).unwrap();
        let u = ast.uint128(u128::MAX);
        assert_eq!(
            ast.get_struct(c, Fidelity::Simplified).unwrap(),
            ReprStruct::entry(
                "LITERAL[Complex64]",
                ReprStruct::Map(vec![
                    ("real".into(), ReprStruct::Float(1.0)),
                    ("imag".into(), ReprStruct::Float(-2.0)),
                ])
            )
        );
        assert_eq!(
            ast.get_struct(u, Fidelity::Simplified).unwrap(),
            ReprStruct::entry("LITERAL[UInt128]", ReprStruct::str(u128::MAX.to_string()))
        );
    }
}
