//! Integration tests for tree construction, structural export, scoping and
//! writer lookup through the public API.

use arbor_ir::{
    Argument, Ast, ConstructionError, Fidelity, FunctionPrototype, NodeData, NodeId, NodeKind,
    RenderConfig, ReprStruct, ScopeError, SourceLocation, StructureEq, SymbolTable, Type,
    TypeError, VariableDeclaration, Writer, writer_for_extension, writer_for_language,
};

/// `def add(x: Int32, y: Int32) -> Int32: return x + y` inside module `main`.
fn add_module(ast: &mut Ast) -> NodeId {
    let x = ast.argument(Argument::new("x", Type::INT32)).unwrap();
    let y = ast.argument(Argument::new("y", Type::INT32)).unwrap();
    let proto = ast
        .prototype(FunctionPrototype::new("add", vec![x, y], Type::INT32))
        .unwrap();
    let lhs = ast.variable("x", Type::INT32);
    let rhs = ast.variable("y", Type::INT32);
    let sum = ast.binary_op("+", lhs, rhs).unwrap();
    let ret = ast.function_return(Some(sum)).unwrap();
    let body = ast.block("body", vec![ret]).unwrap();
    let add = ast.function(proto, body).unwrap();
    ast.module("main", vec![add]).unwrap()
}

#[test]
fn python_function_rendering() {
    let mut ast = Ast::new();
    let module = add_module(&mut ast);
    let source = writer_for_language("python")
        .unwrap()
        .write(&ast, module)
        .unwrap();
    assert!(source.contains("def add(x: int, y: int) -> int:"));
    assert!(source.contains("    return x + y"));
    assert!(source.ends_with('\n'));
}

#[test]
fn writer_lookup_by_extension() {
    let writer = writer_for_extension("py").unwrap();
    assert_eq!(writer.language(), "python");
    assert!(writer_for_language("cobol").is_none());
}

#[test]
fn configured_writer() {
    let config = RenderConfig::from_toml_str("[python]\nindent = 2\ntype_hints = false\n").unwrap();
    let mut ast = Ast::new();
    let module = add_module(&mut ast);
    let source = config.python_writer().render(&ast, module).unwrap();
    assert!(source.contains("def add(x, y):\n  return x + y"));
}

#[test]
fn block_order_is_preserved() {
    let mut ast = Ast::new();
    let names = ["a", "b", "c", "d"];
    let decls: Vec<NodeId> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let value = ast.int32(i as i32);
            ast.declare(VariableDeclaration::new(*name, Type::INT32).with_value(value))
                .unwrap()
        })
        .collect();
    let block = ast.block("main", decls.clone()).unwrap();

    assert_eq!(ast.children(block).unwrap(), decls);
    let repr = ast.get_struct(block, Fidelity::Simplified).unwrap();
    let items = repr.get("BLOCK[main]").and_then(ReprStruct::as_list).unwrap();
    let keys: Vec<&str> = items.iter().flat_map(|item| item.keys()).collect();
    assert_eq!(
        keys,
        vec![
            "VAR-DECL[a: Int32]",
            "VAR-DECL[b: Int32]",
            "VAR-DECL[c: Int32]",
            "VAR-DECL[d: Int32]"
        ]
    );
}

#[test]
fn ill_typed_operation_leaves_tree_unchanged() {
    let mut ast = Ast::new();
    let s = ast.string("a");
    let n = ast.int32(1);
    let before = ast.len();

    let err = ast.binary_op("+", s, n).unwrap_err();
    assert!(matches!(err, ConstructionError::Type(_)));
    assert_eq!(ast.len(), before);
    assert_eq!(ast.parent(s).unwrap(), None);
    assert_eq!(ast.parent(n).unwrap(), None);

    // Both operands are still free to use.
    let m = ast.int32(2);
    let sum = ast.binary_op("+", n, m).unwrap();
    assert_eq!(ast.type_of(sum).unwrap(), Some(Type::INT32));
}

#[test]
fn operator_typing() {
    let mut ast = Ast::new();
    let a = ast.int32(1);
    let b = ast.int64(2);
    let wide = ast.binary_op("*", a, b).unwrap();
    assert_eq!(ast.type_of(wide).unwrap(), Some(Type::INT64));

    let c = ast.int32(3);
    let d = ast.int32(4);
    let cmp = ast.binary_op("<", c, d).unwrap();
    assert_eq!(ast.type_of(cmp).unwrap(), Some(Type::Boolean));

    let e = ast.int32(5);
    assert_eq!(
        ast.unary_op("not", e).unwrap_err(),
        ConstructionError::Type(TypeError::NonBoolean(Type::INT32))
    );

    let f = ast.int32(6);
    assert!(matches!(
        ast.binary_op("<=>", e, f).unwrap_err(),
        ConstructionError::UnknownOperator { .. }
    ));
}

#[test]
fn children_attach_once() {
    let mut ast = Ast::new();
    let x = ast.int32(1);
    let y = ast.int32(2);
    let _sum = ast.binary_op("+", x, y).unwrap();
    let z = ast.int32(3);
    assert_eq!(
        ast.binary_op("+", x, z).unwrap_err(),
        ConstructionError::AlreadyAttached {
            kind: NodeKind::Literal
        }
    );
}

#[test]
fn simplified_struct_is_deterministic() {
    let mut a = Ast::new();
    let ma = add_module(&mut a);
    let mut b = Ast::new();
    let mb = add_module(&mut b);

    let sa = a.get_struct(ma, Fidelity::Simplified).unwrap();
    let sb = b.get_struct(mb, Fidelity::Simplified).unwrap();
    assert_eq!(sa, sb);
    assert_eq!(sa.to_json().unwrap(), sb.to_json().unwrap());
    assert!(a.structure_eq(ma, &b, mb).unwrap());

    // Full fidelity differs only in instance tags.
    let fa = a.get_struct(ma, Fidelity::Full).unwrap();
    let fb = b.get_struct(mb, Fidelity::Full).unwrap();
    assert_ne!(fa, fb);
    assert_eq!(fa, a.get_struct(ma, Fidelity::Full).unwrap());
}

#[test]
fn structure_eq_detects_differences() {
    let mut a = Ast::new();
    let x = a.variable("x", Type::INT32);
    let one = a.int32(1);
    let lhs = a.binary_op("+", x, one).unwrap();

    let mut b = Ast::new();
    let x = b.variable("x", Type::INT32);
    let two = b.int32(2);
    let rhs = b.binary_op("+", x, two).unwrap();

    assert!(!a.structure_eq(lhs, &b, rhs).unwrap());
    assert!(a.structure_eq(lhs, &a, lhs).unwrap());
}

#[test]
fn full_metadata() {
    let mut ast = Ast::new();
    let x = ast.at(SourceLocation::new(3, 5)).variable("x", Type::INT32);
    ast.set_comment(x, "the input").unwrap();
    let instance = ast.node(x).unwrap().instance();

    let repr = ast.get_struct(x, Fidelity::Full).unwrap();
    let key = format!("VARIABLE[x]#{instance}");
    assert_eq!(repr.keys(), vec![key.as_str()]);

    let metadata = repr.get(&key).and_then(|v| v.get("metadata")).unwrap();
    let loc = metadata.get("loc").unwrap();
    assert_eq!(loc.get("line"), Some(&ReprStruct::Int(3)));
    assert_eq!(loc.get("col"), Some(&ReprStruct::Int(5)));
    assert_eq!(metadata.get("comment").and_then(ReprStruct::as_str), Some("the input"));
    assert_eq!(metadata.get("ref"), Some(&ReprStruct::Int(instance as i128)));
    assert_eq!(metadata.get("kind").and_then(ReprStruct::as_str), Some("Variable"));
}

#[test]
fn json_export_roundtrips() {
    let mut ast = Ast::new();
    let module = add_module(&mut ast);
    for fidelity in [Fidelity::Full, Fidelity::Simplified] {
        let repr = ast.get_struct(module, fidelity).unwrap();
        let json = ast.to_json(module, fidelity).unwrap();
        let back = ReprStruct::from_json(&json).unwrap();
        assert!(back.structure_eq(&repr));
    }
    let yaml = ast.to_yaml(module, Fidelity::Simplified).unwrap();
    assert!(yaml.starts_with("MODULE[main]:"));
}

#[test]
fn foreign_ids_are_rejected() {
    let mut a = Ast::new();
    let x = a.int32(1);
    let mut b = Ast::new();
    let y = b.int32(2);
    assert!(matches!(
        b.binary_op("+", x, y).unwrap_err(),
        ConstructionError::Node(_)
    ));
    assert!(b.get_struct(x, Fidelity::Simplified).is_err());
}

#[test]
fn symbol_table_scoping() {
    let mut ast = Ast::new();
    let outer = ast
        .declare(VariableDeclaration::new("x", Type::INT32))
        .unwrap();
    let inner = ast
        .declare(VariableDeclaration::new("x", Type::FLOAT64))
        .unwrap();

    let mut table = SymbolTable::new();
    table.define("x", outer).unwrap();
    {
        let mut scope = table.enter_scope("fn");
        scope.define("x", inner).unwrap();
        let found = scope.lookup("x").unwrap();
        let NodeData::VariableDeclaration(decl) = ast.data(found).unwrap() else {
            panic!("expected a declaration");
        };
        assert_eq!(decl.ty, Type::FLOAT64);
    }
    assert_eq!(table.lookup("x").unwrap(), outer);
    assert_eq!(
        table.define("x", inner).unwrap_err(),
        ScopeError::DuplicateBinding {
            name: "x".into(),
            scope: "root".into()
        }
    );
}

#[test]
fn appended_statements_render_in_order() {
    let mut ast = Ast::new();
    let block = ast.block("main", Vec::new()).unwrap();
    for (name, value) in [("s1", 1), ("s2", 2), ("s3", 3)] {
        let v = ast.int32(value);
        let stmt = ast.assign(name, v).unwrap();
        ast.append(block, stmt).unwrap();
    }
    let module = ast.module("m", vec![block]).unwrap();
    let source = arbor_ir::PythonWriter::emit(&ast, module).unwrap();
    assert_eq!(source, "s1 = 1\ns2 = 2\ns3 = 3\n");
}
