//! Snapshot tests for the structural export and the Python writer.
//!
//! Run `cargo insta review` to update snapshots after intentional changes.

use arbor_ir::{
    Argument, Ast, ClassDecl, ClassDef, Fidelity, FunctionPrototype, NodeId, PythonWriter, Type,
    VariableDeclaration,
};

/// `total: int = 0`, a two-argument `add`, and a loop summing odd numbers.
fn sample_module(ast: &mut Ast) -> NodeId {
    let zero = ast.int32(0);
    let total = ast
        .declare(
            VariableDeclaration::new("total", Type::INT32)
                .mutable()
                .with_value(zero),
        )
        .unwrap();

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
    ast.set_comment(add, "Adds two numbers.").unwrap();

    let i = ast
        .declare(VariableDeclaration::new("i", Type::INT32))
        .unwrap();
    let i_ref = ast.variable("i", Type::INT32);
    let two = ast.int32(2);
    let rem = ast.binary_op("%", i_ref, two).unwrap();
    let zero = ast.int32(0);
    let even = ast.binary_op("==", rem, zero).unwrap();
    let skip = ast.continue_stmt();
    let then = ast.block("then", vec![skip]).unwrap();
    let acc = ast.variable("total", Type::INT32);
    let i_ref = ast.variable("i", Type::INT32);
    let next = ast.binary_op("+", acc, i_ref).unwrap();
    let update = ast.assign("total", next).unwrap();
    let else_ = ast.block("else", vec![update]).unwrap();
    let check = ast.if_stmt(even, then, Some(else_)).unwrap();
    let loop_body = ast.block("loop", vec![check]).unwrap();
    let start = ast.int32(0);
    let end = ast.int32(10);
    let for_range = ast.for_range(i, start, end, None, loop_body).unwrap();

    ast.module("main", vec![total, add, for_range]).unwrap()
}

mod python_writer {
    use super::*;

    #[test]
    fn module() {
        let mut ast = Ast::new();
        let module = sample_module(&mut ast);
        let source = PythonWriter::emit(&ast, module).unwrap();
        insta::assert_snapshot!(source.trim_end(), @r###"
        total: int = 0
        # Adds two numbers.
        def add(x: int, y: int) -> int:
            return x + y
        for i in range(0, 10):
            if (i % 2) == 0:
                continue
            else:
                total = total + i
        "###);
    }

    #[test]
    fn module_imports() {
        let mut ast = Ast::new();
        let released = ast.date("2024-02-29").unwrap();
        let decl = ast
            .declare(VariableDeclaration::new("released", Type::Date).with_value(released))
            .unwrap();
        let x = ast.argument(Argument::new("x", Type::Any)).unwrap();
        let proto = ast
            .prototype(FunctionPrototype::new("area", vec![x], Type::FLOAT64))
            .unwrap();
        let body = ast.block("body", vec![]).unwrap();
        let area = ast.function(proto, body).unwrap();
        let shape = ast
            .class_def(ClassDef::from(ClassDecl::new("Shape").abstract_class()).with_methods(vec![area]))
            .unwrap();
        let module = ast.module("shapes", vec![decl, shape]).unwrap();
        let source = PythonWriter::emit(&ast, module).unwrap();
        insta::assert_snapshot!(source.trim_end(), @r###"
        import datetime
        from abc import ABC
        from typing import Any

        released: datetime.date = datetime.date.fromisoformat("2024-02-29")
        class Shape(ABC):
            def area(self, x: Any) -> float:
                pass
        "###);
    }

    #[test]
    fn nested_collections() {
        let mut ast = Ast::new();
        let a = ast.int32(1);
        let b = ast.int32(2);
        let inner = ast.list_literal(vec![a, b]).unwrap();
        let key = ast.string("xs");
        let map = ast.map_literal(vec![(key, inner)]).unwrap();
        let decl = ast
            .declare(VariableDeclaration::new("table", Type::Map(None)).with_value(map))
            .unwrap();
        let module = ast.module("main", vec![decl]).unwrap();
        let source = PythonWriter::emit(&ast, module).unwrap();
        insta::assert_snapshot!(source.trim_end(), @r###"table: dict = {"xs": [1, 2]}"###);
    }
}

mod structure {
    use super::*;

    #[test]
    fn binary_expression() {
        let mut ast = Ast::new();
        let x = ast.variable("x", Type::INT32);
        let one = ast.int32(1);
        let sum = ast.binary_op("+", x, one).unwrap();
        let repr = ast.get_struct(sum, Fidelity::Simplified).unwrap();
        insta::assert_json_snapshot!(repr, @r###"
        {
          "BINARY[+]": {
            "lhs": {
              "VARIABLE[x]": "x"
            },
            "rhs": {
              "LITERAL[Int32]": 1
            }
          }
        }
        "###);
    }

    #[test]
    fn return_without_value() {
        let mut ast = Ast::new();
        let ret = ast.function_return(None).unwrap();
        let body = ast.block("body", vec![ret]).unwrap();
        let repr = ast.get_struct(body, Fidelity::Simplified).unwrap();
        insta::assert_json_snapshot!(repr, @r###"
        {
          "BLOCK[body]": [
            {
              "RETURN": {}
            }
          ]
        }
        "###);
    }
}
