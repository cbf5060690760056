//! Integration tests for the formula parser.
//!
//! The parser must handle arbitrarily nested calls and conditionals; the
//! cases here are shapes text substitution would get wrong.

use prism::formula::ast::{BinaryOperator, Expr, Literal};
use prism::formula::parser::parse;

#[test]
fn test_deeply_nested_calls() {
    let e = parse("ZN(RUNNING_SUM(SUM(IIF([Returned], 0, [Sales]))))").unwrap();
    // Unwrap the four call layers
    let mut current = &e;
    for expected in ["ZN", "RUNNING_SUM", "SUM", "IIF"] {
        match current {
            Expr::Call { name, args } => {
                assert_eq!(name, expected);
                if let Some(first) = args.first() {
                    current = first;
                }
            }
            other => panic!("expected call {}, got {:?}", expected, other),
        }
    }
}

#[test]
fn test_call_with_multiple_arguments() {
    let e = parse("DATEDIFF('day', [Start], [End])").unwrap();
    match e {
        Expr::Call { name, args } => {
            assert_eq!(name, "DATEDIFF");
            assert_eq!(args.len(), 3);
            assert_eq!(args[0], Expr::Literal(Literal::Str("day".to_string())));
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_arithmetic_precedence() {
    // a - b / c parses as a - (b / c)
    let e = parse("[A] - [B] / [C]").unwrap();
    match e {
        Expr::BinaryOp { op, right, .. } => {
            assert_eq!(op, BinaryOperator::Sub);
            assert!(matches!(
                *right,
                Expr::BinaryOp {
                    op: BinaryOperator::Div,
                    ..
                }
            ));
        }
        other => panic!("expected subtraction at root, got {:?}", other),
    }
}

#[test]
fn test_power_is_right_associative() {
    let e = parse("2 ^ 3 ^ 4").unwrap();
    match e {
        Expr::BinaryOp { op, left, right } => {
            assert_eq!(op, BinaryOperator::Pow);
            assert_eq!(*left, Expr::Literal(Literal::Number("2".to_string())));
            assert!(matches!(
                *right,
                Expr::BinaryOp {
                    op: BinaryOperator::Pow,
                    ..
                }
            ));
        }
        other => panic!("expected power at root, got {:?}", other),
    }
}

#[test]
fn test_logical_structure() {
    // NOT binds tighter than AND, comparison tighter than NOT
    let e = parse("NOT [A] = 1 AND [B] = 2").unwrap();
    match e {
        Expr::BinaryOp { op, left, .. } => {
            assert_eq!(op, BinaryOperator::And);
            assert!(matches!(*left, Expr::UnaryOp { .. }));
        }
        other => panic!("expected AND at root, got {:?}", other),
    }
}

#[test]
fn test_if_inside_call_inside_if() {
    let e = parse(
        "IF SUM(IF [X] > 0 THEN [X] ELSE 0 END) > 10 THEN 'big' ELSE 'small' END",
    )
    .unwrap();
    assert!(matches!(e, Expr::If { .. }));
}

#[test]
fn test_parenthesized_grouping_survives() {
    let e = parse("([A] + [B]) * [C]").unwrap();
    match e {
        Expr::BinaryOp { op, left, .. } => {
            assert_eq!(op, BinaryOperator::Mul);
            assert!(matches!(*left, Expr::Paren(_)));
        }
        other => panic!("expected product, got {:?}", other),
    }
}

#[test]
fn test_syntax_errors_are_reported() {
    assert!(parse("IF [A] THEN 1").is_err()); // missing END
    assert!(parse("SUM(,)").is_err());
    assert!(parse("[A] +").is_err());
    assert!(parse("THEN").is_err());
}
