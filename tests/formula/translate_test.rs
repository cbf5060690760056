//! Integration tests for the full formula translation pipeline.
//!
//! Each case runs lex → parse → rewrite → render through the public
//! `translate` entry point, the way the converter uses it.

use prism::formula::{translate, translate_all, TranslationStatus};
use prism::ir::{CalculationDescriptor, SourceDataType};
use prism::schema::TargetDataType;

fn calc(formula: &str) -> CalculationDescriptor {
    CalculationDescriptor {
        name: "Measure".to_string(),
        formula: formula.to_string(),
        data_type: SourceDataType::Real,
        data_source: Some("Orders".to_string()),
    }
}

fn dax(formula: &str) -> String {
    let t = translate(&calc(formula), None);
    assert_eq!(t.status, TranslationStatus::Ok, "notes: {:?}", t.notes);
    t.expression
}

// ============================================================================
// Function table
// ============================================================================

#[test]
fn test_aggregate_functions() {
    assert_eq!(dax("SUM([Sales])"), "SUM(Orders[Sales])");
    assert_eq!(dax("AVG([Sales])"), "AVERAGE(Orders[Sales])");
    assert_eq!(dax("COUNTD([Customer])"), "DISTINCTCOUNT(Orders[Customer])");
    assert_eq!(dax("MIN([Sales])"), "MIN(Orders[Sales])");
    assert_eq!(dax("MAX([Sales])"), "MAX(Orders[Sales])");
}

#[test]
fn test_string_functions() {
    assert_eq!(
        dax("CONTAINS([Name], 'Corp')"),
        r#"SEARCH(Orders[Name], "Corp")"#
    );
    assert_eq!(
        dax("REPLACE([Name], 'a', 'b')"),
        r#"SUBSTITUTE(Orders[Name], "a", "b")"#
    );
    assert_eq!(dax("UPPER(TRIM([Name]))"), "UPPER(TRIM(Orders[Name]))");
    assert_eq!(dax("MID([Name], 2, 3)"), "MID(Orders[Name], 2, 3)");
}

#[test]
fn test_logical_and_null_functions() {
    assert_eq!(dax("IFNULL([A], 0)"), "IFERROR(Orders[A], 0)");
    assert_eq!(dax("ISNULL([A])"), "ISBLANK(Orders[A])");
    assert_eq!(dax("ZN([A])"), "COALESCE(Orders[A])");
}

#[test]
fn test_math_functions() {
    assert_eq!(dax("LOG([A])"), "LN(Orders[A])");
    assert_eq!(dax("POWER([A], 2)"), "POWER(Orders[A], 2)");
    assert_eq!(dax("ROUND([A] * 1.1, 2)"), "ROUND(Orders[A] * 1.1, 2)");
}

#[test]
fn test_function_names_match_case_insensitively() {
    assert_eq!(dax("avg([Sales])"), "AVERAGE(Orders[Sales])");
    assert_eq!(dax("Countd([Customer])"), "DISTINCTCOUNT(Orders[Customer])");
}

#[test]
fn test_every_table_entry_round_trips_with_argument_order() {
    for (src, dst) in prism::formula::rewrite::FUNCTION_RENAMES {
        let t = translate(&calc(&format!("{}(1, 2)", src)), None);
        assert_eq!(
            t.expression,
            format!("{}(1, 2)", dst),
            "mapping {} -> {}",
            src,
            dst
        );
    }
}

// ============================================================================
// Special forms
// ============================================================================

#[test]
fn test_conditional_forms() {
    assert_eq!(
        dax("IIF([Sales] > 100, 'High', 'Low')"),
        r#"IF(Orders[Sales] > 100, "High", "Low")"#
    );
    assert_eq!(
        dax("IF [Sales] > 100 THEN 'High' ELSEIF [Sales] > 50 THEN 'Mid' ELSE 'Low' END"),
        r#"IF(Orders[Sales] > 100, "High", IF(Orders[Sales] > 50, "Mid", "Low"))"#
    );
}

#[test]
fn test_datepart_form() {
    assert_eq!(dax("DATEPART('year', [Order Date])"), "YEAR(Orders[Order Date])");
    assert_eq!(dax("DATEPART('month', [Order Date])"), "MONTH(Orders[Order Date])");
    assert_eq!(dax("DATEPART('quarter', [Order Date])"), "QUARTER(Orders[Order Date])");
}

#[test]
fn test_running_aggregates() {
    assert_eq!(
        dax("RUNNING_SUM(SUM([Sales]))"),
        "CALCULATE(SUM(Orders[Sales]), ALLPREVIOUS())"
    );
    assert_eq!(
        dax("RUNNING_AVG(AVG([Sales]))"),
        "CALCULATE(AVERAGE(Orders[Sales]), ALLPREVIOUS())"
    );
}

#[test]
fn test_attr_and_null() {
    assert_eq!(dax("ATTR([Region])"), "VALUES(Orders[Region])");
    assert_eq!(dax("IIF(ISNULL([A]), NULL, [A])"), "IF(ISBLANK(Orders[A]), BLANK(), Orders[A])");
}

#[test]
fn test_operators() {
    assert_eq!(dax("[A] % 7"), "MOD(Orders[A], 7)");
    assert_eq!(dax("[A] != [B]"), "Orders[A] <> Orders[B]");
    assert_eq!(dax("[A] AND NOT [B]"), "Orders[A] && NOT Orders[B]");
    assert_eq!(dax("TRUE OR [B]"), "TRUE() || Orders[B]");
}

// ============================================================================
// Review markers and failure handling
// ============================================================================

#[test]
fn test_unknown_function_passes_through_with_review() {
    let t = translate(&calc("WINDOW_SUM(SUM([Sales]))"), None);
    assert_eq!(t.status, TranslationStatus::Ok);
    assert_eq!(t.expression, "WINDOW_SUM(SUM(Orders[Sales]))");
    assert!(t.needs_review);
}

#[test]
fn test_unresolved_field_marks_review() {
    let mut c = calc("SUM([Sales])");
    c.data_source = None;
    let t = translate(&c, None);
    assert_eq!(t.expression, "SUM([Sales])");
    assert!(t.needs_review);
}

#[test]
fn test_parse_failure_produces_placeholder() {
    let t = translate(&calc("IF [A] THEN"), None);
    assert_eq!(t.status, TranslationStatus::Failed);
    assert!(t.expression.contains("Translation failed"));
    assert!(t.expression.contains("IF [A] THEN"));
    assert!(t.expression.ends_with("\n0"));
    assert_eq!(t.data_type, TargetDataType::Double);
}

#[test]
fn test_string_literal_with_embedded_quote() {
    let first = dax(r#"IIF([A] = 'say "hi"', 1, 0)"#);
    assert_eq!(first, r#"IF(Orders[A] = "say ""hi""", 1, 0)"#);

    // The escaped form lexes again, so a second pass is a no-op
    let t = translate(&calc(&first), None);
    assert_eq!(t.status, TranslationStatus::Ok, "notes: {:?}", t.notes);
    assert_eq!(t.expression, first);
}

#[test]
fn test_translated_output_is_stable_under_retranslation() {
    let first = dax("IIF([Sales] > 100, AVG([Profit]), ZN([Profit]))");
    let t = translate(
        &CalculationDescriptor {
            name: "Measure".to_string(),
            formula: first.clone(),
            data_type: SourceDataType::Real,
            data_source: Some("Orders".to_string()),
        },
        None,
    );
    assert_eq!(t.expression, first);
}

#[test]
fn test_batch_is_one_to_one_and_ordered() {
    let calcs: Vec<CalculationDescriptor> = (0..64)
        .map(|i| CalculationDescriptor {
            name: format!("m{}", i),
            formula: if i % 7 == 0 {
                "((broken".to_string()
            } else {
                format!("SUM([F{}])", i)
            },
            data_type: SourceDataType::Integer,
            data_source: Some("T".to_string()),
        })
        .collect();

    let out = translate_all(&calcs, None);
    assert_eq!(out.len(), calcs.len());
    for (i, t) in out.iter().enumerate() {
        assert_eq!(t.name, format!("m{}", i));
        if i % 7 == 0 {
            assert_eq!(t.status, TranslationStatus::Failed);
        } else {
            assert_eq!(t.expression, format!("SUM(T[F{}])", i));
            assert_eq!(t.data_type, TargetDataType::Int64);
        }
    }
}
