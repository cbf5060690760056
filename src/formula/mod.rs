//! Formula translation: Tableau calculation language → DAX.
//!
//! The pipeline is lex → parse → rewrite → render. Formulas are parsed into
//! a real expression tree before any rewriting happens; nothing in this
//! module touches the formula text with string substitution.
//!
//! Every calculation produces exactly one [`Translation`]. A formula that
//! fails to parse still yields a translation, with a commented placeholder
//! expression and [`TranslationStatus::Failed`], so downstream consumers can
//! count on a 1:1 correspondence with their inputs.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod rewrite;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::ir::CalculationDescriptor;
use crate::schema::TargetDataType;

// ============================================================================
// Translation result
// ============================================================================

/// Whether a formula translated cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TranslationStatus {
    Ok,
    Failed,
}

/// The DAX measure produced from one Tableau calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Measure name, taken from the calculation's caption.
    pub name: String,
    /// DAX expression text, or the failure placeholder.
    pub expression: String,
    pub data_type: TargetDataType,
    pub status: TranslationStatus,
    /// Set when field references could not be bound or when a construct
    /// translated only partially.
    pub needs_review: bool,
    /// Human-readable review notes.
    pub notes: Vec<String>,
}

impl Translation {
    pub fn is_ok(&self) -> bool {
        self.status == TranslationStatus::Ok
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Translate one calculation into a DAX measure.
///
/// `default_table` binds unqualified field references when the calculation
/// does not name its own data source. Never fails: parse errors produce a
/// placeholder measure marked [`TranslationStatus::Failed`].
pub fn translate(calc: &CalculationDescriptor, default_table: Option<&str>) -> Translation {
    let home = calc.data_source.as_deref().or(default_table);

    let expr = match parser::parse(&calc.formula) {
        Ok(expr) => expr,
        Err(err) => {
            warn!(calculation = %calc.name, %err, "formula translation failed");
            return Translation {
                name: calc.name.clone(),
                expression: failure_placeholder(&calc.formula, &err),
                data_type: TargetDataType::Double,
                status: TranslationStatus::Failed,
                needs_review: true,
                notes: vec![err.to_string()],
            };
        }
    };

    let outcome = rewrite::rewrite(expr, home);
    let expression = render::render(&outcome.expr);

    let mut notes = outcome.notes;
    for field in &outcome.unresolved {
        notes.push(format!("field [{}] could not be bound to a table", field));
    }
    let needs_review = !notes.is_empty();

    debug!(calculation = %calc.name, %expression, needs_review, "formula translated");

    Translation {
        name: calc.name.clone(),
        expression,
        data_type: TargetDataType::from_source(calc.data_type),
        status: TranslationStatus::Ok,
        needs_review,
        notes,
    }
}

/// Translate a batch of calculations, one [`Translation`] per input in the
/// same order. Translations are independent, so the batch runs in parallel.
pub fn translate_all(
    calculations: &[CalculationDescriptor],
    default_table: Option<&str>,
) -> Vec<Translation> {
    calculations
        .par_iter()
        .map(|calc| translate(calc, default_table))
        .collect()
}

/// Placeholder expression for a formula that could not be translated. Valid
/// DAX (a constant with leading comments) so the report model stays loadable.
fn failure_placeholder(formula: &str, err: &parser::ParseError) -> String {
    format!(
        "/* Translation failed. Original formula: {} */\n/* Error: {} */\n0",
        formula, err
    )
}
