//! End-to-end conversion pipeline.
//!
//! `convert_workbook` runs the full chain: extract the IR, then build the
//! schema, translate the formulas and map the visuals, then lay out pages
//! and assemble the output documents. The three middle stages consume
//! disjoint slices of the IR, so they run concurrently.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::diag::Diagnostic;
use crate::extract::{self, ExtractError};
use crate::formula::{self, Translation, TranslationStatus};
use crate::ir::WorkbookIR;
use crate::layout::{self, ReportPage};
use crate::package::{self, PackageError, ReportDocuments};
use crate::schema::{self, TargetSchema};
use crate::visuals::{self, VisualConfig};

/// Errors that abort a conversion. Per-item problems (a bad join clause, a
/// formula that will not parse) are diagnostics on the result instead.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Conversion settings.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    name: Option<String>,
    default_table: Option<String>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used for the generated report model. Defaults to "Workbook".
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Table that unqualified field references bind to, overriding the
    /// single-data-source inference.
    pub fn with_default_table(mut self, table: impl Into<String>) -> Self {
        self.default_table = Some(table.into());
        self
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("Workbook")
    }
}

/// The complete result of one conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub ir: WorkbookIR,
    pub schema: TargetSchema,
    pub measures: Vec<Translation>,
    pub visuals: Vec<VisualConfig>,
    pub pages: Vec<ReportPage>,
    pub documents: ReportDocuments,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// True when no diagnostic is an error.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.iter().all(|d| !d.is_error())
    }
}

/// Convert workbook XML into a report model.
pub fn convert_workbook(xml: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let ir = extract::extract(xml)?;

    // Unqualified fields bind to the configured table, else to the only
    // data source when there is exactly one; otherwise each calculation
    // must name its own.
    let default_table = options
        .default_table
        .as_deref()
        .or(match ir.data_sources.as_slice() {
            [only] => Some(only.name.as_str()),
            _ => None,
        });

    let ((schema_out, measures), visuals_out) = rayon::join(
        || {
            rayon::join(
                || schema::build(&ir),
                || formula::translate_all(&ir.calculations, default_table),
            )
        },
        || visuals::map_workbook(&ir),
    );

    let layout_out = layout::build_pages(&ir, &visuals_out.visuals);

    let mut diagnostics = schema_out.diagnostics;
    diagnostics.extend(visuals_out.diagnostics);
    diagnostics.extend(layout_out.diagnostics);
    for measure in &measures {
        if measure.status == TranslationStatus::Failed {
            diagnostics.push(Diagnostic::error(
                measure.name.as_str(),
                format!("translation failed: {}", measure.notes.join("; ")),
            ));
        } else if measure.needs_review {
            diagnostics.push(Diagnostic::warning(
                measure.name.as_str(),
                format!("needs review: {}", measure.notes.join("; ")),
            ));
        }
    }

    let documents = package::build_documents(
        options.name(),
        &schema_out.schema,
        &measures,
        &layout_out.pages,
    )?;

    info!(
        tables = schema_out.schema.tables.len(),
        measures = measures.len(),
        visuals = visuals_out.visuals.len(),
        pages = layout_out.pages.len(),
        diagnostics = diagnostics.len(),
        "conversion finished"
    );

    Ok(Conversion {
        ir,
        schema: schema_out.schema,
        measures,
        visuals: visuals_out.visuals,
        pages: layout_out.pages,
        documents,
        diagnostics,
    })
}

/// Convert a workbook file (`.twb` or packaged `.twbx`).
///
/// When no name was set in the options, the file stem becomes the report
/// name.
pub fn convert_path(path: &Path, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let xml = package::read_workbook_xml(path)?;
    let options = match (&options.name, path.file_stem().and_then(|s| s.to_str())) {
        (None, Some(stem)) => options.clone().with_name(stem),
        _ => options.clone(),
    };
    convert_workbook(&xml, &options)
}
