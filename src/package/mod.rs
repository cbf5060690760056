//! Output packaging.
//!
//! The conversion result is materialized as four JSON documents: the data
//! model (tables, relationships, measures), the report definition (pages and
//! visuals), the connection manifest, and a metadata summary. They can be
//! written as loose files or packed into a single zip container.
//!
//! This module also handles `.twbx` input: a packaged workbook is a zip
//! archive with the workbook XML inside.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::formula::Translation;
use crate::layout::ReportPage;
use crate::schema::TargetSchema;

/// Errors from reading or writing packaged artifacts.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("packaged workbook contains no .twb entry")]
    MissingWorkbook,
}

// ============================================================================
// Documents
// ============================================================================

/// The four output documents of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocuments {
    pub data_model: Value,
    pub report: Value,
    pub connections: Value,
    pub metadata: Value,
}

impl ReportDocuments {
    /// File name and content of each document, in a fixed order.
    pub fn entries(&self) -> [(&'static str, &Value); 4] {
        [
            ("DataModel.json", &self.data_model),
            ("Report.json", &self.report),
            ("Connections.json", &self.connections),
            ("Metadata.json", &self.metadata),
        ]
    }
}

/// Assemble the output documents from the converted parts.
pub fn build_documents(
    name: &str,
    schema: &TargetSchema,
    measures: &[Translation],
    pages: &[ReportPage],
) -> Result<ReportDocuments, PackageError> {
    let needs_review: Vec<&str> = measures
        .iter()
        .filter(|m| m.needs_review)
        .map(|m| m.name.as_str())
        .collect();

    let connections: Vec<Value> = schema
        .tables
        .iter()
        .map(|t| {
            Ok(json!({
                "table": t.name,
                "source": serde_json::to_value(&t.source)?,
            }))
        })
        .collect::<Result<_, PackageError>>()?;

    Ok(ReportDocuments {
        data_model: json!({
            "name": name,
            "tables": schema.tables,
            "relationships": schema.relationships,
            "measures": measures,
        }),
        report: json!({
            "name": name,
            "pages": pages,
        }),
        connections: json!({
            "connections": connections,
        }),
        metadata: json!({
            "generator": env!("CARGO_PKG_NAME"),
            "generatorVersion": env!("CARGO_PKG_VERSION"),
            "sourceWorkbook": name,
            "tableCount": schema.tables.len(),
            "measureCount": measures.len(),
            "pageCount": pages.len(),
            "needsReview": needs_review,
        }),
    })
}

// ============================================================================
// Writing
// ============================================================================

/// Write the documents as loose files into `dir`. The directory is created
/// if missing.
pub fn write_documents(dir: &Path, docs: &ReportDocuments) -> Result<(), PackageError> {
    std::fs::create_dir_all(dir)?;
    for (file_name, value) in docs.entries() {
        let path = dir.join(file_name);
        let mut file = File::create(&path)?;
        serde_json::to_writer_pretty(&mut file, value)?;
        file.write_all(b"\n")?;
    }
    info!(dir = %dir.display(), "documents written");
    Ok(())
}

/// Pack the documents into a single zip container at `path`.
pub fn pack(path: &Path, docs: &ReportDocuments) -> Result<(), PackageError> {
    let file = File::create(path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for (file_name, value) in docs.entries() {
        writer.start_file(file_name, options)?;
        let text = serde_json::to_string_pretty(value)?;
        writer.write_all(text.as_bytes())?;
    }
    writer.finish()?;
    info!(path = %path.display(), "container packed");
    Ok(())
}

// ============================================================================
// Input
// ============================================================================

/// Read workbook XML from a `.twb` or `.twbx` path, deciding by extension.
pub fn read_workbook_xml(path: &Path) -> Result<String, PackageError> {
    let packaged = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("twbx"))
        .unwrap_or(false);
    if packaged {
        unpack_twbx(path)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Extract the workbook XML from a packaged `.twbx` archive. The first
/// `.twb` entry wins; packaged workbooks carry exactly one.
pub fn unpack_twbx(path: &Path) -> Result<String, PackageError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let entry_name = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|e| e.name().to_string()))
        .find(|name| name.to_ascii_lowercase().ends_with(".twb"))
        .ok_or(PackageError::MissingWorkbook)?;

    let mut entry = archive.by_name(&entry_name)?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}
