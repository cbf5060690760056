//! Data model builder: data sources and joins → relational target schema.
//!
//! Tables come from data source columns, relationships from join clauses.
//! The builder never fails outright; malformed joins and unknown endpoints
//! are dropped with a diagnostic so one bad clause cannot sink the schema.

use serde::Serialize;
use tracing::info;

use crate::diag::Diagnostic;
use crate::ir::{DataSourceDescriptor, SourceDataType, WorkbookIR};

// ============================================================================
// Target model
// ============================================================================

/// The relational schema of the target report model.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TargetSchema {
    pub tables: Vec<TargetTable>,
    pub relationships: Vec<TargetRelationship>,
}

impl TargetSchema {
    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&TargetTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// A table in the target schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetTable {
    pub name: String,
    pub source: TableSource,
    pub columns: Vec<TargetColumn>,
}

/// Where a table's data comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TableSource {
    /// A relational database connection.
    Database {
        provider: String,
        server: String,
        database: String,
    },
    /// A file-based source (Excel, CSV).
    File { path: String },
    /// Anything else; the source tag is carried through untouched.
    Generic {
        kind: String,
        server: String,
        database: String,
    },
}

/// A column in a target table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetColumn {
    /// Display name (caption when the source declared one).
    pub name: String,
    pub data_type: TargetDataType,
    /// The underlying source column name.
    pub source_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_string: Option<String>,
}

/// A relationship between two target tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRelationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub cardinality: Cardinality,
    pub cross_filter_direction: CrossFilterDirection,
}

/// Relationship cardinality. Join metadata does not carry key information,
/// so every derived relationship defaults to many-to-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    #[default]
    ManyToOne,
    OneToMany,
    OneToOne,
    ManyToMany,
}

/// Cross-filter direction. Defaults to both directions, matching the
/// symmetric filtering behavior of the source joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CrossFilterDirection {
    OneDirection,
    #[default]
    BothDirections,
}

/// Target column data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetDataType {
    Int64,
    Double,
    String,
    Boolean,
    DateTime,
}

impl TargetDataType {
    /// Map a source type to its target type. Date and datetime collapse into
    /// one target type; the format string keeps them apart.
    pub fn from_source(source: SourceDataType) -> Self {
        match source {
            SourceDataType::Integer => TargetDataType::Int64,
            SourceDataType::Real => TargetDataType::Double,
            SourceDataType::String => TargetDataType::String,
            SourceDataType::Boolean => TargetDataType::Boolean,
            SourceDataType::Date | SourceDataType::DateTime => TargetDataType::DateTime,
        }
    }
}

/// Default display format for a column, keyed on the source type.
fn format_string(source: SourceDataType) -> Option<&'static str> {
    match source {
        SourceDataType::Integer => Some("#,0"),
        SourceDataType::Real => Some("#,0.00"),
        SourceDataType::Date => Some("MM/dd/yyyy"),
        SourceDataType::DateTime => Some("MM/dd/yyyy hh:mm:ss"),
        SourceDataType::String | SourceDataType::Boolean => None,
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Schema plus the diagnostics accumulated while building it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaOutcome {
    pub schema: TargetSchema,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the target schema from the workbook IR.
pub fn build(ir: &WorkbookIR) -> SchemaOutcome {
    let mut diagnostics = Vec::new();

    let tables: Vec<TargetTable> = ir.data_sources.iter().map(build_table).collect();

    let mut relationships = Vec::new();
    for rel in &ir.relationships {
        for clause in &rel.clauses {
            let (from, to) = match (split_qualified(&clause.lhs), split_qualified(&clause.rhs)) {
                (Some(from), Some(to)) => (from, to),
                _ => {
                    diagnostics.push(Diagnostic::warning(
                        "schema",
                        format!(
                            "dropping malformed join clause {} {} {}",
                            clause.lhs, clause.operator, clause.rhs
                        ),
                    ));
                    continue;
                }
            };

            let mut known = true;
            for (table, column) in [from, to] {
                match tables.iter().find(|t| t.name == table) {
                    None => {
                        diagnostics.push(Diagnostic::warning(
                            "schema",
                            format!("join references unknown table {}", table),
                        ));
                        known = false;
                    }
                    Some(t) => {
                        let exists = t
                            .columns
                            .iter()
                            .any(|c| c.name == column || c.source_column == column);
                        if !exists {
                            diagnostics.push(Diagnostic::warning(
                                "schema",
                                format!("join references unknown column {}.{}", table, column),
                            ));
                            known = false;
                        }
                    }
                }
            }
            if !known {
                continue;
            }

            relationships.push(TargetRelationship {
                from_table: from.0.to_string(),
                from_column: from.1.to_string(),
                to_table: to.0.to_string(),
                to_column: to.1.to_string(),
                cardinality: Cardinality::default(),
                cross_filter_direction: CrossFilterDirection::default(),
            });
        }
    }

    info!(
        tables = tables.len(),
        relationships = relationships.len(),
        "schema built"
    );

    SchemaOutcome {
        schema: TargetSchema {
            tables,
            relationships,
        },
        diagnostics,
    }
}

fn build_table(ds: &DataSourceDescriptor) -> TargetTable {
    let columns = ds
        .columns
        .iter()
        .map(|col| TargetColumn {
            name: col.display_name().to_string(),
            data_type: TargetDataType::from_source(col.data_type),
            source_column: col.name.clone(),
            format_string: format_string(col.data_type).map(str::to_string),
        })
        .collect();

    TargetTable {
        name: ds.name.clone(),
        source: classify_connection(ds),
        columns,
    }
}

/// Classify a connection by its kind tag. Checks are ordered so that more
/// specific database tags win over the file fallbacks.
fn classify_connection(ds: &DataSourceDescriptor) -> TableSource {
    let conn = &ds.connection;
    let kind = conn.kind.to_ascii_lowercase();

    let provider = [
        ("oracle", "Oracle"),
        ("mysql", "MySQL"),
        ("sqlserver", "SqlServer"),
        ("postgres", "PostgreSQL"),
    ]
    .iter()
    .find(|(tag, _)| kind.contains(tag))
    .map(|(_, provider)| *provider);

    if let Some(provider) = provider {
        return TableSource::Database {
            provider: provider.to_string(),
            server: conn.server.clone(),
            database: conn.database.clone(),
        };
    }

    if kind.contains("excel") || kind.contains("csv") {
        return TableSource::File {
            path: conn.database.clone(),
        };
    }

    TableSource::Generic {
        kind: conn.kind.clone(),
        server: conn.server.clone(),
        database: conn.database.clone(),
    }
}

/// Split "Table.Column" into its parts. The column side may itself contain
/// dots, so only the first dot splits.
fn split_qualified(field: &str) -> Option<(&str, &str)> {
    let (table, column) = field.split_once('.')?;
    if table.is_empty() || column.is_empty() {
        return None;
    }
    Some((table, column))
}
