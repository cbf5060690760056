//! Metadata extraction from Tableau workbook XML.
//!
//! A single pass over the parsed document collects the five entity kinds
//! (worksheets, calculations, data sources, relationships, dashboards) into
//! a [`WorkbookIR`]. The only fatal condition is a document that is not
//! well-formed XML; every optional attribute or missing sub-element has a
//! documented default, so extraction never fails on sparse input.
//!
//! Tag names are matched by local name so the extractor works both with
//! namespaced (`xmlns`) and plain workbook documents.

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{debug, info};

use crate::ir::{
    CalculationDescriptor, CanvasSize, ColumnDescriptor, ConnectionDescriptor,
    DashboardDescriptor, DataSourceDescriptor, FilterDescriptor, FilterKind, JoinClause, JoinKind,
    RelationshipDescriptor, SourceDataType, VisualizationDescriptor, WorkbookIR,
    WorksheetDescriptor, ZoneDescriptor, ZoneKind, ZonePosition,
};

/// Errors that can occur during extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("workbook is not well-formed XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),
}

/// Extract the intermediate representation from workbook XML.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedXml`] if the document cannot be parsed
/// or lacks a root element. Missing optional content is never an error.
pub fn extract(xml: &str) -> Result<WorkbookIR, ExtractError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let ir = WorkbookIR {
        worksheets: extract_worksheets(root),
        calculations: extract_calculations(root),
        data_sources: extract_data_sources(root),
        relationships: extract_relationships(root),
        dashboards: extract_dashboards(root),
    };

    info!(
        worksheets = ir.worksheets.len(),
        calculations = ir.calculations.len(),
        data_sources = ir.data_sources.len(),
        relationships = ir.relationships.len(),
        dashboards = ir.dashboards.len(),
        "extracted workbook metadata"
    );

    Ok(ir)
}

// ============================================================================
// Element helpers
// ============================================================================

/// Elements below `node` (excluding `node` itself) with the given local name.
fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == name && n != &node)
}

/// First descendant element with the given local name.
fn first_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name && n != &node)
}

/// Attribute value with an empty-string default.
fn attr(node: Node<'_, '_>, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

/// Attribute parsed as a number, falling back to a default.
fn attr_f64(node: Node<'_, '_>, name: &str, default: f64) -> f64 {
    node.attribute(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn attr_u32(node: Node<'_, '_>, name: &str, default: u32) -> u32 {
    node.attribute(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Worksheets
// ============================================================================

fn extract_worksheets(root: Node<'_, '_>) -> Vec<WorksheetDescriptor> {
    elements(root, "worksheet")
        .map(|ws| WorksheetDescriptor {
            name: attr(ws, "name"),
            visualizations: elements(ws, "pane").map(extract_visualization).collect(),
            filters: elements(ws, "filter").map(extract_filter).collect(),
            fields: elements(ws, "field").map(|f| attr(f, "name")).collect(),
        })
        .collect()
}

fn extract_visualization(pane: Node<'_, '_>) -> VisualizationDescriptor {
    let mark = first_element(pane, "mark");
    let mark_type = mark
        .and_then(|m| m.attribute("type"))
        .unwrap_or("automatic")
        .to_string();

    // Encodings nested under the mark element carry the mark roles
    // (columns, rows, ...); encodings elsewhere in the pane are the visual
    // channels (color, size, ...).
    let marks = mark
        .map(|m| {
            elements(m, "encoding")
                .map(|e| (attr(e, "type"), attr(e, "field")))
                .collect()
        })
        .unwrap_or_default();

    let encodings = elements(pane, "encoding")
        .filter(|e| {
            !e.ancestors()
                .any(|a| a.is_element() && a.tag_name().name() == "mark")
        })
        .map(|e| (attr(e, "type"), attr(e, "field")))
        .collect();

    VisualizationDescriptor {
        mark_type,
        marks,
        encodings,
    }
}

fn extract_filter(filter: Node<'_, '_>) -> FilterDescriptor {
    FilterDescriptor {
        field: attr(filter, "field"),
        kind: FilterKind::from_tag(&attr(filter, "type")),
        values: elements(filter, "value")
            .filter_map(|v| v.text().map(str::to_string))
            .collect(),
    }
}

// ============================================================================
// Calculations
// ============================================================================

fn extract_calculations(root: Node<'_, '_>) -> Vec<CalculationDescriptor> {
    elements(root, "calculation")
        .filter_map(|calc| {
            let name = attr(calc, "name");
            let formula = attr(calc, "formula");
            // Entries without a name or formula carry nothing translatable.
            if name.is_empty() || formula.is_empty() {
                debug!("skipping calculation element without name/formula");
                return None;
            }
            Some(CalculationDescriptor {
                name,
                formula,
                data_type: SourceDataType::from_tag(&attr(calc, "datatype")),
                data_source: home_data_source(calc),
            })
        })
        .collect()
}

/// Name of the nearest enclosing datasource element, if any.
fn home_data_source(node: Node<'_, '_>) -> Option<String> {
    node.ancestors()
        .find(|a| a.is_element() && a.tag_name().name() == "datasource")
        .and_then(|ds| ds.attribute("name"))
        .map(str::to_string)
}

// ============================================================================
// Data sources
// ============================================================================

fn extract_data_sources(root: Node<'_, '_>) -> Vec<DataSourceDescriptor> {
    elements(root, "datasource")
        .map(|ds| DataSourceDescriptor {
            name: attr(ds, "name"),
            connection: first_element(ds, "connection")
                .map(|conn| ConnectionDescriptor {
                    kind: attr(conn, "class"),
                    server: attr(conn, "server"),
                    database: attr(conn, "dbname"),
                    username: attr(conn, "username"),
                })
                .unwrap_or_default(),
            columns: elements(ds, "column")
                .map(|col| ColumnDescriptor {
                    name: attr(col, "name"),
                    caption: attr(col, "caption"),
                    data_type: SourceDataType::from_tag(&attr(col, "datatype")),
                })
                .collect(),
        })
        .collect()
}

// ============================================================================
// Relationships
// ============================================================================

fn extract_relationships(root: Node<'_, '_>) -> Vec<RelationshipDescriptor> {
    elements(root, "relation")
        .map(|rel| RelationshipDescriptor {
            kind: JoinKind::from_tag(&attr(rel, "type")),
            clauses: elements(rel, "clause")
                .map(|clause| JoinClause {
                    lhs: attr(clause, "lhs"),
                    rhs: attr(clause, "rhs"),
                    operator: clause.attribute("op").unwrap_or("=").to_string(),
                })
                .collect(),
        })
        .collect()
}

// ============================================================================
// Dashboards
// ============================================================================

fn extract_dashboards(root: Node<'_, '_>) -> Vec<DashboardDescriptor> {
    elements(root, "dashboard")
        .map(|db| DashboardDescriptor {
            name: attr(db, "name"),
            size: CanvasSize {
                width: attr_u32(db, "maxwidth", 1000),
                height: attr_u32(db, "maxheight", 800),
            },
            zones: elements(db, "zone")
                .map(|zone| ZoneDescriptor {
                    kind: ZoneKind::from_tag(&attr(zone, "type")),
                    name: attr(zone, "name"),
                    position: ZonePosition {
                        x: attr_f64(zone, "x", 0.0),
                        y: attr_f64(zone, "y", 0.0),
                        width: attr_f64(zone, "width", 200.0),
                        height: attr_f64(zone, "height", 200.0),
                    },
                })
                .collect(),
        })
        .collect()
}
