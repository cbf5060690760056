//! Visual mapping engine: worksheets → report visual configurations.
//!
//! Mapping runs in two stages. First the ordered rule list is consulted;
//! rules match on the source mark type plus features derived from the bound
//! fields, and the first match wins. When no rule fires, the plain type
//! table decides. The rule list is data, not code: adding a mapping is a new
//! table row, never a new branch.

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::diag::Diagnostic;
use crate::ir::{FilterKind, VisualizationDescriptor, WorkbookIR, WorksheetDescriptor};

// ============================================================================
// Visual types
// ============================================================================

/// Visual types in the target report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualType {
    ColumnChart,
    LineChart,
    PieChart,
    ScatterChart,
    Map,
    Card,
    Table,
    Treemap,
    AreaChart,
    Gantt,
    BoxWhiskerChart,
    HeatMap,
    BubbleChart,
}

/// Direct mark-type lookup, applied when no rule matches.
static TYPE_MAP: &[(&str, VisualType)] = &[
    ("bar", VisualType::ColumnChart),
    ("line", VisualType::LineChart),
    ("pie", VisualType::PieChart),
    ("scatter", VisualType::ScatterChart),
    ("map", VisualType::Map),
    ("text", VisualType::Card),
    ("table", VisualType::Table),
    ("treemap", VisualType::Treemap),
    ("area", VisualType::AreaChart),
    ("gantt", VisualType::Gantt),
    ("boxplot", VisualType::BoxWhiskerChart),
    ("heatmap", VisualType::HeatMap),
    ("bubble", VisualType::BubbleChart),
    ("automatic", VisualType::ColumnChart),
];

// ============================================================================
// Rules
// ============================================================================

/// Features derived from a visualization's bound fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisualFeatures {
    pub has_dimension: bool,
    pub has_measure: bool,
    pub has_date: bool,
    pub has_lat_long: bool,
}

impl VisualFeatures {
    /// Derive features from the mark roles and encodings of a visualization.
    /// Fields are inspected across both, so a date bound only to color still
    /// counts.
    pub fn derive(viz: &VisualizationDescriptor) -> Self {
        let mut features = VisualFeatures {
            has_dimension: viz.mark("columns").is_some(),
            has_measure: viz.mark("rows").is_some(),
            ..Default::default()
        };

        let mut has_lat = false;
        let mut has_long = false;
        for field in viz.bound_fields() {
            let lower = field.to_ascii_lowercase();
            if lower.contains("date") {
                features.has_date = true;
            }
            if lower.contains("latitude") {
                has_lat = true;
            }
            if lower.contains("longitude") {
                has_long = true;
            }
        }
        features.has_lat_long = has_lat && has_long;
        features
    }
}

/// One mapping rule. `None` constraints match anything.
#[derive(Debug, Clone, Copy)]
pub struct MappingRule {
    pub source_type: Option<&'static str>,
    pub has_dimension: Option<bool>,
    pub has_measure: Option<bool>,
    pub has_date: Option<bool>,
    pub has_lat_long: Option<bool>,
    pub target: VisualType,
}

impl MappingRule {
    fn matches(&self, source_type: &str, features: VisualFeatures) -> bool {
        fn check(constraint: Option<bool>, actual: bool) -> bool {
            constraint.is_none() || constraint == Some(actual)
        }
        self.source_type.map_or(true, |t| t == source_type)
            && check(self.has_dimension, features.has_dimension)
            && check(self.has_measure, features.has_measure)
            && check(self.has_date, features.has_date)
            && check(self.has_lat_long, features.has_lat_long)
    }
}

const ANY: MappingRule = MappingRule {
    source_type: None,
    has_dimension: None,
    has_measure: None,
    has_date: None,
    has_lat_long: None,
    target: VisualType::Table,
};

/// The ordered rule list. Evaluated top to bottom, first match wins.
static RULES: Lazy<Vec<MappingRule>> = Lazy::new(|| {
    vec![
        MappingRule {
            source_type: Some("bar"),
            has_dimension: Some(true),
            has_measure: Some(true),
            target: VisualType::ColumnChart,
            ..ANY
        },
        MappingRule {
            source_type: Some("line"),
            has_date: Some(true),
            target: VisualType::LineChart,
            ..ANY
        },
        MappingRule {
            source_type: Some("automatic"),
            has_lat_long: Some(true),
            target: VisualType::Map,
            ..ANY
        },
    ]
});

/// Resolve a mark type and feature set to a target visual type.
///
/// Returns the type and whether the fallback was taken (no rule fired and
/// the mark type was unknown).
pub fn resolve_type(mark_type: &str, features: VisualFeatures) -> (VisualType, bool) {
    let mark = mark_type.to_ascii_lowercase();

    if let Some(rule) = RULES.iter().find(|r| r.matches(&mark, features)) {
        return (rule.target, false);
    }
    if let Some((_, target)) = TYPE_MAP.iter().find(|(tag, _)| *tag == mark) {
        return (*target, false);
    }
    (VisualType::ColumnChart, true)
}

// ============================================================================
// Visual configuration
// ============================================================================

/// A fully mapped visual.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualConfig {
    /// Display name, taken from the worksheet.
    pub name: String,
    pub visual_type: VisualType,
    pub bindings: Vec<FieldBinding>,
    pub filters: Vec<VisualFilter>,
    pub properties: serde_json::Value,
}

/// A field bound to a data role of the visual.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBinding {
    pub field: String,
    pub role: DataRole,
}

/// Data roles of target visuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DataRole {
    Category,
    Value,
    Series,
    Size,
    Legend,
    Values,
}

/// A filter carried over to the visual.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

/// Target filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    In,
    Between,
    RelativeDate,
}

impl FilterOperator {
    fn from_kind(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Categorical | FilterKind::Boolean => FilterOperator::In,
            FilterKind::Quantitative => FilterOperator::Between,
            FilterKind::RelativeDate => FilterOperator::RelativeDate,
        }
    }
}

/// Bind mark roles and encodings to the data roles of the chosen type.
/// Types outside the two binding families take no bindings.
fn bind_fields(viz: &VisualizationDescriptor, target: VisualType) -> Vec<FieldBinding> {
    use VisualType::*;

    let pairs: &[(&str, DataRole)] = match target {
        ColumnChart | LineChart | AreaChart | ScatterChart | BubbleChart => &[
            ("columns", DataRole::Category),
            ("rows", DataRole::Value),
            ("color", DataRole::Series),
            ("size", DataRole::Size),
        ],
        PieChart | Treemap => &[
            ("columns", DataRole::Legend),
            ("color", DataRole::Legend),
            ("rows", DataRole::Values),
            ("size", DataRole::Values),
        ],
        _ => &[],
    };

    let mut bindings = Vec::new();
    for (source_role, role) in pairs {
        let field = viz.mark(source_role).or_else(|| viz.encoding(source_role));
        if let Some(field) = field {
            if !bindings
                .iter()
                .any(|b: &FieldBinding| b.field == field && b.role == *role)
            {
                bindings.push(FieldBinding {
                    field: field.to_string(),
                    role: *role,
                });
            }
        }
    }
    bindings
}

/// Default properties for a visual: a general block plus type-specific
/// settings.
fn default_properties(name: &str, target: VisualType) -> serde_json::Value {
    let mut properties = json!({
        "general": {
            "title": name,
            "legend": true,
        },
    });

    let extra = match target {
        VisualType::ColumnChart => Some((
            "columnChart",
            json!({ "showAxisTitles": true, "showDataLabels": false }),
        )),
        VisualType::PieChart => Some((
            "pieChart",
            json!({ "showDataLabels": true, "showPercentage": true }),
        )),
        _ => None,
    };
    if let Some((key, value)) = extra {
        properties[key] = value;
    }
    properties
}

// ============================================================================
// Entry points
// ============================================================================

/// Mapped visuals plus diagnostics for one or more worksheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingOutcome {
    pub visuals: Vec<VisualConfig>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Map all visualizations of one worksheet.
pub fn map_worksheet(worksheet: &WorksheetDescriptor) -> MappingOutcome {
    let mut outcome = MappingOutcome::default();

    for (index, viz) in worksheet.visualizations.iter().enumerate() {
        let features = VisualFeatures::derive(viz);
        let (visual_type, fallback) = resolve_type(&viz.mark_type, features);

        if fallback {
            outcome.diagnostics.push(Diagnostic::warning(
                "visuals",
                format!(
                    "worksheet {}: unknown mark type {:?}, using a column chart",
                    worksheet.name, viz.mark_type
                ),
            ));
        }

        let name = if index == 0 {
            worksheet.name.clone()
        } else {
            format!("{} ({})", worksheet.name, index + 1)
        };

        let filters = worksheet
            .filters
            .iter()
            .map(|f| VisualFilter {
                field: f.field.clone(),
                operator: FilterOperator::from_kind(f.kind),
                values: f.values.clone(),
            })
            .collect();

        debug!(worksheet = %worksheet.name, ?visual_type, "visual mapped");

        outcome.visuals.push(VisualConfig {
            properties: default_properties(&name, visual_type),
            bindings: bind_fields(viz, visual_type),
            name,
            visual_type,
            filters,
        });
    }

    outcome
}

/// Map every worksheet in the workbook, in declaration order.
pub fn map_workbook(ir: &WorkbookIR) -> MappingOutcome {
    let mut outcome = MappingOutcome::default();
    for worksheet in &ir.worksheets {
        let mut mapped = map_worksheet(worksheet);
        outcome.visuals.append(&mut mapped.visuals);
        outcome.diagnostics.append(&mut mapped.diagnostics);
    }
    outcome
}
