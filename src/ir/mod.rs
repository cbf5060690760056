//! Intermediate representation of a Tableau workbook.
//!
//! The [`WorkbookIR`] is the vendor-neutral model produced by the metadata
//! extractor. It is immutable once built; the downstream stages (formula
//! transpiler, data model builder, visual mapping engine) each consume a
//! disjoint slice of it.

// ============================================================================
// Root
// ============================================================================

/// The complete intermediate representation of one workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkbookIR {
    /// Worksheets in declaration order.
    pub worksheets: Vec<WorksheetDescriptor>,
    /// Calculated fields in declaration order. Duplicate names are kept as
    /// distinct entries and translated independently.
    pub calculations: Vec<CalculationDescriptor>,
    /// Data sources in declaration order. Names are unique per workbook.
    pub data_sources: Vec<DataSourceDescriptor>,
    /// Join relationships in declaration order.
    pub relationships: Vec<RelationshipDescriptor>,
    /// Dashboards in declaration order.
    pub dashboards: Vec<DashboardDescriptor>,
}

// ============================================================================
// Data sources
// ============================================================================

/// A data source definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceDescriptor {
    /// Data source name (unique within the workbook).
    pub name: String,
    /// Connection settings. Never carries raw secrets, only a
    /// credentials reference (username).
    pub connection: ConnectionDescriptor,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDescriptor>,
}

/// Connection settings for a data source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionDescriptor {
    /// Connection kind tag (e.g. "sqlserver", "postgres", "excel-direct").
    pub kind: String,
    /// Server host, if any.
    pub server: String,
    /// Database name, or file path for file-based sources.
    pub database: String,
    /// Credentials reference (username), never a password.
    pub username: String,
}

/// A column within a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Source column name.
    pub name: String,
    /// Display caption; empty if none was declared.
    pub caption: String,
    /// Declared data type.
    pub data_type: SourceDataType,
}

impl ColumnDescriptor {
    /// The name shown to the user: caption when present, source name otherwise.
    pub fn display_name(&self) -> &str {
        if self.caption.is_empty() {
            &self.name
        } else {
            &self.caption
        }
    }
}

/// Source data type tags.
///
/// Unrecognized tags default to [`SourceDataType::String`]; the extractor
/// never fails on an unknown type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceDataType {
    Integer,
    Real,
    #[default]
    String,
    Boolean,
    Date,
    DateTime,
}

impl SourceDataType {
    /// Parse a data type tag. Unknown tags map to `String`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "integer" => SourceDataType::Integer,
            "real" => SourceDataType::Real,
            "string" => SourceDataType::String,
            "boolean" => SourceDataType::Boolean,
            "date" => SourceDataType::Date,
            "datetime" => SourceDataType::DateTime,
            _ => SourceDataType::String,
        }
    }
}

impl std::fmt::Display for SourceDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceDataType::Integer => write!(f, "integer"),
            SourceDataType::Real => write!(f, "real"),
            SourceDataType::String => write!(f, "string"),
            SourceDataType::Boolean => write!(f, "boolean"),
            SourceDataType::Date => write!(f, "date"),
            SourceDataType::DateTime => write!(f, "datetime"),
        }
    }
}

// ============================================================================
// Relationships
// ============================================================================

/// A join relationship between data sources.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipDescriptor {
    /// Join kind.
    pub kind: JoinKind,
    /// Join clauses in declaration order.
    pub clauses: Vec<JoinClause>,
}

/// A single join clause: `lhs op rhs` with qualified `table.column` sides.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Left qualified field, e.g. "Orders.CustomerID".
    pub lhs: String,
    /// Right qualified field, e.g. "Customers.ID".
    pub rhs: String,
    /// Join operator, "=" unless declared otherwise.
    pub operator: String,
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Outer,
}

impl JoinKind {
    /// Parse a join kind tag. Unknown tags map to `Inner`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "inner" => JoinKind::Inner,
            "left" => JoinKind::Left,
            "right" => JoinKind::Right,
            "outer" | "full" => JoinKind::Outer,
            _ => JoinKind::Inner,
        }
    }
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "inner"),
            JoinKind::Left => write!(f, "left"),
            JoinKind::Right => write!(f, "right"),
            JoinKind::Outer => write!(f, "outer"),
        }
    }
}

// ============================================================================
// Calculations
// ============================================================================

/// A calculated field.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationDescriptor {
    /// Calculation name. Uniqueness is not enforced by the source format.
    pub name: String,
    /// Raw formula text in the Tableau expression language.
    pub formula: String,
    /// Declared result data type.
    pub data_type: SourceDataType,
    /// Name of the data source the calculation was declared under, if the
    /// calculation element sat inside a datasource element.
    pub data_source: Option<String>,
}

// ============================================================================
// Worksheets and visualizations
// ============================================================================

/// A worksheet and its visual content.
#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetDescriptor {
    /// Worksheet name.
    pub name: String,
    /// Visualizations in declaration order.
    pub visualizations: Vec<VisualizationDescriptor>,
    /// Filters in declaration order.
    pub filters: Vec<FilterDescriptor>,
    /// Names of fields the worksheet references.
    pub fields: Vec<String>,
}

/// A single visualization (pane) within a worksheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualizationDescriptor {
    /// Source mark type tag (e.g. "bar", "line", "automatic").
    pub mark_type: String,
    /// Mark-role mapping: role name → field name (e.g. "columns" → field).
    pub marks: Vec<(String, String)>,
    /// Encoding mapping: encoding name → field name (e.g. "color" → field).
    pub encodings: Vec<(String, String)>,
}

impl VisualizationDescriptor {
    /// Look up a mark role by name.
    pub fn mark(&self, role: &str) -> Option<&str> {
        self.marks
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, f)| f.as_str())
    }

    /// Look up an encoding by name.
    pub fn encoding(&self, name: &str) -> Option<&str> {
        self.encodings
            .iter()
            .find(|(e, _)| e == name)
            .map(|(_, f)| f.as_str())
    }

    /// All bound field names across mark roles and encodings.
    pub fn bound_fields(&self) -> impl Iterator<Item = &str> {
        self.marks
            .iter()
            .map(|(_, f)| f.as_str())
            .chain(self.encodings.iter().map(|(_, f)| f.as_str()))
    }
}

/// A worksheet filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDescriptor {
    /// Filtered field name.
    pub field: String,
    /// Filter kind.
    pub kind: FilterKind,
    /// Literal filter values as text; type coercion is deferred to the
    /// consumer.
    pub values: Vec<String>,
}

/// Filter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    #[default]
    Categorical,
    Quantitative,
    RelativeDate,
    Boolean,
}

impl FilterKind {
    /// Parse a filter kind tag. Unknown tags map to `Categorical`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "categorical" => FilterKind::Categorical,
            "quantitative" => FilterKind::Quantitative,
            "relative-date" | "relative_date" => FilterKind::RelativeDate,
            "boolean" => FilterKind::Boolean,
            _ => FilterKind::Categorical,
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterKind::Categorical => write!(f, "categorical"),
            FilterKind::Quantitative => write!(f, "quantitative"),
            FilterKind::RelativeDate => write!(f, "relative-date"),
            FilterKind::Boolean => write!(f, "boolean"),
        }
    }
}

// ============================================================================
// Dashboards
// ============================================================================

/// A dashboard and its layout zones.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDescriptor {
    /// Dashboard name.
    pub name: String,
    /// Canvas size in pixels. Defaults to 1000×800 when undeclared.
    pub size: CanvasSize,
    /// Zones in declaration order.
    pub zones: Vec<ZoneDescriptor>,
}

/// Dashboard canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        CanvasSize {
            width: 1000,
            height: 800,
        }
    }
}

/// A placed item on a dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDescriptor {
    /// What the zone contains.
    pub kind: ZoneKind,
    /// Name of the referenced item (worksheet name for worksheet zones).
    pub name: String,
    /// Position and size on the canvas.
    pub position: ZonePosition,
}

/// Zone content kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneKind {
    /// Hosts a worksheet visual.
    Worksheet,
    /// Static text.
    Text,
    /// A filter control.
    Filter,
    /// Empty spacer.
    Blank,
    /// Anything else.
    #[default]
    Unknown,
}

impl ZoneKind {
    /// Parse a zone kind tag. Unknown tags map to `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "worksheet" => ZoneKind::Worksheet,
            "text" => ZoneKind::Text,
            "filter" => ZoneKind::Filter,
            "blank" => ZoneKind::Blank,
            _ => ZoneKind::Unknown,
        }
    }
}

/// Zone position on the dashboard canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonePosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ZonePosition {
    fn default() -> Self {
        ZonePosition {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 200.0,
        }
    }
}
