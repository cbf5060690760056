//! Integration tests for workbook metadata extraction.
//!
//! These exercise the extractor against a realistic workbook document
//! covering all five entity kinds at once, plus the sparse-input defaults.

use prism::extract::extract;
use prism::ir::{FilterKind, JoinKind, SourceDataType, ZoneKind};

const WORKBOOK: &str = r#"
<workbook xmlns="http://www.tableausoftware.com/xml/tableau">
  <datasources>
    <datasource name="Superstore">
      <connection class="postgres" server="db.internal" dbname="superstore" username="analyst"/>
      <column name="region" caption="Region" datatype="string"/>
      <column name="sales" caption="Sales" datatype="real"/>
      <column name="order_date" caption="Order Date" datatype="date"/>
      <column name="quantity" datatype="integer"/>
      <calculation name="Profit Ratio" formula="SUM([Profit]) / SUM([Sales])" datatype="real"/>
      <relation type="left">
        <clause lhs="Orders.CustomerID" rhs="Customers.ID" op="="/>
      </relation>
    </datasource>
    <datasource name="Customers">
      <connection class="excel-direct" dbname="customers.xlsx"/>
      <column name="id" datatype="integer"/>
    </datasource>
  </datasources>
  <worksheets>
    <worksheet name="Sales by Region">
      <pane>
        <mark type="bar">
          <encoding type="columns" field="Region"/>
          <encoding type="rows" field="Sales"/>
        </mark>
        <encoding type="color" field="Region"/>
      </pane>
      <filter field="Region" type="categorical">
        <value>West</value>
        <value>East</value>
      </filter>
      <filter field="Order Date" type="relative-date"/>
    </worksheet>
  </worksheets>
  <dashboards>
    <dashboard name="Overview" maxwidth="1600" maxheight="900">
      <zone type="worksheet" name="Sales by Region" x="40" y="40" width="800" height="500"/>
      <zone type="text" name="Header"/>
    </dashboard>
  </dashboards>
</workbook>
"#;

// ============================================================================
// Full-workbook extraction
// ============================================================================

#[test]
fn test_extracts_all_entity_kinds() {
    let ir = extract(WORKBOOK).expect("workbook should extract");

    assert_eq!(ir.data_sources.len(), 2);
    assert_eq!(ir.calculations.len(), 1);
    assert_eq!(ir.worksheets.len(), 1);
    assert_eq!(ir.relationships.len(), 1);
    assert_eq!(ir.dashboards.len(), 1);
}

#[test]
fn test_data_source_details() {
    let ir = extract(WORKBOOK).unwrap();

    let ds = &ir.data_sources[0];
    assert_eq!(ds.name, "Superstore");
    assert_eq!(ds.connection.kind, "postgres");
    assert_eq!(ds.connection.server, "db.internal");
    assert_eq!(ds.connection.database, "superstore");
    assert_eq!(ds.connection.username, "analyst");

    assert_eq!(ds.columns.len(), 4);
    assert_eq!(ds.columns[0].display_name(), "Region");
    assert_eq!(ds.columns[1].data_type, SourceDataType::Real);
    assert_eq!(ds.columns[2].data_type, SourceDataType::Date);
    // Column without caption falls back to its source name
    assert_eq!(ds.columns[3].display_name(), "quantity");
}

#[test]
fn test_calculation_records_home_data_source() {
    let ir = extract(WORKBOOK).unwrap();

    let calc = &ir.calculations[0];
    assert_eq!(calc.name, "Profit Ratio");
    assert_eq!(calc.formula, "SUM([Profit]) / SUM([Sales])");
    assert_eq!(calc.data_type, SourceDataType::Real);
    assert_eq!(calc.data_source.as_deref(), Some("Superstore"));
}

#[test]
fn test_relationship_clauses() {
    let ir = extract(WORKBOOK).unwrap();

    let rel = &ir.relationships[0];
    assert_eq!(rel.kind, JoinKind::Left);
    assert_eq!(rel.clauses.len(), 1);
    assert_eq!(rel.clauses[0].lhs, "Orders.CustomerID");
    assert_eq!(rel.clauses[0].rhs, "Customers.ID");
    assert_eq!(rel.clauses[0].operator, "=");
}

#[test]
fn test_worksheet_visualization_and_filters() {
    let ir = extract(WORKBOOK).unwrap();

    let ws = &ir.worksheets[0];
    assert_eq!(ws.name, "Sales by Region");

    let viz = &ws.visualizations[0];
    assert_eq!(viz.mark_type, "bar");
    assert_eq!(viz.mark("columns"), Some("Region"));
    assert_eq!(viz.mark("rows"), Some("Sales"));
    assert_eq!(viz.encoding("color"), Some("Region"));

    assert_eq!(ws.filters.len(), 2);
    assert_eq!(ws.filters[0].kind, FilterKind::Categorical);
    assert_eq!(ws.filters[0].values, vec!["West", "East"]);
    assert_eq!(ws.filters[1].kind, FilterKind::RelativeDate);
    assert!(ws.filters[1].values.is_empty());
}

#[test]
fn test_dashboard_zones() {
    let ir = extract(WORKBOOK).unwrap();

    let db = &ir.dashboards[0];
    assert_eq!(db.name, "Overview");
    assert_eq!(db.size.width, 1600);
    assert_eq!(db.size.height, 900);

    assert_eq!(db.zones.len(), 2);
    assert_eq!(db.zones[0].kind, ZoneKind::Worksheet);
    assert_eq!(db.zones[0].position.x, 40.0);
    assert_eq!(db.zones[0].position.width, 800.0);
    assert_eq!(db.zones[1].kind, ZoneKind::Text);
    // Zone without geometry gets the default position
    assert_eq!(db.zones[1].position.width, 200.0);
}

// ============================================================================
// Degenerate inputs
// ============================================================================

#[test]
fn test_malformed_xml_is_rejected() {
    assert!(extract("<workbook><datasource>").is_err());
}

#[test]
fn test_empty_workbook_extracts_empty_ir() {
    let ir = extract("<workbook/>").unwrap();
    assert!(ir.worksheets.is_empty());
    assert!(ir.data_sources.is_empty());
}

#[test]
fn test_unknown_tags_take_defaults() {
    let ir = extract(
        r#"<workbook>
            <datasource name="D">
                <column name="geo" datatype="spatial"/>
            </datasource>
            <relation type="cross">
                <clause lhs="A.x" rhs="B.y"/>
            </relation>
        </workbook>"#,
    )
    .unwrap();

    assert_eq!(ir.data_sources[0].columns[0].data_type, SourceDataType::String);
    assert_eq!(ir.relationships[0].kind, JoinKind::Inner);
}
