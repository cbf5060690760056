//! Integration tests for the data model builder.

use prism::extract::extract;
use prism::schema::{build, Cardinality, CrossFilterDirection, TableSource, TargetDataType};

const WORKBOOK: &str = r#"
<workbook>
  <datasource name="Orders">
    <connection class="sqlserver" server="sql01" dbname="sales" username="svc"/>
    <column name="order_id" caption="Order ID" datatype="integer"/>
    <column name="amount" caption="Amount" datatype="real"/>
    <column name="customer_id" datatype="integer"/>
    <column name="order_date" caption="Order Date" datatype="date"/>
  </datasource>
  <datasource name="Customers">
    <connection class="excel-direct" dbname="customers.xlsx"/>
    <column name="id" datatype="integer"/>
    <column name="name" caption="Customer Name" datatype="string"/>
  </datasource>
  <relation type="left">
    <clause lhs="Orders.customer_id" rhs="Customers.id"/>
  </relation>
</workbook>
"#;

#[test]
fn test_builds_tables_from_data_sources() {
    let ir = extract(WORKBOOK).unwrap();
    let out = build(&ir);
    assert!(out.diagnostics.is_empty());

    let schema = &out.schema;
    assert_eq!(schema.tables.len(), 2);

    let orders = schema.table("Orders").expect("Orders table");
    assert!(matches!(
        orders.source,
        TableSource::Database { ref provider, ref server, .. }
            if provider == "SqlServer" && server == "sql01"
    ));
    assert_eq!(orders.columns[0].name, "Order ID");
    assert_eq!(orders.columns[0].source_column, "order_id");
    assert_eq!(orders.columns[0].data_type, TargetDataType::Int64);

    let customers = schema.table("Customers").expect("Customers table");
    assert!(matches!(
        customers.source,
        TableSource::File { ref path } if path == "customers.xlsx"
    ));
}

#[test]
fn test_format_strings_follow_source_type() {
    let ir = extract(WORKBOOK).unwrap();
    let out = build(&ir);
    let orders = out.schema.table("Orders").unwrap();

    assert_eq!(orders.columns[0].format_string.as_deref(), Some("#,0"));
    assert_eq!(orders.columns[1].format_string.as_deref(), Some("#,0.00"));
    assert_eq!(orders.columns[2].format_string.as_deref(), Some("#,0"));
    assert_eq!(orders.columns[3].format_string.as_deref(), Some("MM/dd/yyyy"));
}

#[test]
fn test_relationship_endpoints_and_defaults() {
    let ir = extract(WORKBOOK).unwrap();
    let out = build(&ir);

    assert_eq!(out.schema.relationships.len(), 1);
    let rel = &out.schema.relationships[0];
    assert_eq!(rel.from_table, "Orders");
    assert_eq!(rel.from_column, "customer_id");
    assert_eq!(rel.to_table, "Customers");
    assert_eq!(rel.to_column, "id");
    assert_eq!(rel.cardinality, Cardinality::ManyToOne);
    assert_eq!(rel.cross_filter_direction, CrossFilterDirection::BothDirections);
}

#[test]
fn test_bad_joins_degrade_to_diagnostics() {
    let ir = extract(
        r#"<workbook>
            <datasource name="Orders">
                <connection class="postgres"/>
                <column name="id" datatype="integer"/>
            </datasource>
            <relation type="inner">
                <clause lhs="no_table_qualifier" rhs="Orders.id"/>
                <clause lhs="Orders.id" rhs="Ghost.id"/>
                <clause lhs="Orders.missing" rhs="Orders.id"/>
            </relation>
        </workbook>"#,
    )
    .unwrap();

    let out = build(&ir);
    assert!(out.schema.relationships.is_empty());
    assert_eq!(out.diagnostics.len(), 3);
    assert!(out.diagnostics.iter().all(|d| !d.is_error()));
    assert!(out
        .diagnostics
        .iter()
        .any(|d| d.message.contains("Orders.missing")));
}

#[test]
fn test_schema_json_shape() {
    let ir = extract(WORKBOOK).unwrap();
    let out = build(&ir);
    let json = serde_json::to_value(&out.schema).unwrap();

    assert_eq!(json["tables"][0]["name"], "Orders");
    assert_eq!(json["tables"][0]["source"]["type"], "database");
    assert_eq!(json["tables"][0]["source"]["provider"], "SqlServer");
    assert_eq!(json["tables"][1]["source"]["type"], "file");
    assert_eq!(json["relationships"][0]["cardinality"], "manyToOne");
    assert_eq!(
        json["relationships"][0]["crossFilterDirection"],
        "bothDirections"
    );
}
