//! Integration tests for report page layout.

use prism::extract::extract;
use prism::layout::build_pages;
use prism::visuals::map_workbook;

const WORKBOOK: &str = r#"
<workbook>
  <worksheets>
    <worksheet name="Sales">
      <pane>
        <mark type="bar">
          <encoding type="columns" field="Region"/>
          <encoding type="rows" field="Amount"/>
        </mark>
      </pane>
    </worksheet>
    <worksheet name="Trend">
      <pane>
        <mark type="line">
          <encoding type="columns" field="Order Date"/>
          <encoding type="rows" field="Amount"/>
        </mark>
      </pane>
    </worksheet>
  </worksheets>
  <dashboards>
    <dashboard name="Overview" maxwidth="1280" maxheight="720">
      <zone type="worksheet" name="Sales" x="0" y="0" width="640" height="720"/>
      <zone type="worksheet" name="Trend" x="640" y="0" width="640" height="720"/>
      <zone type="blank" name=""/>
    </dashboard>
  </dashboards>
</workbook>
"#;

#[test]
fn test_dashboard_zones_place_visuals() {
    let ir = extract(WORKBOOK).unwrap();
    let mapped = map_workbook(&ir);
    let out = build_pages(&ir, &mapped.visuals);

    assert!(out.diagnostics.is_empty());
    assert_eq!(out.pages.len(), 1);

    let page = &out.pages[0];
    assert_eq!(page.name, "Overview");
    assert_eq!(page.width, 1280);
    assert_eq!(page.height, 720);
    assert_eq!(page.visuals.len(), 2);

    assert_eq!(page.visuals[0].visual.name, "Sales");
    assert_eq!(page.visuals[0].x, 0.0);
    assert_eq!(page.visuals[1].visual.name, "Trend");
    assert_eq!(page.visuals[1].x, 640.0);
    assert_eq!(page.visuals[1].width, 640.0);
}

#[test]
fn test_zone_for_unmapped_worksheet_is_reported() {
    let ir = extract(
        r#"<workbook>
            <dashboard name="D">
                <zone type="worksheet" name="Missing"/>
            </dashboard>
        </workbook>"#,
    )
    .unwrap();
    let out = build_pages(&ir, &[]);

    assert_eq!(out.pages.len(), 1);
    assert!(out.pages[0].visuals.is_empty());
    assert_eq!(out.diagnostics.len(), 1);
}

#[test]
fn test_workbook_without_dashboards_gets_worksheet_pages() {
    let ir = extract(
        r#"<workbook>
            <worksheet name="Only">
                <pane><mark type="pie"/></pane>
            </worksheet>
        </workbook>"#,
    )
    .unwrap();
    let mapped = map_workbook(&ir);
    let out = build_pages(&ir, &mapped.visuals);

    assert_eq!(out.pages.len(), 1);
    assert_eq!(out.pages[0].name, "Only");
    assert_eq!(out.pages[0].width, 1000);
    assert_eq!(out.pages[0].height, 800);
    assert_eq!(out.pages[0].visuals.len(), 1);
}

#[test]
fn test_page_json_carries_visual_placement() {
    let ir = extract(WORKBOOK).unwrap();
    let mapped = map_workbook(&ir);
    let out = build_pages(&ir, &mapped.visuals);

    let json = serde_json::to_value(&out.pages).unwrap();
    assert_eq!(json[0]["name"], "Overview");
    assert_eq!(json[0]["visuals"][0]["x"], 0.0);
    assert_eq!(json[0]["visuals"][0]["visualType"], "columnChart");
    assert!(json[0]["id"].as_str().is_some());
}
