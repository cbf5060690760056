//! Report page layout.
//!
//! Dashboards become report pages; each worksheet zone places the visual
//! mapped from that worksheet at the zone's canvas position. A workbook
//! without dashboards still gets one page per worksheet so that no mapped
//! visual is dropped.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::diag::Diagnostic;
use crate::ir::{WorkbookIR, ZoneKind, ZonePosition};
use crate::visuals::VisualConfig;

/// A report page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    /// Stable page identifier, freshly generated per conversion.
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub visuals: Vec<PlacedVisual>,
}

/// A visual placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedVisual {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub visual: VisualConfig,
}

/// Pages plus the diagnostics accumulated while placing visuals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutOutcome {
    pub pages: Vec<ReportPage>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build report pages from the workbook's dashboards.
///
/// `visuals` are the mapped visual configurations, named after their
/// worksheets. Zones referencing a worksheet with no mapped visual produce a
/// diagnostic and an empty slot.
pub fn build_pages(ir: &WorkbookIR, visuals: &[VisualConfig]) -> LayoutOutcome {
    let mut outcome = LayoutOutcome::default();

    if ir.dashboards.is_empty() {
        return worksheet_pages(ir, visuals);
    }

    for dashboard in &ir.dashboards {
        let mut page = ReportPage {
            id: Uuid::new_v4().to_string(),
            name: dashboard.name.clone(),
            width: dashboard.size.width,
            height: dashboard.size.height,
            visuals: Vec::new(),
        };

        for zone in &dashboard.zones {
            if zone.kind != ZoneKind::Worksheet {
                continue;
            }
            let matched: Vec<&VisualConfig> = visuals
                .iter()
                .filter(|v| matches_worksheet(v, &zone.name))
                .collect();
            if matched.is_empty() {
                outcome.diagnostics.push(Diagnostic::warning(
                    "layout",
                    format!(
                        "dashboard {}: no visual for worksheet {}",
                        dashboard.name, zone.name
                    ),
                ));
            }
            for visual in matched {
                page.visuals.push(place(visual, zone.position));
            }
        }

        debug!(page = %page.name, visuals = page.visuals.len(), "page built");
        outcome.pages.push(page);
    }

    outcome
}

/// Fallback paging: one page per worksheet, visuals at default positions.
fn worksheet_pages(ir: &WorkbookIR, visuals: &[VisualConfig]) -> LayoutOutcome {
    let mut outcome = LayoutOutcome::default();

    for worksheet in &ir.worksheets {
        let placed: Vec<PlacedVisual> = visuals
            .iter()
            .filter(|v| matches_worksheet(v, &worksheet.name))
            .map(|v| place(v, ZonePosition::default()))
            .collect();
        if placed.is_empty() {
            continue;
        }

        outcome.pages.push(ReportPage {
            id: Uuid::new_v4().to_string(),
            name: worksheet.name.clone(),
            width: 1000,
            height: 800,
            visuals: placed,
        });
    }

    outcome
}

/// A zone references its worksheet by name; the mapped visual carries that
/// name, possibly with an index suffix when the worksheet held several panes.
fn matches_worksheet(visual: &VisualConfig, worksheet: &str) -> bool {
    visual.name == worksheet || visual.name.starts_with(&format!("{} (", worksheet))
}

fn place(visual: &VisualConfig, position: ZonePosition) -> PlacedVisual {
    PlacedVisual {
        x: position.x,
        y: position.y,
        width: position.width,
        height: position.height,
        visual: visual.clone(),
    }
}
