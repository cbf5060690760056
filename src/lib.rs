//! # Prism
//!
//! Converts Tableau workbooks into Power BI report models.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Workbook XML (.twb / .twbx)                 │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [extract]
//! ┌─────────────────────────────────────────────────────────┐
//! │              WorkbookIR (typed metadata)                 │
//! └─────────────────────────────────────────────────────────┘
//!            │                │                 │
//!            ▼ [schema]       ▼ [formula]       ▼ [visuals]
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────┐
//! │  Target schema   │ │  DAX measures    │ │   Visuals    │
//! │  (tables, rels)  │ │  (transpiled)    │ │  (mapped)    │
//! └──────────────────┘ └──────────────────┘ └──────────────┘
//!            │                │                 │
//!            └────────────────┼────────[layout]─┘
//!                             ▼ [package]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Report documents (DataModel, Report, Connections)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The three middle stages consume disjoint slices of the IR and run
//! concurrently. Recoverable problems never abort a conversion; they are
//! collected as [`diag::Diagnostic`]s on the result.

pub mod convert;
pub mod diag;
pub mod extract;
pub mod formula;
pub mod ir;
pub mod layout;
pub mod package;
pub mod schema;
pub mod visuals;

pub use convert::{convert_path, convert_workbook, Conversion, ConvertError, ConvertOptions};
pub use diag::{Diagnostic, Severity};
