//! packslip core library
//!
//! Turns a trading-card shipment ledger into shareable documents:
//!
//! - one packing slip per package (HTML, optionally converted to PDF)
//! - one visual pick checklist, sectioned by tag classification, with card
//!   images resolved through two chained lookup services
//!
//! Layers, leaf first: [`priority`] → [`classify`] → [`grouping`] →
//! [`render`] / [`checklist`] / [`convert`] → [`pipeline`].

pub mod checklist;
pub mod classify;
pub mod convert;
pub mod error;
pub mod grouping;
pub mod ledger;
pub mod obs;
pub mod pipeline;
pub mod priority;
pub mod render;
pub mod telemetry;

pub use checklist::{ChecklistConfig, ChecklistSummary, ImageAssembler, ImageOutcome, LookupIssue};
pub use classify::{parse_tags, Classification, TagClassifier, TAG_PRIORITY, VERIFIED_SENTINEL};
pub use convert::{ConverterConfig, DocumentConverter, PageLayout, WkhtmltopdfConverter};
pub use error::{ConvertError, PackslipError, Result};
pub use grouping::{
    ClassificationGap, ClassificationGroup, ClassifiedRow, PackageGroup, ShipmentGrouper,
    Shipments,
};
pub use ledger::{CsvRowSource, Ledger, RowSource, ShipmentRow};
pub use pipeline::{
    write_report, ConversionFailure, Pipeline, PipelineConfig, RunReport, SlipArtifact,
};
pub use priority::{PriorityRanking, Rank};
pub use render::{DocumentRenderer, Table, SLIP_COLUMNS, SLIP_TITLE};
pub use telemetry::init_tracing;
