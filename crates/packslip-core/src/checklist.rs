//! Visual pick checklist: one section per classification, one entry per card,
//! each entry showing the printing's image(s) from the lookup services.
//!
//! Every row resolves independently. A row whose edition is unknown to the
//! search service, or whose lookups fail, gets a visible placeholder and a
//! warning, and the checklist carries on with the next row.

use crate::error::Result;
use crate::grouping::ClassificationGroup;
use crate::ledger::ShipmentRow;
use crate::obs;
use crate::render::{document_close, document_open};
use card_lookup::{select_printing, CardDetails, CardSearch, LookupError};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// How a single row's image lookup ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// One URI per face, or a single URI
    Resolved(Vec<String>),
    /// No search result matched the row's set name
    Unmatched,
    /// Transport, status or decode failure in either service
    Failed(String),
}

impl ImageOutcome {
    pub fn image_count(&self) -> usize {
        match self {
            ImageOutcome::Resolved(uris) => uris.len(),
            _ => 0,
        }
    }
}

/// A row that did not produce images, kept for the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupIssue {
    pub section: String,
    pub package_id: String,
    pub card_name: String,
    pub set_name: String,
    pub reason: String,
}

impl LookupIssue {
    fn new(section: &str, row: &ShipmentRow, reason: String) -> Self {
        Self {
            section: section.to_string(),
            package_id: row.package_id.clone(),
            card_name: row.card_name.clone(),
            set_name: row.set_name.clone(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSummary {
    pub sections: usize,
    pub entries: usize,
    pub images: usize,
    pub mismatches: Vec<LookupIssue>,
    pub failures: Vec<LookupIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistConfig {
    /// Rows resolved concurrently within a section
    pub max_concurrent_lookups: usize,
    /// Rendered image height in pixels
    pub image_height: u32,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: 4,
            image_height: 400,
        }
    }
}

fn section_header(label: &str) -> String {
    format!("<p><strong><span style=\"font-size: 20px;\">Group: {label}</span></strong></p>\n")
}

fn entry_label(row: &ShipmentRow) -> String {
    format!(
        "<p><input type=\"checkbox\"><strong>{}&nbsp; {} &nbsp; {}-{} &nbsp; Package:{}</strong></p>\n",
        row.card_name, row.set_name, row.finish, row.condition, row.package_id
    )
}

fn entry_body(row: &ShipmentRow, outcome: &ImageOutcome, height: u32) -> String {
    match outcome {
        ImageOutcome::Resolved(uris) => {
            let images: String = uris
                .iter()
                .map(|uri| format!("<img src=\"{uri}\" height=\"{height}\">"))
                .collect();
            format!("<p>{images}</p>\n")
        }
        ImageOutcome::Unmatched => format!(
            "<p class=\"missing\"><em>No printing found in edition {}</em></p>\n",
            row.set_name
        ),
        ImageOutcome::Failed(reason) => {
            format!("<p class=\"missing\"><em>Image lookup failed: {reason}</em></p>\n")
        }
    }
}

/// Resolves card images through the two lookup services and writes the checklist.
pub struct ImageAssembler {
    search: Arc<dyn CardSearch>,
    details: Arc<dyn CardDetails>,
    config: ChecklistConfig,
}

impl ImageAssembler {
    pub fn new(
        search: Arc<dyn CardSearch>,
        details: Arc<dyn CardDetails>,
        config: ChecklistConfig,
    ) -> Self {
        Self {
            search,
            details,
            config,
        }
    }

    async fn lookup(&self, row: &ShipmentRow) -> std::result::Result<Option<Vec<String>>, LookupError> {
        let candidates = self.search.search_by_name(&row.card_name).await?;
        let Some(printing) = select_printing(&candidates, &row.set_name) else {
            return Ok(None);
        };
        let record = self.details.card_by_id(&printing.scryfall_id).await?;
        record.normal_image_uris().map(Some)
    }

    /// Resolve one row. Never fails; errors are folded into the outcome.
    pub async fn resolve(&self, row: &ShipmentRow) -> ImageOutcome {
        match self.lookup(row).await {
            Ok(Some(uris)) => ImageOutcome::Resolved(uris),
            Ok(None) => ImageOutcome::Unmatched,
            Err(e) => ImageOutcome::Failed(e.to_string()),
        }
    }

    /// Resolve every row of a section, at most `max_concurrent_lookups` at a
    /// time. Outcomes are returned in row order.
    pub async fn resolve_section(&self, rows: &[ShipmentRow]) -> Vec<ImageOutcome> {
        let limit = self.config.max_concurrent_lookups.max(1);
        stream::iter(rows.iter().map(|row| self.resolve(row)))
            .buffered(limit)
            .collect::<Vec<_>>()
            .await
    }

    /// Write the full checklist to `out`, flushing after each section.
    pub async fn write_checklist<W: Write + Send>(
        &self,
        sections: &[ClassificationGroup],
        out: &mut W,
    ) -> Result<ChecklistSummary> {
        let mut summary = ChecklistSummary::default();
        out.write_all(document_open().as_bytes())?;

        for section in sections {
            let outcomes = self.resolve_section(&section.rows).await;

            let mut chunk = section_header(&section.label);
            for (row, outcome) in section.rows.iter().zip(&outcomes) {
                chunk.push_str(&entry_label(row));
                chunk.push_str(&entry_body(row, outcome, self.config.image_height));

                summary.entries += 1;
                summary.images += outcome.image_count();
                match outcome {
                    ImageOutcome::Resolved(_) => {}
                    ImageOutcome::Unmatched => {
                        obs::emit_lookup_mismatch(
                            &section.label,
                            &row.package_id,
                            &row.card_name,
                            &row.set_name,
                        );
                        summary.mismatches.push(LookupIssue::new(
                            &section.label,
                            row,
                            "no printing matches set name".to_string(),
                        ));
                    }
                    ImageOutcome::Failed(reason) => {
                        obs::emit_lookup_failed(
                            &section.label,
                            &row.package_id,
                            &row.card_name,
                            reason,
                        );
                        summary
                            .failures
                            .push(LookupIssue::new(&section.label, row, reason.clone()));
                    }
                }
            }

            out.write_all(chunk.as_bytes())?;
            out.flush()?;
            summary.sections += 1;
            obs::emit_section_written(&section.label, section.rows.len());
        }

        out.write_all(document_close().as_bytes())?;
        out.flush()?;
        Ok(summary)
    }

    /// Create (or truncate) `path` and write the checklist into it.
    ///
    /// File writes are synchronous and happen once per section, after that
    /// section's lookups have completed, so they never block an in-flight request.
    pub async fn write_to_path(
        &self,
        sections: &[ClassificationGroup],
        path: &Path,
    ) -> Result<ChecklistSummary> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write_checklist(sections, &mut writer).await
    }
}
