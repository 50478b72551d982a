//! End-to-end run: ledger in, packing slips and checklist out.

use crate::checklist::{ChecklistConfig, ChecklistSummary, ImageAssembler};
use crate::classify::TagClassifier;
use crate::convert::DocumentConverter;
use crate::error::{PackslipError, Result};
use crate::grouping::{ClassificationGap, PackageGroup, ShipmentGrouper, Shipments};
use crate::ledger::RowSource;
use crate::obs;
use crate::render::{DocumentRenderer, Table, SLIP_TITLE};
use card_lookup::{CardDetails, CardSearch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, Instrument};
use uuid::Uuid;

/// File name of the checklist when no explicit path is configured.
pub const DEFAULT_CHECKLIST_FILE: &str = "search_list.html";

/// Run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory receiving one `<package>.html` (and `.pdf`) per package
    pub output_dir: PathBuf,

    /// Checklist destination; defaults to `output_dir/search_list.html`
    pub checklist_path: Option<PathBuf>,

    pub write_slips: bool,
    pub write_checklist: bool,

    /// Convert each slip to PDF through the configured converter
    pub convert_pdf: bool,

    /// Abort before writing anything when a committed row has no classification
    pub fail_on_gap: bool,

    pub checklist: ChecklistConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut checklist = ChecklistConfig::default();
        if let Some(n) = std::env::var("PACKSLIP_MAX_CONCURRENT_LOOKUPS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            checklist.max_concurrent_lookups = n;
        }

        Self {
            output_dir: PathBuf::from("."),
            checklist_path: None,
            write_slips: true,
            write_checklist: true,
            convert_pdf: false,
            fail_on_gap: false,
            checklist,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_checklist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checklist_path = Some(path.into());
        self
    }

    pub fn slips_only(mut self) -> Self {
        self.write_checklist = false;
        self
    }

    pub fn checklist_only(mut self) -> Self {
        self.write_slips = false;
        self
    }

    pub fn checklist_destination(&self) -> PathBuf {
        self.checklist_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join(DEFAULT_CHECKLIST_FILE))
    }
}

/// Packing slip files written for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipArtifact {
    pub package_id: String,
    pub rows: usize,
    pub html: PathBuf,
    pub pdf: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailure {
    pub package_id: String,
    pub reason: String,
}

/// Everything a run produced, plus every per-row diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the ledger bytes, when the source had bytes
    pub ledger_digest: Option<String>,
    pub total_rows: usize,
    pub committed_rows: usize,
    pub slips: Vec<SlipArtifact>,
    pub checklist_path: Option<PathBuf>,
    pub checklist: Option<ChecklistSummary>,
    pub gaps: Vec<ClassificationGap>,
    pub conversion_failures: Vec<ConversionFailure>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn lookup_mismatch_count(&self) -> usize {
        self.checklist.as_ref().map_or(0, |c| c.mismatches.len())
    }

    pub fn lookup_failure_count(&self) -> usize {
        self.checklist.as_ref().map_or(0, |c| c.failures.len())
    }

    /// Total rows or packages that need a human look.
    pub fn issue_count(&self) -> usize {
        self.gaps.len()
            + self.conversion_failures.len()
            + self.lookup_mismatch_count()
            + self.lookup_failure_count()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}

/// File stem for a package's slip. Path separators and other characters that
/// are unsafe in file names become `_`.
pub fn slip_file_stem(package_id: &str) -> String {
    let stem: String = package_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.trim_matches('.').is_empty() {
        "package".to_string()
    } else {
        stem
    }
}

/// Claim a file stem not yet in `used`, appending `-2`, `-3`, ... on collision.
/// Comparison ignores case so slips stay distinct on case-insensitive filesystems.
pub fn claim_slip_stem(stem: String, used: &mut HashSet<String>) -> String {
    if used.insert(stem.to_lowercase()) {
        return stem;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{stem}-{n}");
        if used.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}

/// Shipment document pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    grouper: ShipmentGrouper,
    renderer: DocumentRenderer,
    assembler: Option<ImageAssembler>,
    converter: Option<Arc<dyn DocumentConverter>>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            grouper: ShipmentGrouper::new(TagClassifier::new()),
            renderer: DocumentRenderer,
            assembler: None,
            converter: None,
        }
    }

    pub fn with_lookups(mut self, search: Arc<dyn CardSearch>, details: Arc<dyn CardDetails>) -> Self {
        self.assembler = Some(ImageAssembler::new(
            search,
            details,
            self.config.checklist.clone(),
        ));
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn DocumentConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn validate(&self) -> Result<()> {
        if self.config.write_checklist && self.assembler.is_none() {
            return Err(PackslipError::InvalidConfig(
                "checklist requested but no lookup services configured".to_string(),
            ));
        }
        if self.config.write_slips && self.config.convert_pdf && self.converter.is_none() {
            return Err(PackslipError::InvalidConfig(
                "PDF conversion requested but no converter configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Load, filter, classify and group without writing anything.
    pub fn partition(&self, source: &dyn RowSource) -> Result<(Shipments, Option<String>)> {
        let ledger = source.load()?;
        let shipments = self.grouper.partition(ledger.rows);
        Ok((shipments, ledger.digest))
    }

    async fn write_slip(
        &self,
        package: &PackageGroup,
        stem: &str,
        failures: &mut Vec<ConversionFailure>,
    ) -> Result<SlipArtifact> {
        let html = self.config.output_dir.join(format!("{stem}.html"));

        let table = Table::packing_slip(&package.rows);
        self.renderer
            .write(&html, &table, SLIP_TITLE, &package.address)?;

        let mut pdf = None;
        if self.config.convert_pdf {
            if let Some(converter) = &self.converter {
                let target = self.config.output_dir.join(format!("{stem}.pdf"));
                match converter.convert(&html, &target).await {
                    Ok(()) => pdf = Some(target),
                    Err(e) => {
                        obs::emit_slip_convert_failed(&package.package_id, &e);
                        failures.push(ConversionFailure {
                            package_id: package.package_id.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        obs::emit_slip_written(&package.package_id, package.rows.len(), pdf.is_some());
        Ok(SlipArtifact {
            package_id: package.package_id.clone(),
            rows: package.rows.len(),
            html,
            pdf,
        })
    }

    /// Execute a full run against `source`.
    ///
    /// Fatal errors (unreadable ledger, missing column, unwritable output,
    /// strict-mode classification gaps) abort the run. Lookup and conversion
    /// problems are recorded in the report and the run continues.
    pub async fn run(&self, source: &dyn RowSource) -> Result<RunReport> {
        self.validate()?;

        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id);
        self.run_inner(source, run_id).instrument(span).await
    }

    async fn run_inner(&self, source: &dyn RowSource, run_id: String) -> Result<RunReport> {
        let start = Instant::now();
        obs::emit_run_started(
            &run_id,
            &source.describe(),
            &self.config.output_dir.display().to_string(),
        );

        let (shipments, ledger_digest) = self.partition(source)?;
        obs::emit_ledger_partitioned(
            shipments.total_rows,
            shipments.committed.len(),
            shipments.packages.len(),
            shipments.sections.len(),
        );

        for gap in &shipments.gaps {
            obs::emit_classification_gap(&gap.package_id, &gap.card_name, &gap.tags);
        }
        if self.config.fail_on_gap {
            if let Some(first) = shipments.gaps.first() {
                return Err(PackslipError::ClassificationGaps {
                    count: shipments.gaps.len(),
                    first_package: first.package_id.clone(),
                });
            }
        }

        std::fs::create_dir_all(&self.config.output_dir)?;

        let mut slips = Vec::new();
        let mut conversion_failures = Vec::new();
        if self.config.write_slips {
            let mut used_stems = HashSet::new();
            for package in &shipments.packages {
                let stem = claim_slip_stem(slip_file_stem(&package.package_id), &mut used_stems);
                slips.push(
                    self.write_slip(package, &stem, &mut conversion_failures)
                        .await?,
                );
            }
        }

        let mut checklist_path = None;
        let mut checklist = None;
        if self.config.write_checklist {
            if let Some(assembler) = &self.assembler {
                let path = self.config.checklist_destination();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                checklist = Some(assembler.write_to_path(&shipments.sections, &path).await?);
                info!(path = %path.display(), "checklist written");
                checklist_path = Some(path);
            }
        }

        let report = RunReport {
            run_id: run_id.clone(),
            generated_at: Utc::now(),
            ledger_digest,
            total_rows: shipments.total_rows,
            committed_rows: shipments.committed.len(),
            slips,
            checklist_path,
            checklist,
            gaps: shipments.gaps,
            conversion_failures,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        obs::emit_run_finished(
            &run_id,
            report.duration_ms,
            report.slips.len(),
            report.issue_count(),
        );
        Ok(report)
    }
}

/// Write a report as pretty JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
