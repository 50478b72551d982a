//! Structured observability hooks for packslip run lifecycle events.
//!
//! This module provides:
//! - A run-scoped tracing span, attached to the run future with `Instrument`
//! - Emission functions for run start/finish, per-package slip output and
//!   per-row checklist diagnostics
//!
//! Events are emitted at `info!` level, diagnostics at `warn!`. Set `RUST_LOG`
//! to filter and pass `--json` to the CLI for JSON lines.

use tracing::{info, warn};

/// Span for an async run; attach with `tracing::Instrument`.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("packslip.run", run_id = %run_id)
}

/// Emit event: run started against a ledger.
pub fn emit_run_started(run_id: &str, ledger: &str, output_dir: &str) {
    info!(
        event = "run.started",
        run_id = %run_id,
        ledger = %ledger,
        output_dir = %output_dir,
    );
}

/// Emit event: ledger partitioned into packages and sections.
pub fn emit_ledger_partitioned(total_rows: usize, committed: usize, packages: usize, sections: usize) {
    info!(
        event = "ledger.partitioned",
        total_rows = total_rows,
        committed = committed,
        packages = packages,
        sections = sections,
    );
}

/// Emit warning: committed row carries only reserved tags.
pub fn emit_classification_gap(package_id: &str, card_name: &str, tags: &[String]) {
    warn!(
        event = "row.classification_gap",
        package_id = %package_id,
        card_name = %card_name,
        tags = %tags.join(", "),
    );
}

/// Emit event: packing slip written.
pub fn emit_slip_written(package_id: &str, rows: usize, pdf: bool) {
    info!(event = "slip.written", package_id = %package_id, rows = rows, pdf = pdf);
}

/// Emit warning: packing slip HTML written but PDF conversion failed.
pub fn emit_slip_convert_failed(package_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "slip.convert_failed", package_id = %package_id, error = %error);
}

/// Emit event: one checklist section flushed to disk.
pub fn emit_section_written(label: &str, entries: usize) {
    info!(event = "checklist.section_written", section = %label, entries = entries);
}

/// Emit warning: no search result matched the row's edition.
pub fn emit_lookup_mismatch(section: &str, package_id: &str, card_name: &str, set_name: &str) {
    warn!(
        event = "lookup.mismatch",
        section = %section,
        package_id = %package_id,
        card_name = %card_name,
        set_name = %set_name,
    );
}

/// Emit warning: a lookup failed; the row gets a placeholder.
pub fn emit_lookup_failed(section: &str, package_id: &str, card_name: &str, error: &str) {
    warn!(
        event = "lookup.failed",
        section = %section,
        package_id = %package_id,
        card_name = %card_name,
        error = %error,
    );
}

/// Emit event: run finished.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, slips: usize, issues: usize) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        slips = slips,
        issues = issues,
    );
}
