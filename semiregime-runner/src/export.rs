//! Reporting and export: JSON, CSV, and Markdown artifacts for replays.
//!
//! - **JSON**: the full `ReplaySummary` wrapped in a versioned manifest
//! - **CSV**: one diagnostic row per cycle, and one row per target weight
//! - **Markdown**: a short human-readable replay report
//!
//! Persisted manifests carry a `schema_version`. Newer versions are rejected
//! on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::orchestrator::RebalanceReport;
use crate::replay::ReplaySummary;

pub const SCHEMA_VERSION: u32 = 1;

/// Versioned on-disk form of a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayManifest {
    pub schema_version: u32,
    pub summary: ReplaySummary,
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a replay summary to pretty JSON.
pub fn export_json(summary: &ReplaySummary) -> Result<String> {
    let manifest = ReplayManifest {
        schema_version: SCHEMA_VERSION,
        summary: summary.clone(),
    };
    serde_json::to_string_pretty(&manifest).context("failed to serialize replay manifest to JSON")
}

/// Deserialize a replay summary, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ReplaySummary> {
    let manifest: ReplayManifest =
        serde_json::from_str(json).context("failed to deserialize replay manifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest.summary)
}

/// Serialize a single cycle report to pretty JSON.
pub fn export_report_json(report: &RebalanceReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize rebalance report to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: date, regime, gross, names, config_id
pub fn export_diagnostics_csv(reports: &[RebalanceReport]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "regime", "gross", "names", "config_id"])?;
    for r in reports {
        wtr.write_record([
            r.date.to_string(),
            r.diagnostics.regime.as_str().to_string(),
            format!("{:.6}", r.diagnostics.realized_gross),
            r.diagnostics.selected_names.to_string(),
            r.config_id.clone(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: date, symbol, weight
pub fn export_targets_csv(reports: &[RebalanceReport]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "symbol", "weight"])?;
    for r in reports {
        for (symbol, weight) in r.targets.iter() {
            wtr.write_record([r.date.to_string(), symbol.to_string(), format!("{weight:.6}")])?;
        }
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a replay.
///
/// Creates `replay_{start}_{end}_{config_id prefix}/` under `output_dir`
/// containing `manifest.json`, `diagnostics.csv`, `targets.csv` and
/// `report.md`. Returns the created directory.
pub fn save_artifacts(summary: &ReplaySummary, output_dir: &Path) -> Result<PathBuf> {
    let short_id: String = summary.config_id.chars().take(12).collect();
    let dirname = format!("replay_{}_{}_{}", summary.start, summary.end, short_id);
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(summary)?)?;
    std::fs::write(
        run_dir.join("diagnostics.csv"),
        export_diagnostics_csv(&summary.reports)?,
    )?;
    std::fs::write(
        run_dir.join("targets.csv"),
        export_targets_csv(&summary.reports)?,
    )?;
    std::fs::write(run_dir.join("report.md"), generate_report(summary))?;

    Ok(run_dir)
}

/// Load a replay summary from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<ReplaySummary> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

pub fn generate_report(summary: &ReplaySummary) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Replay Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Period | {} to {} |\n", summary.start, summary.end));
    md.push_str(&format!("| Cadence | {} |\n", summary.cadence));
    md.push_str(&format!("| Config | {} |\n", summary.config_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", summary.dataset_hash));
    md.push_str(&format!("| Cycles | {} |\n", summary.reports.len()));
    md.push_str(&format!("| Warmup Skipped | {} |\n", summary.warmup_skipped));
    md.push_str(&format!("| Aborted | {} |\n", summary.aborted.len()));
    if summary.synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    if !summary.reports.is_empty() {
        md.push_str("## Cycles\n\n");
        md.push_str("| Date | Regime | Gross | Names | Long | Short |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- |\n");
        for r in &summary.reports {
            md.push_str(&format!(
                "| {} | {} | {:.3} | {} | {:.3} | {:.3} |\n",
                r.date,
                r.diagnostics.regime,
                r.diagnostics.realized_gross,
                r.diagnostics.selected_names,
                r.targets.long_exposure(),
                r.targets.short_exposure(),
            ));
        }
        md.push('\n');
    }

    if !summary.aborted.is_empty() {
        md.push_str("## Aborted Cycles\n\n");
        for a in &summary.aborted {
            md.push_str(&format!("- {}: {}\n", a.date, a.reason));
        }
        md.push('\n');
    }

    md
}
