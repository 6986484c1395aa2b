// =============================================================================
// Report Sink — Profile and selection artifacts on disk
// =============================================================================
//
// Layout written by `write_profile`:
//
//   <out>/summary.csv
//   <out>/summary.json
//   <out>/<alpha>/decay.csv
//   <out>/<alpha>/regime.csv
//   <out>/<alpha>/conditional.csv
//
// Undefined values are empty CSV cells and JSON nulls.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use csv::{Reader, Writer};
use serde::Serialize;
use tracing::info;

use crate::profile::{ProfileReport, SummaryRow};

const SUMMARY_COLUMNS: [&str; 6] = [
    "alpha",
    "hit_rate",
    "hit_n",
    "mean_signed_return",
    "adverse_selection",
    "adverse_n",
];

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write a summary table. The `score` column is present only once
/// selection has scored at least one row.
pub fn write_summary_csv(rows: &[SummaryRow], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create summary {}", path.display()))?;
    let mut writer = Writer::from_writer(file);

    let scored = rows.iter().any(|r| r.score.is_some());
    let mut header: Vec<&str> = SUMMARY_COLUMNS.to_vec();
    if scored {
        header.push("score");
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.alpha.clone(),
            cell(row.hit_rate),
            row.hit_n.to_string(),
            cell(row.mean_signed_return),
            cell(row.adverse_selection),
            row.adverse_n.to_string(),
        ];
        if scored {
            record.push(cell(row.score));
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read a summary table written by [`write_summary_csv`].
pub fn read_summary_csv(path: impl AsRef<Path>) -> Result<Vec<SummaryRow>> {
    let path = path.as_ref();
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("failed to open summary {}", path.display()))?;

    reader
        .deserialize()
        .enumerate()
        .map(|(line, row)| {
            row.with_context(|| format!("failed to parse row {} of {}", line + 1, path.display()))
        })
        .collect()
}

/// Write any serialisable rows as CSV with a header.
pub fn write_table<T: Serialize>(rows: &[T], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `value` as pretty JSON using an atomic tmp + rename.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(value).context("failed to serialise JSON")?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &content)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename {} to {}", tmp_path.display(), path.display()))?;
    Ok(())
}

/// Directory for one alpha's tables. The alpha name comes from a CSV header,
/// so it must be a single plain path component.
fn alpha_dir(out_dir: &Path, alpha: &str) -> Result<PathBuf> {
    let mut components = Path::new(alpha).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == alpha && !alpha.contains('\\') => {
            Ok(out_dir.join(name))
        }
        _ => bail!("alpha name {alpha:?} is not usable as a directory name"),
    }
}

/// Persist a profile report under `out_dir`.
pub fn write_profile(report: &ProfileReport, out_dir: impl AsRef<Path>) -> Result<()> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    write_summary_csv(&report.summary, out_dir.join("summary.csv"))?;
    write_json(&report.summary, out_dir.join("summary.json"))?;

    for detail in &report.details {
        let dir = alpha_dir(out_dir, &detail.alpha)?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        write_table(&detail.decay_curve, dir.join("decay.csv"))?;
        write_table(&detail.regime_dependence, dir.join("regime.csv"))?;
        write_table(&detail.conditional_distribution, dir.join("conditional.csv"))?;
    }

    info!(
        path = %out_dir.display(),
        alphas = report.details.len(),
        "profile report written"
    );
    Ok(())
}
