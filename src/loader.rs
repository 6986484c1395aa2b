// =============================================================================
// Archive Loader — Order-book snapshot CSV files → Dataset
// =============================================================================
//
// Each `*.bn.ob.archive` file is a CSV of snapshots. Load-time derivations:
//   - `timestamp` from `date` + `time` (unparseable → undefined)
//   - `mid` = (touch_bid + touch_ask) / 2
//   - for every `touch_bid@X` / `touch_ask@X` pair:
//       mid{L} = (touch_bid@X + touch_ask@X) / 2
//       ret{L} = (mid{L} - mid) / mid
//     where L is X written as an integer when whole ("1.0" → "1"), otherwise
//     with '.' replaced by 'p' ("0.5" → "0p5").
//
// Columns already present in the file are never overwritten.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::dataset::{Column, Dataset};

pub const ARCHIVE_SUFFIX: &str = ".bn.ob.archive";

const TOUCH_BID: &str = "touch_bid";
const TOUCH_ASK: &str = "touch_ask";
const HORIZON_SEPARATOR: char = '@';

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y%m%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Archive files directly under `dir`, sorted by path.
pub fn list_archive_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list archive directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_archive = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(ARCHIVE_SUFFIX));
        if is_archive && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Column label for a raw touch-price horizon suffix.
pub fn touch_horizon_label(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => format!("{}", value as i64),
        Ok(value) => value.to_string().replace('.', "p"),
        Err(_) => raw.replace('.', "p"),
    }
}

fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time.trim());
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&joined, fmt).ok())
}

/// Cells read as undefined values, the usual CSV missing-value markers.
const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_TOKENS.contains(&cell)
}

/// Numeric column if every non-missing cell parses as a number.
fn type_column(raw: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = raw
        .iter()
        .map(|cell| {
            let cell = cell.trim();
            if is_missing(cell) {
                Some(f64::NAN)
            } else {
                cell.parse::<f64>().ok()
            }
        })
        .collect();
    match parsed {
        Some(values) => Column::Float(values),
        None => Column::Text(raw),
    }
}

fn average(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| (x + y) / 2.0).collect()
}

/// Add `mid{L}` / `ret{L}` for every touch-price horizon pair.
fn add_forward_returns_from_touch(ds: &mut Dataset) -> Result<()> {
    let bid_prefix = format!("{TOUCH_BID}{HORIZON_SEPARATOR}");
    let horizons: Vec<String> = ds
        .column_names()
        .iter()
        .filter_map(|name| name.strip_prefix(&bid_prefix).map(str::to_string))
        .collect();

    for raw in horizons {
        let bid_col = format!("{TOUCH_BID}{HORIZON_SEPARATOR}{raw}");
        let ask_col = format!("{TOUCH_ASK}{HORIZON_SEPARATOR}{raw}");
        let label = touch_horizon_label(&raw);
        let mid_col = format!("mid{label}");
        let ret_col = format!("ret{label}");

        let forward_mid = match (ds.float(&bid_col), ds.float(&ask_col)) {
            (Some(bid), Some(ask)) => average(bid, ask),
            _ => continue,
        };
        if !ds.has_column(&mid_col) {
            ds.insert(mid_col.clone(), Column::Float(forward_mid))?;
        }
        if ds.has_column(&ret_col) {
            continue;
        }
        let ret: Option<Vec<f64>> = match (ds.float("mid"), ds.float(&mid_col)) {
            (Some(mid), Some(forward_mid)) => Some(
                mid.iter()
                    .zip(forward_mid)
                    .map(|(m, f)| (f - m) / m)
                    .collect(),
            ),
            _ => None,
        };
        if let Some(ret) = ret {
            ds.insert(ret_col.clone(), Column::Float(ret))?;
            debug!(horizon = %raw, column = %ret_col, "forward return derived");
        }
    }
    Ok(())
}

/// Read one archive file.
pub fn load_archive(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open archive {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("failed to read row {} of {}", line + 1, path.display()))?;
        for (col, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(col).unwrap_or("").to_string());
        }
    }

    let timestamps: Option<Vec<Option<NaiveDateTime>>> = {
        let date = headers.iter().position(|h| h == "date");
        let time = headers.iter().position(|h| h == "time");
        match (date, time) {
            (Some(d), Some(t)) => Some(
                raw[d]
                    .iter()
                    .zip(&raw[t])
                    .map(|(d, t)| parse_timestamp(d, t))
                    .collect(),
            ),
            _ => None,
        }
    };

    let mut ds = Dataset::new();
    for (name, cells) in headers.into_iter().zip(raw) {
        ds.insert(name, type_column(cells))?;
    }
    if let Some(ts) = timestamps {
        ds.insert("timestamp", Column::Timestamp(ts))?;
    }
    let mid = match (ds.float(TOUCH_BID), ds.float(TOUCH_ASK)) {
        (Some(bid), Some(ask)) if !ds.has_column("mid") => Some(average(bid, ask)),
        _ => None,
    };
    if let Some(mid) = mid {
        ds.insert("mid", Column::Float(mid))?;
    }
    add_forward_returns_from_touch(&mut ds)?;

    debug!(
        path = %path.display(),
        rows = ds.len(),
        columns = ds.column_names().len(),
        "archive loaded"
    );
    Ok(ds)
}

/// Load and stack several archives. No files yields an empty dataset.
pub fn load_archives<P: AsRef<Path>>(paths: &[P]) -> Result<Dataset> {
    let mut combined = Dataset::new();
    for path in paths {
        combined = combined.concat(load_archive(path)?);
    }
    info!(
        files = paths.len(),
        rows = combined.len(),
        columns = combined.column_names().len(),
        "archives loaded"
    );
    Ok(combined)
}
