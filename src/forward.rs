// =============================================================================
// Forward Return Resolver
// =============================================================================
//
// The archive loader precomputes one forward mid / forward return column per
// horizon, labelled by whole seconds: `mid5`, `ret5` for a 5 s horizon. The
// resolver only selects; it never derives or interpolates. Any request that
// does not map onto an existing column fails fast as a configuration error.

use std::time::Duration;

use tracing::trace;

use crate::dataset::{Column, Dataset};
use crate::error::{ProfileError, Result};

pub const FORWARD_RETURN: &str = "forward_return";
pub const FORWARD_MID: &str = "forward_mid";
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "timestamp";
pub const DEFAULT_MID_COLUMN: &str = "mid";
pub const DEFAULT_GROUP_COLUMN: &str = "name";

const RETURN_PREFIX: &str = "ret";
const MID_PREFIX: &str = "mid";

/// Which forward-return field to select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardReturnSpec {
    pub horizon: Duration,
    /// Instrument identifier column the horizon columns were computed within.
    pub group_column: String,
}

impl ForwardReturnSpec {
    pub fn new(horizon: Duration, group_column: impl Into<String>) -> Self {
        Self {
            horizon,
            group_column: group_column.into(),
        }
    }
}

/// Column label for a horizon. Only whole seconds are representable.
pub fn horizon_label(horizon: Duration) -> Result<String> {
    if horizon.subsec_nanos() != 0 {
        return Err(ProfileError::FractionalHorizon {
            millis: horizon.as_millis(),
        });
    }
    Ok(horizon.as_secs().to_string())
}

pub fn return_column(horizon: Duration) -> Result<String> {
    Ok(format!("{RETURN_PREFIX}{}", horizon_label(horizon)?))
}

pub fn mid_column(horizon: Duration) -> Result<String> {
    Ok(format!("{MID_PREFIX}{}", horizon_label(horizon)?))
}

/// Horizons whose numeric `ret{N}` column the resolver can read, ascending.
///
/// A label must round-trip through [`return_column`]: `ret05` is not `ret5`.
pub fn available_horizons(dataset: &Dataset) -> Vec<Duration> {
    let mut horizons: Vec<Duration> = dataset
        .column_names()
        .iter()
        .filter_map(|name| {
            let digits = name.strip_prefix(RETURN_PREFIX)?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let horizon = Duration::from_secs(digits.parse::<u64>().ok()?);
            let canonical = return_column(horizon).ok()? == *name;
            (canonical && dataset.float(name).is_some()).then_some(horizon)
        })
        .collect();
    horizons.sort();
    horizons.dedup();
    horizons
}

/// Borrowed forward-return columns for one horizon.
#[derive(Debug, Clone, Copy)]
pub struct ForwardView<'a> {
    pub returns: &'a [f64],
    pub mids: Option<&'a [f64]>,
}

/// Validate `spec` against `dataset` and borrow the horizon's columns.
///
/// Same checks as [`resolve_forward_returns`] without copying the table.
pub fn forward_view<'a>(
    dataset: &'a Dataset,
    spec: &ForwardReturnSpec,
    timestamp_column: &str,
    mid_column_name: &str,
) -> Result<ForwardView<'a>> {
    if !dataset.has_column(timestamp_column) {
        return Err(ProfileError::missing(
            timestamp_column,
            "timestamp column missing; the archive loader must provide it",
        ));
    }
    if !dataset.has_column(mid_column_name) {
        return Err(ProfileError::missing(
            mid_column_name,
            "mid column missing; touch_bid/touch_ask must be present at load time",
        ));
    }

    let ret_col = return_column(spec.horizon)?;
    let mid_forward_col = mid_column(spec.horizon)?;

    let returns = dataset
        .float(&ret_col)
        .ok_or_else(|| ProfileError::missing(&ret_col, "missing forward return column"))?;

    trace!(
        horizon_secs = spec.horizon.as_secs(),
        group = %spec.group_column,
        column = %ret_col,
        "forward return resolved"
    );

    Ok(ForwardView {
        returns,
        mids: dataset.float(&mid_forward_col),
    })
}

/// Derive a dataset carrying `forward_return` (and `forward_mid` when the
/// horizon's forward mid column exists) for `spec.horizon`.
pub fn resolve_forward_returns(
    dataset: &Dataset,
    spec: &ForwardReturnSpec,
    timestamp_column: &str,
    mid_column_name: &str,
) -> Result<Dataset> {
    let view = forward_view(dataset, spec, timestamp_column, mid_column_name)?;

    let mut out = dataset.clone();
    out.insert(FORWARD_RETURN, Column::Float(view.returns.to_vec()))?;
    if let Some(mids) = view.mids {
        out.insert(FORWARD_MID, Column::Float(mids.to_vec()))?;
    }
    Ok(out)
}

/// [`resolve_forward_returns`] with the loader's default column names.
pub fn resolve(dataset: &Dataset, spec: &ForwardReturnSpec) -> Result<Dataset> {
    resolve_forward_returns(dataset, spec, DEFAULT_TIMESTAMP_COLUMN, DEFAULT_MID_COLUMN)
}

// =============================================================================
// Horizon strings ("1s", "500ms", "2min")
// =============================================================================

/// Parse a horizon such as `1s`, `500ms`, `1.5s`, `2min`, `1h`.
pub fn parse_horizon(raw: &str) -> Result<Duration> {
    let text = raw.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| ProfileError::InvalidHorizon(raw.to_string()))?;

    let unit_nanos: f64 = match unit.trim() {
        "ns" => 1.0,
        "us" | "µs" => 1e3,
        "ms" => 1e6,
        "s" | "sec" | "secs" => 1e9,
        "m" | "min" | "mins" => 60e9,
        "h" | "hr" | "hours" => 3600e9,
        _ => return Err(ProfileError::InvalidHorizon(raw.to_string())),
    };

    let nanos = (value * unit_nanos).round();
    if !nanos.is_finite() || nanos < 0.0 || nanos > u64::MAX as f64 {
        return Err(ProfileError::InvalidHorizon(raw.to_string()));
    }
    Ok(Duration::from_nanos(nanos as u64))
}

/// Inverse of [`parse_horizon`] in the coarsest exact unit.
pub fn format_horizon(horizon: Duration) -> String {
    if horizon.subsec_nanos() == 0 {
        format!("{}s", horizon.as_secs())
    } else if horizon.subsec_nanos() % 1_000_000 == 0 {
        format!("{}ms", horizon.as_millis())
    } else {
        format!("{}ns", horizon.as_nanos())
    }
}

/// Serde adapter: a horizon as its string form (`"5s"`).
pub mod serde_horizon {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(horizon: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_horizon(*horizon))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_horizon(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for a list of horizons.
pub mod serde_horizons {
    use std::time::Duration;

    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(horizons: &[Duration], s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(horizons.len()))?;
        for h in horizons {
            seq.serialize_element(&super::format_horizon(*h))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Duration>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|raw| super::parse_horizon(raw).map_err(serde::de::Error::custom))
            .collect()
    }
}
