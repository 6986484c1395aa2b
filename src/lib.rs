// =============================================================================
// alphaprofile — Retrospective evaluation of order-book alpha signals
// =============================================================================
//
// Stages:
//   loader     archive CSV → Dataset (touch prices → per-horizon returns)
//   forward    forward-return resolution for one horizon
//   metrics    hit rate, conditional distribution, decay, regime, adverse
//   profile    metric suite across every candidate alpha
//   selection  constraint filter + weighted z-score ranking
//   report     CSV / JSON artifacts
// =============================================================================

pub mod config;
pub mod dataset;
pub mod error;
pub mod forward;
pub mod loader;
pub mod metrics;
pub mod profile;
pub mod report;
pub mod selection;

pub use config::{ProfileConfig, SelectionConfig};
pub use dataset::{Column, Dataset};
pub use error::ProfileError;
pub use forward::{resolve_forward_returns, ForwardReturnSpec};
pub use profile::{run_profile, ProfileReport, SummaryRow};
pub use selection::select_best;
