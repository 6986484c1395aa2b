// =============================================================================
// Metric Suite
// =============================================================================
//
// Five stateless measurements of a candidate alpha against its forward return:
// - Hit rate (directional accuracy)
// - Conditional return distribution per signal bucket
// - Decay curve (information coefficient per horizon)
// - Regime dependence across realized-volatility buckets
// - Adverse selection proxy
//
// None of them fail on thin data. Configuration problems (a missing column)
// are the only errors, and only the dataset-level metrics can hit them.

pub mod adverse;
pub mod conditional;
pub mod decay;
pub mod hit_rate;
pub mod regime;
pub mod stats;

pub use adverse::{adverse_selection_proxy, AdverseSelection};
pub use conditional::{conditional_return_distribution, BucketStats, DEFAULT_BINS};
pub use decay::{decay_curve, DecayPoint};
pub use hit_rate::{hit_rate, HitRateResult};
pub use regime::{regime_dependence, RegimeStats, DEFAULT_REGIMES, DEFAULT_VOL_WINDOW};
