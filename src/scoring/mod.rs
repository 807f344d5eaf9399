//! Baseline comparison and verdicts
//!
//! # Rules
//!
//! ```text
//! static regression    current > baseline × multiplier   (no baseline → skipped)
//! semantic complexity  rating.complexity > 7
//! compatibility        rating.compatibility < 5
//! conflicts            static ∪ semantic conflict labels non-empty
//! violations           static ∪ semantic violation labels non-empty
//! ```
//!
//! A verdict is triggered when any rule fires. Reasons keep the order above.
//!
//! # Example
//!
//! With baseline 40 and multiplier 2.0 the threshold is 80: a score of 90
//! triggers (12.5% over), a score of 80 does not.

mod baseline;
mod threshold;

pub use baseline::BaselineStore;
pub use threshold::ThresholdEvaluator;
