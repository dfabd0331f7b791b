//! Serializable record of one estimation call.
//!
//! `EstimationReport` is returned by
//! [`TreeHeightAnalyzer::estimate_with_report`](crate::TreeHeightAnalyzer) and
//! carries every intermediate value plus per-stage timings.

pub mod report;
pub mod timing;

pub use report::{EstimationReport, HeightSource, InputDescriptor, StageNote};
pub use timing::{StageTiming, TimingBreakdown};
