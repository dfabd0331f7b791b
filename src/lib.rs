#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod analyzer;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod params;
pub mod reference;

// Stage internals, public for tools and tests.
pub mod angle;
pub mod detect;
pub mod edges;
pub mod fallback;
pub mod filters;
pub mod height;
pub mod profile;
pub mod segments;

// --- High-level re-exports -------------------------------------------------

pub use crate::analyzer::{estimate_tree_height, TreeHeightAnalyzer};
pub use crate::diagnostics::{EstimationReport, HeightSource};
pub use crate::error::{EstimateError, Stage};
pub use crate::params::AnalyzerParams;
pub use crate::reference::{ReferenceKind, ReferenceMeasurement};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use tree_height::prelude::*;
/// use std::path::Path;
///
/// # fn main() {
/// let analyzer = TreeHeightAnalyzer::new(AnalyzerParams::default());
/// let report = analyzer.estimate_with_report(Path::new("tree.jpg"), ReferenceKind::Auto, 1.7);
/// println!("{:.2} m via {:?}", report.height_m, report.source);
/// # }
/// ```
pub mod prelude {
    pub use crate::{
        estimate_tree_height, AnalyzerParams, EstimationReport, HeightSource, ReferenceKind,
        TreeHeightAnalyzer,
    };
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    pub use crate::detect::{ColorSpanDetector, EdgeSpanDetector, SpanDetector};
    pub use crate::fallback::{FallbackEstimate, FallbackEstimator};
    pub use crate::height::{CalculationMode, HeightCalculator, HeightEstimate};
    pub use crate::profile::{find_peaks, PixelSpan};
    pub use crate::reference::ReferenceCalibrator;
}
