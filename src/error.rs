//! Typed stage failures.
//!
//! Every stage returns `Result<_, EstimateError>`; the analyzer logs the error
//! and treats it as "no value" when deciding which stage runs next.
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Pipeline stage that produced a value or an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Load,
    Reference,
    EdgeSpan,
    ColorSpan,
    Height,
    Fallback,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Reference => "reference",
            Stage::EdgeSpan => "edge-span",
            Stage::ColorSpan => "color-span",
            Stage::Height => "height",
            Stage::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    /// The input could not be opened or decoded.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The image decoded but has no pixels.
    #[error("image has zero area")]
    EmptyImage,
    /// A heuristic found nothing matching what it looks for.
    #[error("{stage}: no signal ({reason})")]
    NoSignal { stage: Stage, reason: String },
    /// A value exists but is too small to trust.
    #[error("{stage}: {value:.1} is below the threshold {threshold:.1}")]
    BelowThreshold {
        stage: Stage,
        value: f64,
        threshold: f64,
    },
}

impl EstimateError {
    pub(crate) fn no_signal(stage: Stage, reason: impl Into<String>) -> Self {
        EstimateError::NoSignal {
            stage,
            reason: reason.into(),
        }
    }
}
