use super::TimingBreakdown;
use crate::error::{EstimateError, Stage};
use crate::height::CalculationMode;
use crate::reference::ReferenceKind;
use serde::Serialize;

/// Which stage produced the final height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HeightSource {
    Reference,
    Camera,
    Fallback,
    FailureConstant,
}

impl From<CalculationMode> for HeightSource {
    fn from(mode: CalculationMode) -> Self {
        match mode {
            CalculationMode::Reference => HeightSource::Reference,
            CalculationMode::Camera => HeightSource::Camera,
        }
    }
}

/// A stage that produced no value, and why.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageNote {
    pub stage: Stage,
    pub message: String,
}

impl StageNote {
    pub fn from_error(stage: Stage, err: &EstimateError) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
}

/// Everything one estimation call found out, for logging and JSON export.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationReport {
    /// Final height in meters, rounded to two decimals.
    pub height_m: f64,
    pub source: HeightSource,
    pub input: InputDescriptor,
    pub reference_kind: ReferenceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_px: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_span_px: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_span_px: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_span_px: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_height_m: Option<f64>,
    pub clamped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green_ratio: Option<f64>,
    pub notes: Vec<StageNote>,
    pub timings: TimingBreakdown,
}

impl EstimationReport {
    pub(crate) fn new(reference_kind: ReferenceKind) -> Self {
        Self {
            height_m: 0.0,
            source: HeightSource::FailureConstant,
            input: InputDescriptor::default(),
            reference_kind,
            reference_px: None,
            edge_span_px: None,
            color_span_px: None,
            mean_span_px: None,
            raw_height_m: None,
            clamped: false,
            green_ratio: None,
            notes: Vec::new(),
            timings: TimingBreakdown::default(),
        }
    }

    pub(crate) fn note(&mut self, stage: Stage, err: &EstimateError) {
        self.notes.push(StageNote::from_error(stage, err));
    }

    /// Whether the height calculator produced the final value.
    pub fn used_calculator(&self) -> bool {
        matches!(self.source, HeightSource::Reference | HeightSource::Camera)
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        let span = self
            .mean_span_px
            .map(|s| format!("{s:.1}px"))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{:.2} m via {:?} (span {span}, {} note(s), {:.1} ms)",
            self.height_m,
            self.source,
            self.notes.len(),
            self.timings.total_ms
        )
    }
}
