//! Reading bands for a score report.
//!
//! Overall status is banded on the total average; each dimension gets a
//! severity level; the three highest dimensions are highlighted against the
//! norm thresholds used by the report view.

use serde::Serialize;

use crate::catalog::{Catalog, Dimension};
use crate::scoring::ScoreReport;

/// Dimension mean at which a score counts as above the reference norm.
pub const ABOVE_NORM: f64 = 2.0;
/// Dimension mean treated as the clinical cut-off.
pub const CLINICAL_CUTOFF: f64 = 2.5;
/// Dimension mean marking pronounced symptoms.
pub const PRONOUNCED: f64 = 3.5;
/// Total average below which the overall picture is considered good.
pub const OVERALL_GOOD_BELOW: f64 = 1.5;

const HIGHLIGHT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// No notable symptom load.
    Good,
    /// Some mild symptoms, below clinical significance.
    Mild,
    /// Symptom load at or above the clinical cut-off.
    Significant,
}

impl OverallStatus {
    pub fn from_average(total_average: f64) -> Self {
        if total_average < OVERALL_GOOD_BELOW {
            OverallStatus::Good
        } else if total_average < CLINICAL_CUTOFF {
            OverallStatus::Mild
        } else {
            OverallStatus::Significant
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            OverallStatus::Good => {
                "Overall state looks good: all dimensions are in the normal range and few items were rated as troubling."
            }
            OverallStatus::Mild => {
                "Some mild symptoms are present, possibly linked to recent stress. Consider self-care and seek counselling if they persist."
            }
            OverallStatus::Significant => {
                "Marked symptoms are present across several dimensions. Consider consulting a mental health professional."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        if score >= PRONOUNCED {
            Severity::VeryHigh
        } else if score >= CLINICAL_CUTOFF {
            Severity::High
        } else if score >= ABOVE_NORM {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "normal range",
            Severity::Moderate => "mild symptoms",
            Severity::High => "moderate symptoms",
            Severity::VeryHigh => "pronounced symptoms",
        }
    }

    /// Coping advice shown next to a dimension at this level.
    pub fn advice(self) -> &'static str {
        match self {
            Severity::Low => {
                "Keep up your current routines and coping strategies, and keep an eye on your wellbeing."
            }
            Severity::Moderate => {
                "Adjust your pace, rest and relax, and try stress management such as exercise, meditation or talking with people close to you."
            }
            Severity::High => {
                "Consider professional counselling to learn coping strategies, and a psychiatric assessment if needed."
            }
            Severity::VeryHigh => {
                "Seek professional psychological treatment and a psychiatric assessment soon; medication may be combined with therapy."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormBand {
    WithinNorm,
    AboveNorm,
    WellAboveNorm,
}

impl NormBand {
    pub fn from_score(score: f64) -> Self {
        if score >= CLINICAL_CUTOFF {
            NormBand::WellAboveNorm
        } else if score >= ABOVE_NORM {
            NormBand::AboveNorm
        } else {
            NormBand::WithinNorm
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NormBand::WithinNorm => "within the normal range",
            NormBand::AboveNorm => "slightly above the norm, worth watching",
            NormBand::WellAboveNorm => "well above the norm, needs attention",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionReading {
    pub id: String,
    pub name: String,
    pub description: String,
    pub score: f64,
    pub severity: Severity,
    /// Level text from the catalog; empty when the catalog carries none.
    pub reading: String,
    pub advice: &'static str,
}

/// Catalog text for `dim` at `severity`.
///
/// Very high has no text of its own: it wraps the high text in a fixed
/// escalation message.
pub fn level_reading(dim: &Dimension, severity: Severity) -> String {
    let texts = &dim.interpretation;
    match severity {
        Severity::Low => texts.low.clone(),
        Severity::Moderate => texts.moderate.clone(),
        Severity::High => texts.high.clone(),
        Severity::VeryHigh => {
            let name = dim.name.to_lowercase();
            let mut out = format!(
                "Your {name} score is markedly elevated, indicating pronounced {name} symptoms."
            );
            if !texts.high.is_empty() {
                out.push(' ');
                out.push_str(&texts.high);
            }
            out.push_str(" Prompt professional support is recommended.");
            out
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub id: String,
    pub name: String,
    pub score: f64,
    pub band: NormBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub overall: OverallStatus,
    /// Every catalog dimension, in catalog order.
    pub dimensions: Vec<DimensionReading>,
    /// Up to three highest-scoring dimensions, highest first.
    pub highlights: Vec<Highlight>,
}

/// Band a report for display.
///
/// Dimensions present in the catalog but absent from the report read as 0.
pub fn interpret(report: &ScoreReport, catalog: &Catalog) -> Interpretation {
    let dimensions: Vec<DimensionReading> = catalog
        .dimensions()
        .iter()
        .map(|dim| {
            let score = report.dimension_score(&dim.id).unwrap_or(0.0);
            let severity = Severity::from_score(score);
            DimensionReading {
                id: dim.id.clone(),
                name: dim.name.clone(),
                description: dim.description.clone(),
                score,
                severity,
                reading: level_reading(dim, severity),
                advice: severity.advice(),
            }
        })
        .collect();

    // Stable sort keeps catalog order among equal scores.
    let mut ranked: Vec<&DimensionReading> = dimensions.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    let highlights = ranked
        .into_iter()
        .take(HIGHLIGHT_COUNT)
        .map(|d| Highlight {
            id: d.id.clone(),
            name: d.name.clone(),
            score: d.score,
            band: NormBand::from_score(d.score),
        })
        .collect();

    Interpretation {
        overall: OverallStatus::from_average(report.total_average),
        dimensions,
        highlights,
    }
}
