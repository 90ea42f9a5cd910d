//! Forensics Module
//!
//! Turns a note image into human-readable reasons for a FAKE verdict.
//!
//! ## Structure
//! - `planes`: decoded 8-bit planes (gray, RGB, saturation)
//! - `edges`: fixed-threshold edge detector
//! - `signals`: the quantitative forensic signals
//! - `reasons`: ordered threshold rules + fallback policy
//! - `visuals`: base64 renderings for the operator UI
//!
//! ## Usage
//! ```ignore
//! use notecheck::forensics;
//!
//! let explanation = forensics::explain(Path::new("uploads/note.jpg"));
//! let reasons = explanation.into_reasons();
//! ```

pub mod planes;
pub mod edges;
pub mod signals;
pub mod reasons;
pub mod visuals;

use std::path::Path;

use thiserror::Error;

pub use planes::ImagePlanes;
pub use signals::ForensicSignals;
pub use visuals::VisualReport;

#[derive(Debug, Error)]
pub enum ForensicError {
    #[error("failed to load image {path}: {reason}")]
    ImageLoad { path: String, reason: String },

    #[error("image has no pixels")]
    EmptyImage,

    #[error("failed to render visual: {0}")]
    Render(String),
}

/// How the reason list for a FAKE verdict was produced
#[derive(Debug)]
pub enum Explanation {
    /// At least one threshold rule fired
    Rules {
        signals: ForensicSignals,
        reasons: Vec<String>,
    },
    /// No rule fired, generic reasons were injected
    Fallback {
        signals: ForensicSignals,
        reasons: Vec<String>,
    },
    /// Signal extraction failed; classification still proceeds
    Degraded(ForensicError),
}

impl Explanation {
    pub fn from_signals(signals: ForensicSignals) -> Self {
        let reasons = reasons::rule_reasons(&signals);
        if reasons.is_empty() {
            Self::Fallback {
                reasons: reasons::fallback_reasons(&signals),
                signals,
            }
        } else {
            Self::Rules { signals, reasons }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn into_reasons(self) -> Vec<String> {
        match self {
            Self::Rules { reasons, .. } | Self::Fallback { reasons, .. } => reasons,
            Self::Degraded(_) => vec![reasons::REASON_ANALYSIS_FAILED.to_string()],
        }
    }
}

/// Decode and measure; decode failure is a hard error here
pub fn analyze(path: &Path) -> Result<ForensicSignals, ForensicError> {
    let planes = ImagePlanes::open(path)?;
    ForensicSignals::extract(&planes)
}

/// Explain a FAKE verdict. Never fails: extraction errors downgrade to
/// `Explanation::Degraded` and are logged.
pub fn explain(path: &Path) -> Explanation {
    match analyze(path) {
        Ok(signals) => {
            tracing::debug!(
                "Forensic signals for {}: sharpness={:.1} brightness={:.1} contrast={:.1} saturation={:.1} edges={:.3} cast={:.1}",
                path.display(),
                signals.sharpness,
                signals.brightness,
                signals.contrast,
                signals.saturation,
                signals.edge_density,
                signals.color_cast
            );
            Explanation::from_signals(signals)
        }
        Err(e) => {
            tracing::warn!("Forensic analysis degraded for {}: {}", path.display(), e);
            Explanation::Degraded(e)
        }
    }
}

/// Renderings for the visual inspection view
pub fn render_visuals(path: &Path) -> Result<VisualReport, ForensicError> {
    let planes = ImagePlanes::open(path)?;
    visuals::render(&planes)
}
