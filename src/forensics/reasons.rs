//! Reason Synthesizer
//!
//! Threshold rules evaluated in declaration order; output order is the
//! table order, not severity. When nothing fires, the fallback policy
//! supplies generic reasons so a FAKE verdict never ships without one.

use super::signals::ForensicSignals;

// ============================================================================
// THRESHOLDS (fixed, not runtime-configurable)
// ============================================================================

pub const BLUR_SHARPNESS_MAX: f64 = 100.0;
pub const DARK_BRIGHTNESS_MAX: f64 = 50.0;
pub const OVEREXPOSED_BRIGHTNESS_MIN: f64 = 220.0;
pub const LOW_CONTRAST_MAX: f64 = 30.0;
pub const FADED_SATURATION_MAX: f64 = 30.0;
pub const MISSING_TEXTURE_EDGE_MAX: f64 = 0.05;
pub const SMOOTH_TEXTURE_EDGE_MAX: f64 = 0.10;
pub const COLOR_CAST_MIN: f64 = 40.0;

pub const FALLBACK_BRIGHT_PAPER_MIN: f64 = 180.0;
pub const FALLBACK_LOW_INK_CONTRAST_MAX: f64 = 50.0;

// ============================================================================
// REASON TEXT
// ============================================================================

pub const REASON_BLURRY: &str = "Image/Print is too blurry - Check watermark clarity";
pub const REASON_TOO_DARK: &str = "Image is too dark - Security thread visibility low";
pub const REASON_OVEREXPOSED: &str = "Image is overexposed - Texture details lost";
pub const REASON_LOW_CONTRAST: &str = "Low contrast - Print quality looks washed out";
pub const REASON_FADED: &str = "Colors look faded/grayscale - Possible photocopy";
pub const REASON_MISSING_TEXTURE: &str = "Lack of fine details/texture - Intaglio printing missing";
pub const REASON_SMOOTH_TEXTURE: &str = "Texture appears smoother than genuine currency";
pub const REASON_COLOR_CAST: &str = "Unnatural color cast detected - Possible ink misalignment";

pub const REASON_NN_ARTIFACTS: &str = "Suspicious high-frequency artifacts detected by Neural Network";
pub const REASON_SECURITY_DEVIATION: &str = "Subtle security feature deviations (Watermark/Thread)";
pub const REASON_BRIGHT_PAPER: &str = "Paper appears unusually bright/bleached";
pub const REASON_LOW_INK: &str = "Print ink density lower than standard";

pub const REASON_ANALYSIS_FAILED: &str = "Automated visual analysis failed";

/// One row of the table: a name for logs and a check yielding at most one reason
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&ForensicSignals) -> Option<&'static str>,
}

pub static RULES: &[Rule] = &[
    Rule {
        name: "sharpness",
        check: |s| (s.sharpness < BLUR_SHARPNESS_MAX).then_some(REASON_BLURRY),
    },
    Rule {
        name: "brightness",
        check: |s| {
            if s.brightness < DARK_BRIGHTNESS_MAX {
                Some(REASON_TOO_DARK)
            } else if s.brightness > OVEREXPOSED_BRIGHTNESS_MIN {
                Some(REASON_OVEREXPOSED)
            } else {
                None
            }
        },
    },
    Rule {
        name: "contrast",
        check: |s| (s.contrast < LOW_CONTRAST_MAX).then_some(REASON_LOW_CONTRAST),
    },
    Rule {
        name: "saturation",
        check: |s| (s.saturation < FADED_SATURATION_MAX).then_some(REASON_FADED),
    },
    Rule {
        name: "edge_density",
        check: |s| {
            if s.edge_density < MISSING_TEXTURE_EDGE_MAX {
                Some(REASON_MISSING_TEXTURE)
            } else if s.edge_density < SMOOTH_TEXTURE_EDGE_MAX {
                Some(REASON_SMOOTH_TEXTURE)
            } else {
                None
            }
        },
    },
    Rule {
        name: "color_cast",
        check: |s| (s.color_cast > COLOR_CAST_MIN).then_some(REASON_COLOR_CAST),
    },
];

/// Reasons from the rule table only (may be empty)
pub fn rule_reasons(signals: &ForensicSignals) -> Vec<String> {
    RULES
        .iter()
        .filter_map(|rule| {
            let reason = (rule.check)(signals)?;
            tracing::trace!("forensic rule '{}' fired", rule.name);
            Some(reason.to_string())
        })
        .collect()
}

/// Generic reasons used when no rule fired
pub fn fallback_reasons(signals: &ForensicSignals) -> Vec<String> {
    let mut reasons = vec![
        REASON_NN_ARTIFACTS.to_string(),
        REASON_SECURITY_DEVIATION.to_string(),
    ];
    if signals.brightness > FALLBACK_BRIGHT_PAPER_MIN {
        reasons.push(REASON_BRIGHT_PAPER.to_string());
    }
    if signals.contrast < FALLBACK_LOW_INK_CONTRAST_MAX {
        reasons.push(REASON_LOW_INK.to_string());
    }
    reasons
}

/// Full synthesis: rules, or the fallback policy when none fired
pub fn synthesize(signals: &ForensicSignals) -> Vec<String> {
    let reasons = rule_reasons(signals);
    if reasons.is_empty() {
        fallback_reasons(signals)
    } else {
        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Values that pass every rule and avoid both fallback extras
    fn clean() -> ForensicSignals {
        ForensicSignals {
            sharpness: 450.0,
            brightness: 140.0,
            contrast: 62.0,
            saturation: 75.0,
            edge_density: 0.18,
            color_cast: 12.0,
        }
    }

    #[test]
    fn test_clean_signals_fire_no_rule() {
        assert!(rule_reasons(&clean()).is_empty());
    }

    #[test]
    fn test_fallback_injects_exactly_two() {
        let reasons = synthesize(&clean());
        assert_eq!(reasons, vec![REASON_NN_ARTIFACTS.to_string(), REASON_SECURITY_DEVIATION.to_string()]);
    }

    #[test]
    fn test_boundaries_do_not_fire() {
        let s = ForensicSignals {
            sharpness: 100.0,
            brightness: 220.0,
            contrast: 30.0,
            saturation: 30.0,
            edge_density: 0.10,
            color_cast: 40.0,
        };
        assert!(rule_reasons(&s).is_empty());

        let s = ForensicSignals { brightness: 50.0, ..s };
        assert!(rule_reasons(&s).is_empty());
    }

    #[test]
    fn test_fallback_extras() {
        let s = ForensicSignals { brightness: 200.0, contrast: 40.0, ..clean() };
        let reasons = synthesize(&s);
        assert_eq!(reasons.len(), 4);
        assert_eq!(reasons[2], REASON_BRIGHT_PAPER);
        assert_eq!(reasons[3], REASON_LOW_INK);
    }

    #[test]
    fn test_output_follows_table_order() {
        let s = ForensicSignals {
            sharpness: 10.0,
            brightness: 20.0,
            contrast: 5.0,
            saturation: 3.0,
            edge_density: 0.01,
            color_cast: 80.0,
        };
        let reasons = synthesize(&s);
        assert_eq!(
            reasons,
            vec![
                REASON_BLURRY,
                REASON_TOO_DARK,
                REASON_LOW_CONTRAST,
                REASON_FADED,
                REASON_MISSING_TEXTURE,
                REASON_COLOR_CAST,
            ]
        );
    }

    #[test]
    fn test_mutually_exclusive_branches() {
        let bright = ForensicSignals { brightness: 240.0, ..clean() };
        assert_eq!(synthesize(&bright), vec![REASON_OVEREXPOSED]);

        let soft = ForensicSignals { edge_density: 0.07, ..clean() };
        assert_eq!(synthesize(&soft), vec![REASON_SMOOTH_TEXTURE]);

        let missing = ForensicSignals { edge_density: 0.02, ..clean() };
        assert_eq!(synthesize(&missing), vec![REASON_MISSING_TEXTURE]);
    }

    #[test]
    fn test_never_empty() {
        let grid = [0.0, 0.04, 0.08, 25.0, 45.0, 99.0, 150.0, 190.0, 230.0, 500.0];
        for &a in &grid {
            for &b in &grid {
                let s = ForensicSignals {
                    sharpness: a * 3.0,
                    brightness: b,
                    contrast: a,
                    saturation: b,
                    edge_density: a / 100.0,
                    color_cast: b / 4.0,
                };
                assert!(!synthesize(&s).is_empty());
            }
        }
    }
}
