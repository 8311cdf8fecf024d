use serde::Serialize;
use thiserror::Error;

/// Five-level sentiment scale, ordered most-positive to most-negative.
///
/// The raw model score leans negative: a low positive-class probability means
/// a happier review. The thresholds below read the score on that scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentCategory {
    #[serde(rename = "very positive")]
    VeryPositive,
    #[serde(rename = "positive")]
    Positive,
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "negative")]
    Negative,
    #[serde(rename = "very negative")]
    VeryNegative,
}

impl SentimentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryPositive => "very positive",
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::VeryNegative => "very negative",
        }
    }

    /// Persian display label shown on the dashboard.
    pub fn label_fa(&self) -> &'static str {
        match self {
            Self::VeryPositive => "بسیار مثبت",
            Self::Positive => "مثبت",
            Self::Neutral => "خنثی",
            Self::Negative => "منفی",
            Self::VeryNegative => "بسیار منفی",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::VeryPositive => "😊",
            Self::Positive => "🙂",
            Self::Neutral => "😐",
            Self::Negative => "🙁",
            Self::VeryNegative => "😢",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum VerdictError {
    /// The model provider handed us a probability outside [0, 1]. This is a
    /// provider defect and must not be clamped away.
    #[error("positive-class probability {0} is outside [0, 1]")]
    OutOfRange(f64),
}

/// Verdict for a single review: the category, its glyph, and the value the
/// gauge needle points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentVerdict {
    pub category: SentimentCategory,
    pub glyph: &'static str,
    pub display_score: f64,
}

/// Map a positive-class probability to the verdict shown to the user.
///
/// Bucket edges are closed on the upper side. The gauge value inverts the
/// raw score (`(1 - score) * 100`) so that higher displayed numbers mean a
/// happier review, matching the score guide rendered next to the chart.
pub fn verdict(score: f64) -> Result<SentimentVerdict, VerdictError> {
    if !(0.0..=1.0).contains(&score) {
        return Err(VerdictError::OutOfRange(score));
    }

    let category = if score <= 0.2 {
        SentimentCategory::VeryPositive
    } else if score <= 0.4 {
        SentimentCategory::Positive
    } else if score <= 0.6 {
        SentimentCategory::Neutral
    } else if score <= 0.8 {
        SentimentCategory::Negative
    } else {
        SentimentCategory::VeryNegative
    };

    Ok(SentimentVerdict {
        category,
        glyph: category.glyph(),
        display_score: (1.0 - score) * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_of(score: f64) -> SentimentCategory {
        verdict(score).unwrap().category
    }

    #[test]
    fn bucket_ranges() {
        for score in [0.0, 0.05, 0.1, 0.2] {
            assert_eq!(category_of(score), SentimentCategory::VeryPositive);
        }
        for score in [0.21, 0.3, 0.4] {
            assert_eq!(category_of(score), SentimentCategory::Positive);
        }
        for score in [0.41, 0.5, 0.6] {
            assert_eq!(category_of(score), SentimentCategory::Neutral);
        }
        for score in [0.61, 0.7, 0.8] {
            assert_eq!(category_of(score), SentimentCategory::Negative);
        }
        for score in [0.81, 0.9, 0.95, 1.0] {
            assert_eq!(category_of(score), SentimentCategory::VeryNegative);
        }
    }

    #[test]
    fn upper_edges_are_closed() {
        assert_eq!(category_of(0.2), SentimentCategory::VeryPositive);
        assert_eq!(category_of(0.4), SentimentCategory::Positive);
        assert_eq!(category_of(0.6), SentimentCategory::Neutral);
        assert_eq!(category_of(0.8), SentimentCategory::Negative);
    }

    #[test]
    fn glyph_matches_category() {
        for (score, glyph) in [(0.1, "😊"), (0.3, "🙂"), (0.5, "😐"), (0.7, "🙁"), (0.9, "😢")] {
            let v = verdict(score).unwrap();
            assert_eq!(v.glyph, glyph);
            assert_eq!(v.glyph, v.category.glyph());
        }
    }

    #[test]
    fn display_score_inverts_the_raw_score() {
        assert_eq!(verdict(0.0).unwrap().display_score, 100.0);
        assert_eq!(verdict(0.25).unwrap().display_score, 75.0);
        assert_eq!(verdict(1.0).unwrap().display_score, 0.0);
    }

    #[test]
    fn display_score_is_monotonically_decreasing_and_bounded() {
        let mut previous = f64::INFINITY;
        for step in 0..=100 {
            let score = f64::from(step) / 100.0;
            let display = verdict(score).unwrap().display_score;
            assert!(display < previous);
            assert!((0.0..=100.0).contains(&display));
            previous = display;
        }
    }

    #[test]
    fn same_score_same_verdict() {
        for score in [0.0, 0.2, 0.33, 0.8, 1.0] {
            assert_eq!(verdict(score).unwrap(), verdict(score).unwrap());
        }
    }

    #[test]
    fn out_of_range_is_rejected_not_clamped() {
        assert_eq!(verdict(-0.01), Err(VerdictError::OutOfRange(-0.01)));
        assert_eq!(verdict(1.01), Err(VerdictError::OutOfRange(1.01)));
        assert!(verdict(f64::NAN).is_err());
    }

    #[test]
    fn end_to_end_examples() {
        let very_positive = verdict(0.05).unwrap();
        assert_eq!(very_positive.category, SentimentCategory::VeryPositive);
        assert_eq!(very_positive.glyph, "😊");
        assert_eq!(very_positive.display_score, 95.0);

        let neutral = verdict(0.5).unwrap();
        assert_eq!(neutral.category, SentimentCategory::Neutral);
        assert_eq!(neutral.display_score, 50.0);

        let very_negative = verdict(0.95).unwrap();
        assert_eq!(very_negative.category, SentimentCategory::VeryNegative);
        assert!((very_negative.display_score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn category_serializes_to_its_wire_name() {
        let value = serde_json::to_value(SentimentCategory::VeryPositive).unwrap();
        assert_eq!(value, serde_json::json!("very positive"));
        let value = serde_json::to_value(SentimentCategory::Neutral).unwrap();
        assert_eq!(value, serde_json::json!("neutral"));
    }
}
