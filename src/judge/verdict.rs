//! Backend output normalization.
//!
//! A bare number in `[0, 1]` is a probability. Anything else is scanned for markers:
//! positive only is a match (score 1.0), everything else (negative, both, neither) is a
//! no-match (score 0.0).

use crate::constants::MATCH_PROBABILITY_CUTOFF;

const POSITIVE_MARKERS: &[&str] = &["是", "匹配", "yes", "match", "true"];
const NEGATIVE_MARKERS: &[&str] = &["否", "不是", "不匹配", "no", "not", "false", "mismatch"];
/// Negated forms that embed a positive marker; removed before scanning for positives.
const NEGATED_FORMS: &[&str] = &["不是", "不匹配"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub is_match: bool,
    pub score: f32,
    /// Output carried no usable signal (neither, or both, markers).
    pub ambiguous: bool,
}

pub fn parse_verdict(output: &str) -> Verdict {
    let trimmed = output.trim();

    if let Ok(probability) = trimmed.parse::<f32>()
        && probability.is_finite()
        && (0.0..=1.0).contains(&probability)
    {
        return Verdict {
            is_match: probability >= MATCH_PROBABILITY_CUTOFF,
            score: probability,
            ambiguous: false,
        };
    }

    let lowered = trimmed.to_lowercase();
    let without_negations = NEGATED_FORMS
        .iter()
        .fold(lowered.clone(), |text, form| text.replace(form, " "));
    let has = |text: &str, markers: &[&str]| {
        let words: Vec<&str> = text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        markers.iter().any(|m| {
            if m.is_ascii() {
                words.contains(m)
            } else {
                text.contains(m)
            }
        })
    };

    let positive = has(&without_negations, POSITIVE_MARKERS);
    let negative = has(&lowered, NEGATIVE_MARKERS);

    match (positive, negative) {
        (true, false) => Verdict {
            is_match: true,
            score: 1.0,
            ambiguous: false,
        },
        (false, true) => Verdict {
            is_match: false,
            score: 0.0,
            ambiguous: false,
        },
        _ => Verdict {
            is_match: false,
            score: 0.0,
            ambiguous: true,
        },
    }
}
