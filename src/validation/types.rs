use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Quality tier assigned to a raw utterance.
pub enum InputQuality {
    /// Clear, in-domain query.
    Good,
    /// Too little content to pick an intent (e.g. a lone "数据").
    Vague,
    /// Below the minimum length.
    TooShort,
    /// Mutating command; valid, but judged differently.
    WriteOp,
    /// Out-of-domain chatter with no business keyword.
    Irrelevant,
    /// Empty or symbols only.
    Invalid,
}

impl InputQuality {
    /// Every tier, in classification priority order.
    pub const ALL: [InputQuality; 6] = [
        InputQuality::Invalid,
        InputQuality::TooShort,
        InputQuality::Vague,
        InputQuality::Irrelevant,
        InputQuality::WriteOp,
        InputQuality::Good,
    ];

    /// Multiplier applied to every candidate score for inputs of this tier.
    pub fn confidence_modifier(self) -> f32 {
        match self {
            InputQuality::Good => 1.0,
            InputQuality::WriteOp => 0.8,
            InputQuality::Vague => 0.5,
            InputQuality::TooShort => 0.3,
            InputQuality::Irrelevant | InputQuality::Invalid => 0.0,
        }
    }

    /// `true` for tiers that may be judged at all.
    pub fn is_judgeable(self) -> bool {
        matches!(self, InputQuality::Good | InputQuality::WriteOp)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InputQuality::Good => "GOOD",
            InputQuality::Vague => "VAGUE",
            InputQuality::TooShort => "TOO_SHORT",
            InputQuality::WriteOp => "WRITE_OP",
            InputQuality::Irrelevant => "IRRELEVANT",
            InputQuality::Invalid => "INVALID",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            InputQuality::Invalid => 0,
            InputQuality::TooShort => 1,
            InputQuality::Vague => 2,
            InputQuality::Irrelevant => 3,
            InputQuality::WriteOp => 4,
            InputQuality::Good => 5,
        }
    }
}

impl std::fmt::Display for InputQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Outcome of input triage.
pub struct ValidationResult {
    /// `true` only for [`InputQuality::Good`] and [`InputQuality::WriteOp`].
    pub is_valid: bool,
    pub quality: InputQuality,
    /// Trimmed, whitespace-collapsed, punctuation-stripped input. Always computed.
    pub cleaned_input: String,
    pub is_write_operation: bool,
    pub is_irrelevant: bool,
    /// Human-readable reason for the tier.
    pub reason: String,
    /// Hint for a clarification prompt, when the tier calls for one.
    pub suggestion: Option<String>,
}

impl ValidationResult {
    /// Shorthand for [`InputQuality::confidence_modifier`].
    pub fn confidence_modifier(&self) -> f32 {
        self.quality.confidence_modifier()
    }

    /// `true` when the caller should ask the user to rephrase.
    pub fn needs_clarification(&self) -> bool {
        matches!(
            self.quality,
            InputQuality::Vague | InputQuality::TooShort | InputQuality::Invalid
        )
    }
}
