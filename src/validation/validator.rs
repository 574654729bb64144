use std::collections::BTreeSet;

use super::config::ValidatorConfig;
use super::types::{InputQuality, ValidationResult};

/// Punctuation and symbols removed during cleaning (ASCII plus common CJK forms).
const STRIPPED_CHARS: &[char] = &[
    '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '.', '/', ':', ';', '<', '=',
    '>', '?', '@', '[', '\\', ']', '^', '`', '{', '|', '}', '~', '，', '。', '！', '？', '、', '；',
    '：', '“', '”', '‘', '’', '（', '）', '【', '】', '《', '》', '…', '—', '～', '·', '「', '」',
];

/// Classifies and cleans raw utterances. Pure function of its input and tables.
#[derive(Debug, Clone)]
pub struct InputQualityValidator {
    config: ValidatorConfig,
    /// Length in chars of the longest vague word; bounds the segmentation window.
    longest_vague_word: usize,
}

impl Default for InputQualityValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl InputQualityValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        let longest_vague_word = config
            .keywords
            .vague
            .iter()
            .map(|w| w.chars().count())
            .max()
            .unwrap_or(0);
        Self {
            config,
            longest_vague_word,
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Trims, strips [`STRIPPED_CHARS`] and collapses whitespace.
    pub fn clean(raw: &str) -> String {
        raw.chars()
            .map(|c| if STRIPPED_CHARS.contains(&c) { ' ' } else { c })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn validate(&self, raw: &str) -> ValidationResult {
        let cleaned = Self::clean(raw);
        let lowered = cleaned.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        let keywords = &self.config.keywords;

        if raw.trim().is_empty() || cleaned.is_empty() || !cleaned.chars().any(char::is_alphanumeric)
        {
            return rejected(
                InputQuality::Invalid,
                cleaned,
                "input is empty or contains only symbols",
                Some("请输入具体的查询内容"),
            );
        }

        let char_count = cleaned.chars().filter(|c| !c.is_whitespace()).count();
        if char_count < self.config.min_input_chars {
            return rejected(
                InputQuality::TooShort,
                cleaned,
                &format!(
                    "input has {char_count} characters, minimum is {}",
                    self.config.min_input_chars
                ),
                Some("请补充更完整的描述"),
            );
        }

        if tokens.len() <= self.config.max_vague_tokens
            && tokens
                .iter()
                .all(|t| composed_of(t, &keywords.vague, self.longest_vague_word))
        {
            return rejected(
                InputQuality::Vague,
                cleaned,
                "input consists only of vague words",
                Some("请说明想查看哪方面的内容，例如：今天的销售额"),
            );
        }

        let is_irrelevant = contains_any(&lowered, &tokens, &keywords.irrelevant)
            && !contains_any(&lowered, &tokens, &keywords.business);
        if is_irrelevant {
            let mut result = rejected(
                InputQuality::Irrelevant,
                cleaned,
                "input is outside the business domain",
                Some("可以询问销售、库存、订单等业务问题"),
            );
            result.is_irrelevant = true;
            return result;
        }

        if contains_any(&lowered, &tokens, &keywords.write) {
            return ValidationResult {
                is_valid: true,
                quality: InputQuality::WriteOp,
                cleaned_input: cleaned,
                is_write_operation: true,
                is_irrelevant: false,
                reason: "input requests a write operation".to_string(),
                suggestion: None,
            };
        }

        ValidationResult {
            is_valid: true,
            quality: InputQuality::Good,
            cleaned_input: cleaned,
            is_write_operation: false,
            is_irrelevant: false,
            reason: "ok".to_string(),
            suggestion: None,
        }
    }
}

fn rejected(
    quality: InputQuality,
    cleaned_input: String,
    reason: &str,
    suggestion: Option<&str>,
) -> ValidationResult {
    ValidationResult {
        is_valid: false,
        quality,
        cleaned_input,
        is_write_operation: false,
        is_irrelevant: false,
        reason: reason.to_string(),
        suggestion: suggestion.map(str::to_string),
    }
}

fn contains_any(lowered: &str, tokens: &[&str], keywords: &BTreeSet<String>) -> bool {
    keywords.iter().any(|kw| {
        if kw.is_ascii() {
            tokens.iter().any(|t| *t == kw.as_str())
        } else {
            lowered.contains(kw.as_str())
        }
    })
}

/// `true` if `token` splits entirely into words from `words` ("查询数据" → 查询 + 数据).
///
/// `longest` is the char length of the longest word, so each position looks back at
/// most that far. Linear in the token length.
fn composed_of(token: &str, words: &BTreeSet<String>, longest: usize) -> bool {
    if token.is_empty() || longest == 0 {
        return false;
    }

    let boundaries: Vec<usize> = token
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(token.len()))
        .collect();

    // reachable[i]: token[..boundaries[i]] is a concatenation of vague words
    let mut reachable = vec![false; boundaries.len()];
    reachable[0] = true;
    for end in 1..boundaries.len() {
        let window = end.saturating_sub(longest);
        // Nothing reachable within one word's length: no later position can be reached either.
        if !reachable[window..end].iter().any(|r| *r) {
            return false;
        }
        reachable[end] = (window..end)
            .any(|start| reachable[start] && words.contains(&token[boundaries[start]..boundaries[end]]));
    }

    reachable[boundaries.len() - 1]
}

