use std::collections::BTreeSet;
use std::env;

use crate::constants::{DEFAULT_MAX_VAGUE_TOKENS, DEFAULT_MIN_INPUT_CHARS};

const DEFAULT_VAGUE_WORDS: &[&str] = &[
    "数据", "信息", "情况", "东西", "那个", "这个", "什么", "看看", "查询", "查看", "帮我", "一下",
    "嗯", "哦", "啊", "好的", "help", "info", "data", "stuff", "something", "show", "check",
];

const DEFAULT_IRRELEVANT_KEYWORDS: &[&str] = &[
    "天气", "笑话", "唱歌", "电影", "新闻", "彩票", "游戏", "聊天", "你是谁", "星座", "weather",
    "joke", "movie", "song", "game", "horoscope",
];

const DEFAULT_BUSINESS_KEYWORDS: &[&str] = &[
    "销售", "订单", "库存", "批次", "客户", "产品", "设备", "考勤", "报表", "营收", "利润", "出库",
    "入库", "采购", "sales", "order", "orders", "inventory", "batch", "customer", "report",
    "revenue", "profit",
];

const DEFAULT_WRITE_KEYWORDS: &[&str] = &[
    "删除", "修改", "更新", "新增", "添加", "创建", "录入", "作废", "撤销", "提交", "设置", "删掉",
    "delete", "remove", "update", "create", "insert", "modify", "add", "cancel",
];

/// Fixed keyword tables used by the validator.
///
/// Entries are stored lowercased. ASCII keywords match whole tokens; others match as
/// substrings (CJK text carries no word boundaries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSets {
    pub vague: BTreeSet<String>,
    pub irrelevant: BTreeSet<String>,
    pub business: BTreeSet<String>,
    pub write: BTreeSet<String>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            vague: to_set(DEFAULT_VAGUE_WORDS),
            irrelevant: to_set(DEFAULT_IRRELEVANT_KEYWORDS),
            business: to_set(DEFAULT_BUSINESS_KEYWORDS),
            write: to_set(DEFAULT_WRITE_KEYWORDS),
        }
    }
}

fn to_set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

fn parse_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

impl KeywordSets {
    const ENV_VAGUE: &'static str = "DISCRIMINATOR_VAGUE_WORDS";
    const ENV_IRRELEVANT: &'static str = "DISCRIMINATOR_IRRELEVANT_KEYWORDS";
    const ENV_BUSINESS: &'static str = "DISCRIMINATOR_BUSINESS_KEYWORDS";
    const ENV_WRITE: &'static str = "DISCRIMINATOR_WRITE_KEYWORDS";

    /// Replaces any table whose comma-separated env var is set and non-empty.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |name: &str, default: BTreeSet<String>| {
            env::var(name)
                .ok()
                .map(|v| parse_list(&v))
                .filter(|set| !set.is_empty())
                .unwrap_or(default)
        };

        Self {
            vague: read(Self::ENV_VAGUE, defaults.vague),
            irrelevant: read(Self::ENV_IRRELEVANT, defaults.irrelevant),
            business: read(Self::ENV_BUSINESS, defaults.business),
            write: read(Self::ENV_WRITE, defaults.write),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Validator cutoffs and keyword tables.
pub struct ValidatorConfig {
    /// Minimum non-space characters after cleaning.
    pub min_input_chars: usize,
    /// Inputs of at most this many tokens made only of vague words are `VAGUE`.
    pub max_vague_tokens: usize,
    pub keywords: KeywordSets,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_input_chars: DEFAULT_MIN_INPUT_CHARS,
            max_vague_tokens: DEFAULT_MAX_VAGUE_TOKENS,
            keywords: KeywordSets::default(),
        }
    }
}

impl ValidatorConfig {
    const ENV_MIN_INPUT_CHARS: &'static str = "DISCRIMINATOR_MIN_INPUT_CHARS";
    const ENV_MAX_VAGUE_TOKENS: &'static str = "DISCRIMINATOR_MAX_VAGUE_TOKENS";

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let parse = |name: &str, default: usize| {
            env::var(name)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            min_input_chars: parse(Self::ENV_MIN_INPUT_CHARS, defaults.min_input_chars),
            max_vague_tokens: parse(Self::ENV_MAX_VAGUE_TOKENS, defaults.max_vague_tokens),
            keywords: KeywordSets::from_env(),
        }
    }
}
