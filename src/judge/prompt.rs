//! Judgment prompt rendering by plain placeholder substitution.

use super::error::JudgeError;

pub const PLACEHOLDER_INPUT: &str = "{input}";
pub const PLACEHOLDER_INTENT_CODE: &str = "{intent_code}";
pub const PLACEHOLDER_INTENT_DESCRIPTION: &str = "{intent_description}";

const ZERO_SHOT_TEMPLATE: &str = "判断用户输入是否属于给定意图。\n\
意图编码: {intent_code}\n\
意图说明: {intent_description}\n\
用户输入: {input}\n\
只回答「是」或「否」。";

const FEW_SHOT_TEMPLATE: &str = "判断用户输入是否属于给定意图。只回答「是」或「否」。\n\
\n\
示例1\n\
意图说明: 查询销售概况\n\
用户输入: 今天卖了多少钱\n\
回答: 是\n\
\n\
示例2\n\
意图说明: 查询销售概况\n\
用户输入: 删除批次MB001\n\
回答: 否\n\
\n\
示例3\n\
意图说明: 查询库存\n\
用户输入: 仓库里还有多少件A产品\n\
回答: 是\n\
\n\
现在判断\n\
意图编码: {intent_code}\n\
意图说明: {intent_description}\n\
用户输入: {input}\n\
回答:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    #[default]
    ZeroShot,
    FewShot,
}

impl std::str::FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "zeroshot" => Ok(Self::ZeroShot),
            "fewshot" => Ok(Self::FewShot),
            _ => Err(format!("Unknown prompt mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn for_mode(mode: PromptMode) -> Self {
        let template = match mode {
            PromptMode::ZeroShot => ZERO_SHOT_TEMPLATE,
            PromptMode::FewShot => FEW_SHOT_TEMPLATE,
        };
        Self {
            template: template.to_string(),
        }
    }

    /// Accepts a custom template; it must reference `{input}`.
    pub fn custom(template: impl Into<String>) -> Result<Self, JudgeError> {
        let template = template.into();
        if !template.contains(PLACEHOLDER_INPUT) {
            return Err(JudgeError::InvalidConfig {
                reason: format!("prompt template must contain {PLACEHOLDER_INPUT}"),
            });
        }
        Ok(Self { template })
    }

    /// Substitutes placeholders in one left-to-right pass over the template. Substituted
    /// values are copied verbatim, so braces inside them are never expanded.
    pub fn render(&self, input: &str, intent_code: &str, intent_description: &str) -> String {
        let substitutions = [
            (PLACEHOLDER_INPUT, input),
            (PLACEHOLDER_INTENT_CODE, intent_code),
            (PLACEHOLDER_INTENT_DESCRIPTION, intent_description),
        ];

        let mut out = String::with_capacity(
            self.template.len() + input.len() + intent_code.len() + intent_description.len(),
        );
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            match substitutions
                .iter()
                .find(|(placeholder, _)| tail.starts_with(placeholder))
            {
                Some((placeholder, value)) => {
                    out.push_str(value);
                    rest = &tail[placeholder.len()..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::for_mode(PromptMode::default())
    }
}
