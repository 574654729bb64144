use std::sync::Arc;
use std::time::Duration;

use super::backend::{BackendSet, JudgeBackend};
use super::discriminator::DiscriminatorJudge;
use super::metadata::{IntentMetadataSource, StaticIntentCatalog};
use super::mock::ScriptedBackend;
use super::prompt::{PromptMode, PromptTemplate};
use super::types::{BackendKind, Judgment};
use super::verdict::parse_verdict;
use crate::cache::JudgeCache;

const INPUT: &str = "查看今天销售情况";

async fn judge_with(
    local: Option<Arc<ScriptedBackend>>,
    remote: Option<Arc<ScriptedBackend>>,
    cache: JudgeCache,
) -> DiscriminatorJudge {
    let fallback = remote.is_some();
    let backends = BackendSet::initialize(
        local.map(|b| b as Arc<dyn JudgeBackend>),
        remote.map(|b| b as Arc<dyn JudgeBackend>),
        fallback,
    )
    .await;
    DiscriminatorJudge::new(cache, backends, PromptTemplate::default())
}

fn same_except_cache_fields(a: &Judgment, b: &Judgment) -> bool {
    a.intent_code == b.intent_code
        && a.is_match == b.is_match
        && a.score == b.score
        && a.raw_output == b.raw_output
        && a.timestamp == b.timestamp
        && a.backend == b.backend
        && a.error == b.error
}

#[test]
fn test_parse_verdict_markers() {
    assert!(parse_verdict("是").is_match);
    assert!(parse_verdict("YES").is_match);
    assert!(parse_verdict("Yes, this is a match.").is_match);
    assert!(!parse_verdict("否").is_match);
    assert!(!parse_verdict("no").is_match);
    assert!(!parse_verdict("不是").is_match);
    assert!(!parse_verdict("不是").ambiguous);
    assert!(!parse_verdict("不匹配").ambiguous);
}

#[test]
fn test_parse_verdict_contradictory_is_no_match() {
    for output in ["是，不是", "yes no", "匹配 否", "Yes. Actually no."] {
        let verdict = parse_verdict(output);
        assert!(!verdict.is_match, "{output}");
        assert_eq!(verdict.score, 0.0);
        assert!(verdict.ambiguous, "{output}");
    }
}

#[test]
fn test_parse_verdict_neither_marker_is_no_match() {
    let verdict = parse_verdict("I cannot tell");
    assert!(!verdict.is_match);
    assert!(verdict.ambiguous);

    assert!(parse_verdict("").ambiguous);
}

#[test]
fn test_parse_verdict_probability() {
    let verdict = parse_verdict(" 0.8731 ");
    assert!(verdict.is_match);
    assert!((verdict.score - 0.8731).abs() < 1e-6);

    let verdict = parse_verdict("0.2");
    assert!(!verdict.is_match);
    assert!((verdict.score - 0.2).abs() < 1e-6);

    // Out-of-range numbers carry no marker, so they are ambiguous.
    let verdict = parse_verdict("1.7");
    assert!(!verdict.is_match);
    assert!(verdict.ambiguous);
}

#[test]
fn test_prompt_render_substitutes_placeholders() {
    let template = PromptTemplate::for_mode(PromptMode::ZeroShot);
    let prompt = template.render(INPUT, "sales_overview", "查询销售概况");

    assert!(prompt.contains(INPUT));
    assert!(prompt.contains("sales_overview"));
    assert!(prompt.contains("查询销售概况"));
    assert!(!prompt.contains("{input}"));
    assert!(!prompt.contains("{intent_code}"));
    assert!(!prompt.contains("{intent_description}"));
}

#[test]
fn test_prompt_render_leaves_braces_in_values_alone() {
    let template = PromptTemplate::custom("{intent_description} | {intent_code} | {input} | {other}")
        .unwrap();
    let prompt = template.render("看{intent_code}", "x{input}", "含有{input}和{intent_code}");

    assert_eq!(
        prompt,
        "含有{input}和{intent_code} | x{input} | 看{intent_code} | {other}"
    );
}

#[test]
fn test_few_shot_template_differs() {
    let zero = PromptTemplate::for_mode(PromptMode::ZeroShot);
    let few = PromptTemplate::for_mode(PromptMode::FewShot);
    assert_ne!(zero, few);
    assert!(few.render(INPUT, "x", "y").contains("示例"));
}

#[test]
fn test_custom_template_requires_input_placeholder() {
    assert!(PromptTemplate::custom("intent {intent_code}").is_err());

    let template = PromptTemplate::custom("[{intent_code}] {input}").unwrap();
    assert_eq!(template.render("hi", "greet", "d"), "[greet] hi");
}

#[test]
fn test_prompt_mode_from_str() {
    assert_eq!("zero-shot".parse::<PromptMode>().unwrap(), PromptMode::ZeroShot);
    assert_eq!("FEW_SHOT".parse::<PromptMode>().unwrap(), PromptMode::FewShot);
    assert!("three-shot".parse::<PromptMode>().is_err());
}

#[test]
fn test_missing_description_falls_back_to_code() {
    let catalog = StaticIntentCatalog::new()
        .with("sales_overview", "查询销售概况")
        .with("blank", "  ");

    assert_eq!(catalog.describe_or_code("sales_overview"), "查询销售概况");
    assert_eq!(catalog.describe_or_code("sales_ranking"), "sales_ranking");
    assert_eq!(catalog.describe_or_code("blank"), "blank");
}

#[tokio::test]
async fn test_backend_chain_order() {
    let local = Arc::new(ScriptedBackend::local());
    let remote = Arc::new(ScriptedBackend::remote());

    let set = BackendSet::initialize(
        Some(local.clone() as Arc<dyn JudgeBackend>),
        Some(remote.clone() as Arc<dyn JudgeBackend>),
        true,
    )
    .await;
    let kinds: Vec<_> = set.chain().iter().map(|b| b.kind()).collect();
    assert_eq!(kinds, vec![BackendKind::Local, BackendKind::Remote]);

    let set = BackendSet::initialize(
        Some(local as Arc<dyn JudgeBackend>),
        Some(remote as Arc<dyn JudgeBackend>),
        false,
    )
    .await;
    let kinds: Vec<_> = set.chain().iter().map(|b| b.kind()).collect();
    assert_eq!(kinds, vec![BackendKind::Local]);
}

#[tokio::test]
async fn test_unavailable_local_is_skipped() {
    let local = Arc::new(ScriptedBackend::local().unavailable());
    let remote = Arc::new(ScriptedBackend::remote());

    let set = BackendSet::initialize(
        Some(local as Arc<dyn JudgeBackend>),
        Some(remote as Arc<dyn JudgeBackend>),
        true,
    )
    .await;
    assert!(!set.local_available());
    assert!(set.remote_available());
    let kinds: Vec<_> = set.chain().iter().map(|b| b.kind()).collect();
    assert_eq!(kinds, vec![BackendKind::Remote]);
}

#[tokio::test]
async fn test_judge_match_and_no_match() {
    let local = Arc::new(
        ScriptedBackend::local()
            .respond("sales_overview", "是")
            .respond("sales_ranking", "否"),
    );
    let judge = judge_with(Some(local), None, JudgeCache::new()).await;

    let yes = judge.judge(INPUT, "sales_overview", "查询销售概况").await;
    assert!(yes.is_match);
    assert_eq!(yes.score, 1.0);
    assert_eq!(yes.backend, Some(BackendKind::Local));
    assert!(!yes.cached);

    let no = judge.judge(INPUT, "sales_ranking", "销售排行").await;
    assert!(!no.is_match);
    assert_eq!(no.score, 0.0);
    assert!(no.is_successful());
}

#[tokio::test]
async fn test_second_call_is_served_from_cache() {
    let local = Arc::new(ScriptedBackend::local().respond("sales_overview", "是"));
    let judge = judge_with(Some(local.clone()), None, JudgeCache::new()).await;

    let first = judge.judge(INPUT, "sales_overview", "d").await;
    let second = judge.judge(INPUT, "sales_overview", "d").await;

    assert_eq!(local.calls(), 1);
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.latency, Duration::ZERO);
    assert!(same_except_cache_fields(&first, &second));

    let metrics = judge.metrics();
    assert_eq!(metrics.total_calls, 2);
    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.local_calls, 1);
}

#[tokio::test]
async fn test_cache_expiry_reinvokes_backend() {
    let local = Arc::new(ScriptedBackend::local().respond("sales_overview", "是"));
    let cache = JudgeCache::with_config(100, Duration::from_millis(50));
    let judge = judge_with(Some(local.clone()), None, cache).await;

    judge.judge(INPUT, "sales_overview", "d").await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    let again = judge.judge(INPUT, "sales_overview", "d").await;

    assert_eq!(local.calls(), 2);
    assert!(!again.cached);
}

#[tokio::test]
async fn test_fallback_to_remote_on_local_failure() {
    let local = Arc::new(ScriptedBackend::local().fail_all());
    let remote = Arc::new(ScriptedBackend::remote().respond("sales_overview", "yes"));
    let judge = judge_with(Some(local.clone()), Some(remote.clone()), JudgeCache::new()).await;

    let judgment = judge.judge(INPUT, "sales_overview", "d").await;

    assert!(judgment.is_match);
    assert_eq!(judgment.backend, Some(BackendKind::Remote));
    assert_eq!(local.calls(), 1);
    assert_eq!(remote.calls(), 1);

    let metrics = judge.metrics();
    assert_eq!(metrics.fallbacks, 1);
    assert_eq!(metrics.remote_calls, 1);
    assert_eq!(metrics.errors, 0);
}

#[tokio::test]
async fn test_all_backends_failing_yields_uncached_error() {
    let local = Arc::new(ScriptedBackend::local().fail_all());
    let judge = judge_with(Some(local.clone()), None, JudgeCache::new()).await;

    let first = judge.judge(INPUT, "sales_overview", "d").await;
    assert!(!first.is_successful());
    assert!(!first.is_match);
    assert_eq!(first.score, 0.0);
    assert!(first.error.as_deref().unwrap().contains("scripted failure"));

    judge.judge(INPUT, "sales_overview", "d").await;
    assert_eq!(local.calls(), 2, "error judgments must not be cached");
    assert_eq!(judge.metrics().errors, 2);
}

#[tokio::test]
async fn test_no_backend_available() {
    let judge = DiscriminatorJudge::new(
        JudgeCache::new(),
        BackendSet::empty(),
        PromptTemplate::default(),
    );

    assert!(!judge.any_backend_available().await);
    let judgment = judge.judge(INPUT, "sales_overview", "d").await;
    assert!(!judgment.is_successful());
    assert_eq!(judgment.error.as_deref(), Some("no judge backend available"));
    assert!(judge.cache().is_empty());
}

#[tokio::test]
async fn test_ambiguous_output_is_cached_no_match() {
    let local = Arc::new(ScriptedBackend::local().respond("sales_overview", "是，也不是"));
    let judge = judge_with(Some(local), None, JudgeCache::new()).await;

    let judgment = judge.judge(INPUT, "sales_overview", "d").await;
    assert!(judgment.is_successful());
    assert!(!judgment.is_match);
    assert_eq!(judge.metrics().ambiguous_outputs, 1);

    assert!(judge.judge(INPUT, "sales_overview", "d").await.cached);
}

#[tokio::test]
async fn test_judge_intent_uses_metadata() {
    let local = Arc::new(ScriptedBackend::local().respond("sales_overview", "0.75"));
    let catalog = StaticIntentCatalog::new().with("sales_overview", "查询销售概况");
    let judge = judge_with(Some(local), None, JudgeCache::new())
        .await
        .with_metadata(Arc::new(catalog));

    let judgment = judge.judge_intent(INPUT, "sales_overview").await;
    assert!(judgment.is_match);
    assert!((judgment.score - 0.75).abs() < 1e-6);
}

#[tokio::test]
async fn test_reset_metrics() {
    let local = Arc::new(ScriptedBackend::local());
    let judge = judge_with(Some(local), None, JudgeCache::new()).await;

    judge.judge(INPUT, "a", "d").await;
    judge.judge(INPUT, "a", "d").await;
    assert_eq!(judge.metrics().total_calls, 2);

    judge.reset_metrics();
    let metrics = judge.metrics();
    assert_eq!(metrics.total_calls, 0);
    assert_eq!(metrics.cache_hits, 0);
    assert_eq!(metrics.cache_hit_rate(), 0.0);
}
