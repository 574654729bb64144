use std::sync::Arc;
use std::time::{Duration, Instant};

use super::pruner::BatchPruner;
use super::types::PrunerConfig;
use crate::cache::JudgeCache;
use crate::judge::{BackendSet, DiscriminatorJudge, JudgeBackend, PromptTemplate, ScriptedBackend};
use crate::tuning::TuningConfig;
use crate::validation::{InputQuality, InputQualityValidator, ValidatorConfig};

const GOOD_INPUT: &str = "查看今天销售情况";

fn codes(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn pruner_with(backend: Arc<ScriptedBackend>, config: PrunerConfig) -> BatchPruner {
    let backends =
        BackendSet::initialize(Some(backend as Arc<dyn JudgeBackend>), None, false).await;
    let judge = DiscriminatorJudge::new(JudgeCache::new(), backends, PromptTemplate::default());
    BatchPruner::new(
        InputQualityValidator::new(ValidatorConfig::default()),
        Arc::new(judge),
        Arc::new(TuningConfig::default()),
        config,
    )
}

#[tokio::test]
async fn test_keeps_candidates_above_threshold_in_score_order() {
    let backend = Arc::new(
        ScriptedBackend::local()
            .respond("sales_overview", "0.9")
            .respond("sales_ranking", "0.6")
            .respond("inventory_query", "0.2"),
    );
    let pruner = pruner_with(backend, PrunerConfig::default()).await;

    let kept = pruner
        .prune(
            GOOD_INPUT,
            &codes(&["inventory_query", "sales_ranking", "sales_overview"]),
            false,
        )
        .await;

    assert_eq!(kept, codes(&["sales_overview", "sales_ranking"]));
}

#[tokio::test]
async fn test_floor_guarantee_when_everything_scores_zero() {
    let backend = Arc::new(ScriptedBackend::local().default_response("否"));
    let pruner = pruner_with(backend, PrunerConfig::default().with_min_keep(2)).await;

    let report = pruner
        .prune_detailed(GOOD_INPUT, &codes(&["a", "b", "c"]), false)
        .await;

    assert!(report.floor_applied);
    assert_eq!(report.kept, codes(&["a", "b"]));
    assert!(report.candidates.iter().all(|c| c.score == 0.0));
}

#[tokio::test]
async fn test_floor_never_exceeds_candidate_count() {
    let backend = Arc::new(ScriptedBackend::local());
    let pruner = pruner_with(backend, PrunerConfig::default().with_min_keep(5)).await;

    let kept = pruner.prune(GOOD_INPUT, &codes(&["a", "b"]), false).await;
    assert_eq!(kept.len(), 2);

    assert!(pruner.prune(GOOD_INPUT, &[], false).await.is_empty());
}

#[tokio::test]
async fn test_invalid_input_never_reaches_backend() {
    let backend = Arc::new(ScriptedBackend::local().default_response("是"));
    let pruner = pruner_with(backend.clone(), PrunerConfig::default()).await;

    let report = pruner.prune_detailed("", &codes(&["a", "b", "c"]), false).await;

    assert_eq!(report.quality(), InputQuality::Invalid);
    assert_eq!(report.kept, codes(&["a"]));
    assert!(report.floor_applied);
    assert!(report.candidates.iter().all(|c| c.score == 0.0 && !c.judged));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_rejected_tiers_score_zero() {
    let backend = Arc::new(ScriptedBackend::local().default_response("是"));
    let pruner = pruner_with(backend.clone(), PrunerConfig::default()).await;

    for input in ["好", "数据", "天气怎么样"] {
        let scores = pruner.score_all(input, &codes(&["a", "b"])).await;
        assert_eq!(scores.len(), 2);
        assert!(scores.values().all(|s| *s == 0.0), "{input}");
    }
    assert_eq!(backend.calls(), 0);

    let counts = pruner.tier_counts();
    assert_eq!(counts["TOO_SHORT"], 1);
    assert_eq!(counts["VAGUE"], 1);
    assert_eq!(counts["IRRELEVANT"], 1);
}

#[tokio::test]
async fn test_write_op_uses_safe_mode_threshold() {
    // 0.45 * 0.8 = 0.36: above safe mode (0.3), below the default threshold (0.5).
    let backend = Arc::new(
        ScriptedBackend::local()
            .respond("sales_overview", "0.45")
            .respond("sales_ranking", "0.1"),
    );
    let pruner = pruner_with(backend, PrunerConfig::default().with_min_keep(0)).await;
    let candidates = codes(&["sales_overview", "sales_ranking"]);

    let report = pruner
        .prune_detailed("删除批次MB001", &candidates, true)
        .await;

    assert_eq!(report.quality(), InputQuality::WriteOp);
    assert!((report.threshold - 0.3).abs() < 1e-6);
    assert_eq!(report.kept, codes(&["sales_overview"]));
    assert!((report.score_of("sales_overview").unwrap() - 0.36).abs() < 1e-5);
}

#[tokio::test]
async fn test_write_op_against_read_candidates_scores_zero() {
    let backend = Arc::new(ScriptedBackend::local().default_response("是"));
    let pruner = pruner_with(backend.clone(), PrunerConfig::default()).await;

    let report = pruner
        .prune_detailed("删除批次MB001", &codes(&["sales_overview", "sales_ranking"]), false)
        .await;

    assert!(report.candidates.iter().all(|c| c.score == 0.0));
    assert_eq!(report.kept.len(), 1);
    assert_eq!(backend.calls(), 0);

    // score_all still judges write inputs, discounted.
    let scores = pruner
        .score_all("删除批次MB001", &codes(&["sales_overview"]))
        .await;
    assert!((scores["sales_overview"] - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn test_ties_keep_input_order() {
    let backend = Arc::new(ScriptedBackend::local().default_response("是"));
    let pruner = pruner_with(backend, PrunerConfig::default()).await;

    let kept = pruner
        .prune(GOOD_INPUT, &codes(&["c", "a", "b"]), false)
        .await;
    assert_eq!(kept, codes(&["c", "a", "b"]));
}

#[tokio::test]
async fn test_failing_backend_degrades_to_floor() {
    let backend = Arc::new(ScriptedBackend::local().fail_all());
    let pruner = pruner_with(backend, PrunerConfig::default()).await;

    let report = pruner
        .prune_detailed(GOOD_INPUT, &codes(&["a", "b"]), false)
        .await;

    assert_eq!(report.kept, codes(&["a"]));
    assert!(report.floor_applied);
    assert!(report.candidates.iter().all(|c| c.error.is_some()));
}

#[tokio::test]
async fn test_one_failing_candidate_does_not_fail_batch() {
    let backend = Arc::new(
        ScriptedBackend::local()
            .default_response("是")
            .fail_on("broken"),
    );
    let pruner = pruner_with(backend, PrunerConfig::default()).await;

    let kept = pruner
        .prune(GOOD_INPUT, &codes(&["broken", "ok"]), false)
        .await;
    assert_eq!(kept, codes(&["ok"]));
}

#[tokio::test]
async fn test_stuck_candidate_is_cut_off_at_deadline() {
    let backend = Arc::new(
        ScriptedBackend::local()
            .default_response("是")
            .delay("stuck", Duration::from_secs(30)),
    );
    let timeout = Duration::from_millis(200);
    let pruner = pruner_with(backend, PrunerConfig::default().with_batch_timeout(timeout)).await;

    let candidates: Vec<String> = (0..20)
        .map(|i| format!("intent_{i}"))
        .chain(std::iter::once("stuck".to_string()))
        .collect();

    let started = Instant::now();
    let scores = pruner.score_all(GOOD_INPUT, &candidates).await;
    let elapsed = started.elapsed();

    assert!(elapsed < timeout + Duration::from_millis(500), "{elapsed:?}");
    assert_eq!(scores["stuck"], 0.0);
    assert_eq!(scores["intent_0"], 1.0);
    assert_eq!(scores.len(), 21);
}

#[tokio::test]
async fn test_sequential_mode_respects_deadline() {
    let backend = Arc::new(
        ScriptedBackend::local()
            .default_response("是")
            .delay("stuck", Duration::from_secs(30)),
    );
    let config = PrunerConfig::default()
        .with_batch_timeout(Duration::from_millis(200))
        .sequential();
    let pruner = pruner_with(backend.clone(), config).await;

    let started = Instant::now();
    let report = pruner
        .prune_detailed(GOOD_INPUT, &codes(&["a", "stuck", "b"]), false)
        .await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(report.timed_out, codes(&["stuck", "b"]));
    assert_eq!(report.kept, codes(&["a"]));
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_reset_metrics_clears_tier_counts() {
    let backend = Arc::new(ScriptedBackend::local());
    let pruner = pruner_with(backend, PrunerConfig::default()).await;

    pruner.prune(GOOD_INPUT, &codes(&["a"]), false).await;
    assert_eq!(pruner.tier_counts()["GOOD"], 1);

    pruner.reset_metrics();
    assert!(pruner.tier_counts().values().all(|c| *c == 0));
}

#[tokio::test]
async fn test_score_at_threshold_survives_tuning_round_trip() {
    let backend = Arc::new(
        ScriptedBackend::local()
            .respond("sales_overview", "0.5")
            .respond("sales_ranking", "0.45"),
    );
    let backends =
        BackendSet::initialize(Some(backend as Arc<dyn JudgeBackend>), None, false).await;
    let judge = DiscriminatorJudge::new(JudgeCache::new(), backends, PromptTemplate::default());
    let tuning = Arc::new(TuningConfig::default());
    let pruner = BatchPruner::new(
        InputQualityValidator::new(ValidatorConfig::default()),
        Arc::new(judge),
        Arc::clone(&tuning),
        PrunerConfig::default().with_min_keep(0),
    );

    for _ in 0..8 {
        tuning.step_prune_threshold(-1);
    }
    for _ in 0..8 {
        tuning.step_prune_threshold(1);
    }

    let kept = pruner
        .prune(GOOD_INPUT, &codes(&["sales_ranking", "sales_overview"]), false)
        .await;
    assert_eq!(kept, codes(&["sales_overview"]));
}
