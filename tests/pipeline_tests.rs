//! End-to-end pruning pipeline over scripted backends.

use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use discriminator::{
    AdjustmentDirection, Config, Discriminator, InputQuality, JudgeBackend, OutcomeRecord,
    ScriptedBackend, StaticIntentCatalog,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn codes(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn catalog() -> Arc<StaticIntentCatalog> {
    Arc::new(
        StaticIntentCatalog::new()
            .with("sales_overview", "查询销售概况")
            .with("sales_ranking", "查询销售排行")
            .with("batch_delete", "删除生产批次"),
    )
}

async fn build(
    config: Config,
    local: ScriptedBackend,
    remote: Option<ScriptedBackend>,
) -> anyhow::Result<Discriminator> {
    init_tracing();
    Ok(Discriminator::with_backends(
        config,
        Some(Arc::new(local) as Arc<dyn JudgeBackend>),
        remote.map(|r| Arc::new(r) as Arc<dyn JudgeBackend>),
        catalog(),
    )
    .await?)
}

#[tokio::test]
async fn test_query_keeps_matching_intent() -> anyhow::Result<()> {
    let local = ScriptedBackend::local()
        .respond("sales_overview", "是")
        .respond("sales_ranking", "否");
    let discriminator = build(Config::default(), local, None).await?;

    let kept = discriminator
        .prune(
            "查看今天销售情况",
            &codes(&["sales_ranking", "sales_overview"]),
            false,
        )
        .await;

    assert_eq!(kept, codes(&["sales_overview"]));
    Ok(())
}

#[tokio::test]
async fn test_write_operation_is_judged_with_safe_mode() -> anyhow::Result<()> {
    let local = ScriptedBackend::local()
        .respond("batch_delete", "0.5")
        .respond("sales_overview", "0.1");
    let discriminator = build(Config::default(), local, None).await?;

    let report = discriminator
        .prune_detailed(
            "删除批次MB001",
            &codes(&["sales_overview", "batch_delete"]),
            true,
        )
        .await;

    assert_eq!(report.quality(), InputQuality::WriteOp);
    // 0.5 * 0.8 = 0.4 clears the 0.3 safe-mode threshold but not the 0.5 default.
    assert_eq!(report.kept, codes(&["batch_delete"]));
    assert!(!report.floor_applied);
    Ok(())
}

#[tokio::test]
async fn test_remote_fallback_when_local_fails() -> anyhow::Result<()> {
    let mut config = Config::default();
    config.remote.enabled = true;
    let local = ScriptedBackend::local().fail_all();
    let remote = ScriptedBackend::remote().respond("sales_overview", "yes");
    let discriminator = build(config, local, Some(remote)).await?;

    let kept = discriminator
        .prune(
            "查看今天销售情况",
            &codes(&["sales_ranking", "sales_overview"]),
            false,
        )
        .await;
    assert_eq!(kept, codes(&["sales_overview"]));

    let snapshot = discriminator.metrics_snapshot().await;
    assert_eq!(snapshot.judge.fallbacks, 2);
    assert_eq!(snapshot.judge.remote_calls, 2);
    assert!(snapshot.remote_backend_available);
    Ok(())
}

#[tokio::test]
async fn test_clarification_inputs_never_reach_backend() -> anyhow::Result<()> {
    let local = ScriptedBackend::local().default_response("是");
    let discriminator = build(Config::default(), local, None).await?;
    let candidates = codes(&["a", "b", "c"]);

    for input in ["", "好", "数据", "天气怎么样"] {
        let report = discriminator.prune_detailed(input, &candidates, false).await;
        assert!(!report.validation.is_valid, "{input}");
        assert_eq!(report.kept, codes(&["a"]), "{input}");
    }

    let snapshot = discriminator.metrics_snapshot().await;
    assert_eq!(snapshot.judge.total_calls, 0);
    Ok(())
}

#[tokio::test]
async fn test_batch_returns_within_deadline() -> anyhow::Result<()> {
    let mut config = Config::default();
    config.batch_timeout = Duration::from_millis(150);
    let local = ScriptedBackend::local()
        .default_response("是")
        .delay("stuck", Duration::from_secs(60));
    let discriminator = build(config, local, None).await?;

    let mut candidates: Vec<String> = (0..50).map(|i| format!("intent_{i}")).collect();
    candidates.push("stuck".to_string());

    let started = Instant::now();
    let report = discriminator
        .prune_detailed("查看今天销售情况", &candidates, false)
        .await;

    assert!(started.elapsed() < Duration::from_millis(650));
    assert_eq!(report.timed_out, codes(&["stuck"]));
    assert_eq!(report.score_of("stuck"), Some(0.0));
    assert_eq!(report.kept.len(), 50);
    Ok(())
}

#[tokio::test]
async fn test_feedback_loop_lowers_threshold_then_settles() -> anyhow::Result<()> {
    let mut config = Config::default();
    config.tuning.auto_tune_window = 20;
    config.tuning.window_capacity = 20;
    let discriminator = build(config, ScriptedBackend::local(), None).await?;

    // 25% mis-prunes: two passes lower the threshold.
    for _ in 0..2 {
        for i in 0..20 {
            let mis = i < 5;
            discriminator.record_outcome(OutcomeRecord::new(
                "查看今天销售情况",
                "sales_overview",
                0.4,
                mis,
                mis,
            ));
        }
    }
    let lowered = discriminator.tuning().prune_threshold();
    assert!((lowered - 0.4).abs() < 1e-5);

    // 1 in 20 is exactly the target: inside the dead zone.
    let mut last = None;
    for i in 0..20 {
        last = discriminator.record_outcome(OutcomeRecord::new(
            "查看今天销售情况",
            "sales_overview",
            0.4,
            i == 0,
            i == 0,
        ));
    }
    let adjustment = last.expect("window boundary");
    assert_eq!(adjustment.direction, AdjustmentDirection::Unchanged);
    assert_eq!(discriminator.tuning().prune_threshold(), lowered);

    let map = discriminator.metrics_snapshot().await.to_map();
    assert_eq!(map["tuning"]["total_records"], 60);
    Ok(())
}
