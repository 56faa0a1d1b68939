//! End-to-end scoring against scripted model services

use dndscore_domain::{EntailmentJudgment, Passage, PassageId, PassageStatus, VerdictLabel};
use dndscore_llm::{MockEntailment, MockGenerator, RetryPolicy};
use dndscore_pipeline::{Evidence, Pipeline, ScoreRequest, ScoringConfig, Services};
use std::sync::Arc;
use std::time::{Duration, Instant};

const PARIS: &str = "Paris is the capital of France. It has the Eiffel Tower.";
const EVIDENCE: &str = "Paris, the capital of France, is home to the Eiffel Tower.";

fn config() -> ScoringConfig {
    ScoringConfig {
        retry: RetryPolicy {
            max_attempts: 2,
            backoff_base_ms: 1,
            max_backoff_ms: 2,
        },
        call_timeout_secs: 5,
        passage_deadline_secs: 30,
        ..Default::default()
    }
}

fn paris_generator() -> MockGenerator {
    let mut generator = MockGenerator::new("[]");
    generator.add_response(
        "Sentence: Paris is the capital of France.",
        r#"["Paris is the capital of France"]"#,
    );
    generator.add_response("Sentence: It has the Eiffel Tower.", r#"["It has the Eiffel Tower"]"#);
    generator.add_response(
        "Subclaim: Paris is the capital of France",
        "Paris is the capital of France",
    );
    generator.add_response("Subclaim: It has the Eiffel Tower", "Paris has the Eiffel Tower");
    generator
}

fn paris_oracle() -> MockEntailment {
    let mut oracle = MockEntailment::neutral();
    oracle.add_judgment(
        EVIDENCE,
        "Paris is the capital of France",
        EntailmentJudgment::entails(0.96),
    );
    oracle.add_judgment(EVIDENCE, "Paris has the Eiffel Tower", EntailmentJudgment::entails(0.93));
    oracle
}

fn pipeline(generator: MockGenerator, oracle: MockEntailment, config: ScoringConfig) -> Pipeline {
    Pipeline::new(Services::new(Arc::new(generator), Arc::new(oracle)), config).unwrap()
}

fn paris() -> Passage {
    Passage::new(PassageId::new("paris"), PARIS)
}

#[tokio::test]
async fn test_paris_scenario() {
    let generator = paris_generator();
    let oracle = paris_oracle();
    let p = pipeline(generator.clone(), oracle.clone(), config());

    let report = p.score(&paris(), &EVIDENCE.into()).await;

    assert_eq!(report.status, PassageStatus::Scored);
    assert!(report.is_clean());
    assert_eq!(report.claim_count, 2);
    assert_eq!(report.cluster_count, 2);
    assert_eq!(report.score, Some(1.0));

    let eiffel = report.cluster_of(1).unwrap();
    assert_eq!(eiffel.members[0].text, "Paris has the Eiffel Tower");
    assert_eq!(eiffel.members[0].contextual_text.as_deref(), Some("It has the Eiffel Tower"));
    assert_eq!(eiffel.members[0].sentence, "It has the Eiffel Tower.");
    assert_eq!(eiffel.verdict.label, VerdictLabel::Supported);
    assert!(report.clusters.iter().all(|c| c.informativeness.is_none()));

    // 2 decompositions + 2 rewrites; 2 dedup queries + 2 verifications
    assert_eq!(generator.call_count(), 4);
    assert_eq!(oracle.call_count(), 4);
    assert_eq!(p.metrics().report_count, 1);
}

#[tokio::test]
async fn test_bleached_claims_weigh_clusters_without_changing_score() {
    let mut oracle = paris_oracle();
    oracle.add_judgment(
        "It is a city",
        "Paris is the capital of France",
        EntailmentJudgment::entails(0.5),
    );
    let config = ScoringConfig {
        bleached_claims: vec!["It is a city".to_string()],
        ..config()
    };
    let p = pipeline(paris_generator(), oracle.clone(), config);

    let report = p.score(&paris(), &EVIDENCE.into()).await;

    assert_eq!(report.status, PassageStatus::Scored);
    assert_eq!(report.cluster_count, 2);
    assert_eq!(report.score, Some(1.0));

    let capital = report.clusters[0].informativeness.unwrap();
    assert!((capital - std::f64::consts::LN_2).abs() < 1e-9);
    // Unscripted pair answers neutral(0.9), leaving 0.1 for entailment
    let eiffel = report.clusters[1].informativeness.unwrap();
    assert!((eiffel + 0.1_f64.ln()).abs() < 1e-9);

    // One bleached-claim query per representative on top of the usual four
    assert_eq!(oracle.call_count(), 6);
    assert_eq!(oracle.calls_for("It is a city", "Paris has the Eiffel Tower"), 1);
}

#[tokio::test]
async fn test_equivalent_claims_share_a_verdict() {
    let mut generator = MockGenerator::new("[]");
    generator.add_response(
        "Sentence: Paris is the capital of France.",
        r#"["Paris is the capital of France"]"#,
    );
    generator.add_response(
        "Sentence: The capital of France is Paris.",
        r#"["The capital of France is Paris"]"#,
    );
    generator.add_response(
        "Subclaim: Paris is the capital of France",
        "Paris is the capital of France",
    );
    generator.add_response(
        "Subclaim: The capital of France is Paris",
        "The capital of France is Paris",
    );

    let mut oracle = MockEntailment::neutral();
    oracle.add_equivalence("Paris is the capital of France", "The capital of France is Paris");
    oracle.add_judgment(
        EVIDENCE,
        "Paris is the capital of France",
        EntailmentJudgment::entails(0.96),
    );

    let p = pipeline(generator, oracle.clone(), config());
    let passage = Passage::new(
        PassageId::new("dup"),
        "Paris is the capital of France. The capital of France is Paris.",
    );
    let report = p.score(&passage, &EVIDENCE.into()).await;

    assert_eq!(report.claim_count, 2);
    assert_eq!(report.cluster_count, 1);
    assert_eq!(report.clusters[0].size, 2);
    assert_eq!(report.clusters[0].representative_ordinal, 0);
    assert_eq!(report.verdict_for(1).unwrap().label, VerdictLabel::Supported);
    assert_eq!(report.score, Some(1.0));
    assert_eq!(report.mention_weighted_score, Some(1.0));
    // Only the representative is verified
    assert_eq!(oracle.calls_for(EVIDENCE, "The capital of France is Paris"), 0);
}

#[tokio::test]
async fn test_decomposition_failure_is_undecomposed() {
    let mut generator = MockGenerator::default();
    generator.add_error("Sentence:");
    let oracle = MockEntailment::entails_everything();

    let p = pipeline(generator, oracle.clone(), config());
    let report = p.score(&paris(), &EVIDENCE.into()).await;

    assert!(matches!(report.status, PassageStatus::Undecomposed { .. }));
    assert!(report.score.is_none());
    assert!(report.clusters.is_empty());
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn test_empty_passage_is_undecomposed() {
    let p = pipeline(paris_generator(), paris_oracle(), config());
    let report = p.score_text("   ", &Evidence::empty()).await;

    match report.status {
        PassageStatus::Undecomposed { reason } => assert!(reason.contains("empty")),
        other => panic!("unexpected status {:?}", other),
    }
}

#[tokio::test]
async fn test_rewrite_failure_keeps_original_text() {
    let mut generator = MockGenerator::new("[]");
    generator.add_error("Subclaim: It has the Eiffel Tower");
    generator.add_response(
        "Sentence: Paris is the capital of France.",
        r#"["Paris is the capital of France"]"#,
    );
    generator.add_response("Sentence: It has the Eiffel Tower.", r#"["It has the Eiffel Tower"]"#);
    generator.add_response(
        "Subclaim: Paris is the capital of France",
        "Paris is the capital of France",
    );

    let p = pipeline(generator, paris_oracle(), config());
    let report = p.score(&paris(), &EVIDENCE.into()).await;

    assert_eq!(report.status, PassageStatus::Scored);
    let member = &report.cluster_of(1).unwrap().members[0];
    assert_eq!(member.text, "It has the Eiffel Tower");
    assert!(member.rewrite_degraded);

    let degradation = report.degradation("rewrite_degraded").unwrap();
    assert_eq!(
        degradation,
        &dndscore_domain::Degradation::RewriteDegraded { ordinals: vec![1] }
    );
}

#[tokio::test]
async fn test_entailment_outage_completes_with_flags() {
    let p = pipeline(paris_generator(), MockEntailment::unavailable(), config());
    let report = p.score(&paris(), &EVIDENCE.into()).await;

    assert_eq!(report.status, PassageStatus::Scored);
    assert_eq!(report.cluster_count, 2);
    assert!(report.score.is_none());
    assert_eq!(report.verdicts.unknown, 2);
    assert!(report.degradation("entailment_service_unavailable").is_some());
    assert!(report.degradation("verification_unknown").is_some());
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let mut generator = MockGenerator::new("[]");
    generator.add_transient_error(
        "Sentence: Paris is the capital of France.",
        1,
        r#"["Paris is the capital of France"]"#,
    );
    generator.add_response(
        "Subclaim: Paris is the capital of France",
        "Paris is the capital of France",
    );
    let mut oracle = MockEntailment::neutral();
    oracle.add_transient_failure(
        EVIDENCE,
        "Paris is the capital of France",
        1,
        EntailmentJudgment::entails(0.9),
    );

    let p = pipeline(generator, oracle, config());
    let passage = Passage::new(PassageId::new("p"), "Paris is the capital of France.");
    let report = p.score(&passage, &EVIDENCE.into()).await;

    assert!(report.is_clean());
    assert_eq!(report.score, Some(1.0));
}

#[tokio::test]
async fn test_claim_cap_skips_dedup() {
    let oracle = paris_oracle();
    let config = ScoringConfig {
        max_claims_per_passage: 1,
        ..config()
    };
    let p = pipeline(paris_generator(), oracle.clone(), config);

    let report = p.score(&paris(), &EVIDENCE.into()).await;

    assert_eq!(report.cluster_count, 2);
    assert!(report.degradation("claim_cap_exceeded").is_some());
    // Verification only
    assert_eq!(oracle.call_count(), 2);
    assert_eq!(report.score, Some(1.0));
}

#[tokio::test]
async fn test_deadline_exceeded() {
    let generator = paris_generator().with_latency(Duration::from_secs(3));
    let config = ScoringConfig {
        passage_deadline_secs: 1,
        ..config()
    };
    let p = pipeline(generator, paris_oracle(), config);

    let started = Instant::now();
    let report = p.score(&paris(), &EVIDENCE.into()).await;

    assert_eq!(report.status, PassageStatus::DeadlineExceeded { deadline_ms: 1000 });
    assert!(report.score.is_none());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_shutdown_cancels_in_flight_passages() {
    let generator = paris_generator().with_latency(Duration::from_secs(10));
    let p = Arc::new(pipeline(generator, paris_oracle(), config()));

    let scoring = {
        let p = Arc::clone(&p);
        tokio::spawn(async move { p.score(&paris(), &EVIDENCE.into()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    p.shutdown().await;
    let report = scoring.await.unwrap();

    assert_eq!(report.status, PassageStatus::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(2));

    // Later passages are cancelled without any model calls
    let late = p.score(&paris(), &EVIDENCE.into()).await;
    assert_eq!(late.status, PassageStatus::Cancelled);
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let generator = paris_generator();
    let p = Arc::new(pipeline(generator, paris_oracle(), config()));

    let requests = vec![
        ScoreRequest::new(paris(), EVIDENCE),
        ScoreRequest::new(Passage::new(PassageId::new("blank"), ""), EVIDENCE),
        ScoreRequest::new(
            Passage::new(PassageId::new("no-evidence"), PARIS),
            Evidence::empty(),
        ),
    ];
    let reports = p.score_batch(requests).await;

    let ids: Vec<_> = reports.iter().map(|r| r.passage_id.as_str()).collect();
    assert_eq!(ids, vec!["paris", "blank", "no-evidence"]);
    assert_eq!(reports[0].score, Some(1.0));
    assert!(matches!(reports[1].status, PassageStatus::Undecomposed { .. }));
    assert_eq!(reports[2].score, Some(0.0));

    let metrics = p.metrics();
    assert_eq!(metrics.report_count, 3);
    assert_eq!(metrics.batch.undecomposed, 1);
    assert_eq!(metrics.mean_score(), Some(0.5));
}

#[tokio::test]
async fn test_free_score_function() {
    let services = Services::new(Arc::new(paris_generator()), Arc::new(paris_oracle()));
    let report = dndscore_pipeline::score(&services, &paris(), &EVIDENCE.into(), &config())
        .await
        .unwrap();
    assert_eq!(report.score, Some(1.0));

    let bad = ScoringConfig {
        concurrency: 0,
        ..config()
    };
    assert!(dndscore_pipeline::score(&services, &paris(), &EVIDENCE.into(), &bad)
        .await
        .is_err());
}
