//! Decomposer and Decontextualizer working together

use dndscore_domain::Passage;
use dndscore_extractor::{Decomposer, Decontextualizer, ExtractorConfig};
use dndscore_llm::{MockGenerator, RetryPolicy, WorkerPool};
use std::sync::Arc;
use std::time::Duration;

fn pool() -> WorkerPool {
    WorkerPool::new(
        4,
        RetryPolicy {
            max_attempts: 2,
            backoff_base_ms: 1,
            max_backoff_ms: 2,
        },
        Duration::from_secs(1),
    )
}

#[tokio::test]
async fn test_decompose_then_decontextualize_paris() {
    let mut generator = MockGenerator::new("[]");
    generator.add_response(
        "Sentence: Paris is the capital of France.",
        r#"["Paris is the capital of France"]"#,
    );
    generator.add_response(
        "Sentence: It has the Eiffel Tower.",
        "```json\n[\"It has the Eiffel Tower\"]\n```",
    );
    generator.add_response(
        "Subclaim: Paris is the capital of France",
        "Paris is the capital of France",
    );
    generator.add_response(
        "Subclaim: It has the Eiffel Tower",
        "Decontextualized claim: Paris has the Eiffel Tower",
    );
    let generator = Arc::new(generator);

    let decomposer = Decomposer::new(generator.clone(), pool(), ExtractorConfig::default());
    let decontextualizer = Decontextualizer::new(generator.clone(), pool(), ExtractorConfig::default());

    let passage = Passage::new(
        "paris".into(),
        "Paris is the capital of France. It has the Eiffel Tower.",
    );

    let claims = decomposer.decompose(&passage).await.unwrap();
    assert_eq!(claims.len(), 2);

    let claims = decontextualizer.decontextualize_all(claims, &passage).await;
    assert_eq!(claims[0].text(), "Paris is the capital of France");
    assert_eq!(claims[1].text(), "Paris has the Eiffel Tower");
    assert_eq!(claims[1].contextual_text(), Some("It has the Eiffel Tower"));
    assert!(claims.iter().all(|c| !c.is_rewrite_degraded()));

    // Two decompositions plus two rewrites
    assert_eq!(generator.call_count(), 4);
}

#[tokio::test]
async fn test_generation_outage_fails_decomposition() {
    let mut generator = MockGenerator::default();
    generator.add_error("Sentence:");

    let decomposer = Decomposer::new(Arc::new(generator), pool(), ExtractorConfig::default());
    let passage = Passage::with_generated_id("Water boils at 100 degrees Celsius.");

    let error = decomposer.decompose(&passage).await.unwrap_err();
    assert!(error.to_string().contains("sentence 0"));
}
