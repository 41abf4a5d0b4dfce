use std::{env, sync::Arc};

use tdssolver::{
    answer::{AnswerGenerator, AnswerSettings},
    config,
    extract::ExtractedData,
    oracle::OpenAiCompletionClient,
};

#[tokio::test]
#[ignore = "Requires OPENAI_API_KEY and network access"]
async fn live_completion_roundtrip() {
    if env::var("OPENAI_API_KEY").map(|v| v.trim().is_empty()).unwrap_or(true) {
        eprintln!("OPENAI_API_KEY not set; skipping");
        return;
    }
    let config = config::init_config().expect("configuration");
    let client = OpenAiCompletionClient::from_config(config).expect("client");
    let generator = AnswerGenerator::new(Arc::new(client), AnswerSettings::from(config));

    let answer = generator
        .answer(
            "What is 6 multiplied by 7? Reply with the number only.",
            &ExtractedData::Absent,
        )
        .await
        .expect("live completion");
    assert_eq!(answer, answer.trim(), "answers are trimmed");
    assert!(answer.contains("42"), "unexpected answer: {answer}");
}
