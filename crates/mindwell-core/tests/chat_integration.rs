//! Chat assistant over a mocked completion endpoint.

use std::time::Duration;

use mindwell_core::chat::{Conversation, RetryingClient, APOLOGY, SYSTEM_INSTRUCTION};
use mindwell_core::{CompletionClient, CompletionError, GeminiClient, RetryPolicy};
use mockito::Matcher;

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(5))
}

#[tokio::test]
async fn two_failures_then_success_returns_reply() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", Matcher::Any)
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(2)
        .create_async()
        .await;
    let ok = server
        .mock("POST", Matcher::Any)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"Let's breathe together."}]}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let client = RetryingClient::new(GeminiClient::new(server.url(), "m", "k"), fast_policy());
    let mut convo = Conversation::new();
    let reply = convo.send(&client, "I feel anxious").await.unwrap();

    assert_eq!(reply.text, "Let's breathe together.");
    assert!(reply.error.is_none());
    assert_eq!(convo.turns().len(), 3);
    failing.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn persistent_failure_yields_apology_after_three_attempts() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", Matcher::Any)
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let client = RetryingClient::new(GeminiClient::new(server.url(), "m", "k"), fast_policy());
    let direct = client
        .complete(SYSTEM_INSTRUCTION, Conversation::new().turns())
        .await
        .unwrap_err();
    assert!(matches!(direct, CompletionError::Exhausted { attempts: 3, .. }));
    failing.assert_async().await;

    let mut convo = Conversation::new();
    let reply = convo.send(&client, "hello").await.unwrap();
    assert_eq!(reply.text, APOLOGY);
    assert!(!convo.is_pending());
}
