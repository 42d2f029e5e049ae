use std::sync::Arc;
use std::time::Duration;

use care_core::model::{ChatTranscript, ERROR_REPLY, FALLBACK_REPLY, Speaker, styled_prompt};
use services::api::ScriptedAssistant;
use services::{CancelToken, ChatError, ChatOutcome, ChatService};

const TICK: Duration = Duration::from_millis(30);

fn chat(assistant: &ScriptedAssistant) -> ChatService {
    ChatService::new(Arc::new(assistant.clone()), TICK)
}

#[tokio::test(start_paused = true)]
async fn reply_is_revealed_one_character_per_tick() {
    let assistant = ScriptedAssistant::new();
    assistant.push_reply(Some("Hi *there*"));
    let chat = chat(&assistant);
    let mut transcript = ChatTranscript::new();
    let mut seen = Vec::new();

    let started = tokio::time::Instant::now();
    let outcome = chat
        .send(&mut transcript, "what is pcod?", &CancelToken::new(), |t| {
            seen.push(t.last().map(|m| m.text().to_string()).unwrap_or_default());
        })
        .await
        .expect("send");

    assert_eq!(outcome, ChatOutcome::Completed);
    let elapsed = started.elapsed();
    assert!(elapsed >= TICK * 8 && elapsed < TICK * 9, "took {elapsed:?}");
    assert_eq!(assistant.prompts(), vec![styled_prompt("what is pcod?")]);

    let messages = transcript.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].speaker(), Speaker::User);
    assert_eq!(messages[1].text(), "what is pcod?");
    assert_eq!(messages[2].speaker(), Speaker::Assistant);
    assert_eq!(messages[2].text(), "Hi there");

    assert_eq!(seen.first().map(String::as_str), Some("what is pcod?"));
    assert_eq!(seen[1], "");
    assert_eq!(seen[2], "H");
    assert_eq!(seen.last().map(String::as_str), Some("Hi there"));
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_reveal_and_is_idempotent() {
    let assistant = ScriptedAssistant::new();
    assistant.push_reply(Some("abcdef"));
    let chat = chat(&assistant);
    let mut transcript = ChatTranscript::new();
    let token = CancelToken::new();
    let canceller = token.clone();

    let (outcome, ()) = tokio::join!(
        chat.send(&mut transcript, "hello", &token, |_| {}),
        async move {
            tokio::time::sleep(Duration::from_millis(75)).await;
            canceller.cancel();
            canceller.cancel();
        }
    );

    assert_eq!(outcome.expect("cancel is not an error"), ChatOutcome::Cancelled);
    assert_eq!(transcript.last().map(|m| m.text()), Some("ab"));

    tokio::time::sleep(Duration::from_secs(1)).await;
    token.cancel();
    assert_eq!(transcript.last().map(|m| m.text()), Some("ab"));
}

#[tokio::test(start_paused = true)]
async fn cancel_while_waiting_drops_the_request() {
    let assistant = ScriptedAssistant::new().with_latency(Duration::from_secs(5));
    assistant.push_reply(Some("too late"));
    let chat = chat(&assistant);
    let mut transcript = ChatTranscript::new();
    let token = CancelToken::new();
    let canceller = token.clone();

    let (outcome, ()) = tokio::join!(
        chat.send(&mut transcript, "hello", &token, |_| {}),
        async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        }
    );

    assert_eq!(outcome.expect("cancelled"), ChatOutcome::Cancelled);
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.last().map(|m| m.speaker()), Some(Speaker::User));
}

#[tokio::test(start_paused = true)]
async fn missing_reply_falls_back() {
    let assistant = ScriptedAssistant::new();
    assistant.push_reply(None);
    let chat = chat(&assistant);
    let mut transcript = ChatTranscript::new();

    chat.send(&mut transcript, "hello", &CancelToken::new(), |_| {})
        .await
        .expect("send");
    assert_eq!(transcript.last().map(|m| m.text()), Some(FALLBACK_REPLY));
}

#[tokio::test]
async fn transport_error_appends_error_bubble() {
    let assistant = ScriptedAssistant::new();
    assistant.set_failing(true);
    let chat = chat(&assistant);
    let mut transcript = ChatTranscript::new();

    let err = chat
        .send(&mut transcript, "hello", &CancelToken::new(), |_| {})
        .await
        .expect_err("assistant is down");
    assert!(matches!(err, ChatError::Api(_)));
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.last().map(|m| m.text()), Some(ERROR_REPLY));
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let assistant = ScriptedAssistant::new();
    let chat = chat(&assistant);
    let mut transcript = ChatTranscript::new();

    let outcome = chat
        .send(&mut transcript, "   ", &CancelToken::new(), |_| {})
        .await
        .expect("send");
    assert_eq!(outcome, ChatOutcome::Ignored);
    assert_eq!(transcript.len(), 1);
    assert!(assistant.prompts().is_empty());
}
