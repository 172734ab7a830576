//! Integration tests for the session dialogue manager.
//!
//! Drives the full state machine (greeting, name capture, context prompts,
//! escalation, retention) through the MockOracle and the in-memory store,
//! without external dependencies.

use std::sync::Arc;

use incubation_concierge::adapters::ai::MockOracle;
use incubation_concierge::adapters::memory::InMemoryConversationStore;
use incubation_concierge::application::{DialogueError, DialogueManager, SupportContact};
use incubation_concierge::domain::dialogue::{SessionState, RETENTION_WINDOW};
use incubation_concierge::domain::foundation::SessionId;
use incubation_concierge::ports::{ConversationStore, OracleError};

const GREETING_PREFIXES: [&str; 4] = ["Good morning", "Good afternoon", "Good evening", "Hello"];

fn manager(oracle: MockOracle, store: InMemoryConversationStore) -> DialogueManager {
    DialogueManager::new(
        Arc::new(oracle),
        Arc::new(store),
        SupportContact {
            email: "support@example.org".to_string(),
            phone: "+91 11111 22222".to_string(),
        },
    )
}

fn session(token: &str) -> SessionId {
    SessionId::new(token).unwrap()
}

// ─── Greeting handling ──────────────────────────────────────────────────

#[tokio::test]
async fn greeting_short_circuits_the_oracle() {
    let oracle = MockOracle::new();
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle.clone(), store.clone());
    let s = session("s-greet");

    let reply = manager.handle_question("Hello", &s).await.unwrap();

    assert!(GREETING_PREFIXES.iter().any(|p| reply.starts_with(p)));
    assert!(reply.ends_with("! 👋"));
    assert_eq!(oracle.call_count(), 0, "oracle must not be called");

    // Logged with the greeting topic, excluded from the non-greeting count.
    let messages = store.messages_for(&s);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].topic, "greeting");
    assert_eq!(store.count_messages(&s, Some("greeting")).await.unwrap(), 0);
}

#[tokio::test]
async fn all_greeting_variants_bypass_the_oracle() {
    let oracle = MockOracle::new();
    let manager = manager(oracle.clone(), InMemoryConversationStore::new());
    let s = session("s-variants");

    for input in [
        "hi",
        "hello",
        "hey",
        "hii",
        "hiii",
        "good morning",
        "good afternoon",
        "good evening",
        "  HELLO  ",
    ] {
        let reply = manager.handle_question(input, &s).await.unwrap();
        assert!(reply.ends_with("! 👋"), "unexpected reply for {input:?}: {reply}");
    }

    assert_eq!(oracle.call_count(), 0);
}

// ─── Name request and capture ───────────────────────────────────────────

#[tokio::test]
async fn third_non_greeting_message_triggers_the_name_request_once() {
    let oracle = MockOracle::new()
        .with_answer("Answer one.")
        .with_answer("Answer two.")
        .with_answer("Answer three.");
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle.clone(), store.clone());
    let s = session("s-name");

    manager.handle_question("about incubation", &s).await.unwrap();
    manager.handle_question("about funding", &s).await.unwrap();
    manager.handle_question("about mentors", &s).await.unwrap();

    // Fourth message arrives with three non-greeting messages stored.
    let reply = manager.handle_question("one more question", &s).await.unwrap();
    assert_eq!(reply, "Before we continue, may I know your name? 🙂");
    assert_eq!(oracle.call_count(), 3, "name request must not reach the oracle");

    let profile = store.find_profile(&s).await.unwrap().unwrap();
    assert_eq!(profile.state(), SessionState::AwaitingName);
    assert!(profile.name_asked);
}

#[tokio::test]
async fn greetings_do_not_advance_the_name_request_counter() {
    let oracle = MockOracle::new().with_answer("A1.").with_answer("A2.");
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle, store.clone());
    let s = session("s-counter");

    manager.handle_question("hi", &s).await.unwrap();
    manager.handle_question("question one", &s).await.unwrap();
    manager.handle_question("hello", &s).await.unwrap();
    manager.handle_question("question two", &s).await.unwrap();

    let profile = store.find_profile(&s).await.unwrap().unwrap();
    assert_eq!(profile.state(), SessionState::New);
    assert!(!profile.name_asked, "two non-greeting messages must not trigger");
}

#[tokio::test]
async fn awaiting_name_captures_and_title_cases_the_input() {
    let oracle = MockOracle::new().with_answer("A1.").with_answer("A2.").with_answer("A3.");
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle.clone(), store.clone());
    let s = session("s-capture");

    for q in ["q1", "q2", "q3", "q4"] {
        manager.handle_question(q, &s).await.unwrap();
    }

    // A greeting while awaiting the name is a dodge, state unchanged.
    let reply = manager.handle_question("hello", &s).await.unwrap();
    assert_eq!(reply, "😊 That sounds like a greeting. May I know your name?");

    let reply = manager.handle_question("  ravi kumar ", &s).await.unwrap();
    assert_eq!(reply, "Nice to meet you, Ravi Kumar 👋 How can I help you today?");

    let profile = store.find_profile(&s).await.unwrap().unwrap();
    assert_eq!(profile.state(), SessionState::Named);
    assert_eq!(profile.name.as_deref(), Some("Ravi Kumar"));
    assert!(!profile.name_asked);

    // Oracle was only reached by the three normal questions.
    assert_eq!(oracle.call_count(), 3);
}

#[tokio::test]
async fn named_user_gets_a_personalized_greeting() {
    let oracle = MockOracle::new().with_answer("A1.").with_answer("A2.").with_answer("A3.");
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle, store);
    let s = session("s-personal");

    for q in ["q1", "q2", "q3", "q4"] {
        manager.handle_question(q, &s).await.unwrap();
    }
    manager.handle_question("asha", &s).await.unwrap();

    let reply = manager.handle_question("hello", &s).await.unwrap();
    assert!(reply.contains(", Asha! 👋"), "expected personalized greeting, got {reply}");
}

// ─── Context prompts ────────────────────────────────────────────────────

#[tokio::test]
async fn first_question_is_sent_verbatim() {
    let oracle = MockOracle::new().with_answer("Answer.");
    let manager = manager(oracle.clone(), InMemoryConversationStore::new());
    let s = session("s-verbatim");

    manager.handle_question("What is incubation?", &s).await.unwrap();

    assert_eq!(oracle.prompts(), vec!["What is incubation?"]);
}

#[tokio::test]
async fn later_questions_carry_the_conversation_window() {
    let oracle = MockOracle::new()
        .with_answer("Incubation supports startups.")
        .with_answer("Funding is available.");
    let manager = manager(oracle.clone(), InMemoryConversationStore::new());
    let s = session("s-context");

    manager.handle_question("What is incubation?", &s).await.unwrap();
    manager.handle_question("And funding?", &s).await.unwrap();

    let prompts = oracle.prompts();
    let second = &prompts[1];
    assert!(second.starts_with("Previous conversation:\n"));
    assert!(second.contains("User: What is incubation?"));
    assert!(second.contains("Assistant: Incubation supports startups."));
    assert!(second.contains("Current question: And funding?"));
    assert!(second.ends_with("considering the conversation history."));
}

// ─── Escalation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn no_answer_response_escalates_instead_of_storing() {
    let oracle = MockOracle::new()
        .with_answer("The requested detail is not specified in the document.");
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle, store.clone());
    let s = session("s-escalate");

    let reply = manager.handle_question("Is parking available?", &s).await.unwrap();

    assert!(reply.contains("mailto:support@example.org"));
    assert!(reply.contains("<b>+91 11111 22222</b>"));

    let tickets = store.tickets();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].question, "Is parking available?");
    assert_eq!(tickets[0].user_name, "User");
    assert_eq!(tickets[0].status.as_str(), "pending");

    // The non-answer and the escalation reply stay out of the history.
    assert!(store.messages_for(&s).is_empty());
    assert_eq!(store.count_messages(&s, Some("greeting")).await.unwrap(), 0);
}

#[tokio::test]
async fn escalation_uses_the_captured_name() {
    let oracle = MockOracle::new()
        .with_answer("A1.")
        .with_answer("A2.")
        .with_answer("A3.")
        .with_answer("The document does not contain information about this.");
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle, store.clone());
    let s = session("s-escalate-named");

    for q in ["q1", "q2", "q3", "q4"] {
        manager.handle_question(q, &s).await.unwrap();
    }
    manager.handle_question("meera", &s).await.unwrap();

    manager.handle_question("something obscure", &s).await.unwrap();
    assert_eq!(store.tickets()[0].user_name, "Meera");
}

// ─── Oracle failures ────────────────────────────────────────────────────

#[tokio::test]
async fn oracle_failures_become_fixed_replies_and_are_not_stored() {
    let oracle = MockOracle::new()
        .with_error(OracleError::network("connection refused"))
        .with_error(OracleError::AuthenticationFailed)
        .with_error(OracleError::unavailable("y".repeat(300)));
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle, store.clone());
    let s = session("s-errors");

    let reply = manager.handle_question("q1", &s).await.unwrap();
    assert_eq!(
        reply,
        "❌ Cannot connect to the Gemini API. Please check your internet connection and try again."
    );

    let reply = manager.handle_question("q2", &s).await.unwrap();
    assert_eq!(reply, "❌ Invalid API key. Please check the configured Gemini API key.");

    let reply = manager.handle_question("q3", &s).await.unwrap();
    assert!(reply.starts_with("❌ An error occurred: "));

    assert!(store.messages_for(&s).is_empty(), "failures must not be persisted");
}

// ─── Retention window ───────────────────────────────────────────────────

#[tokio::test]
async fn history_never_exceeds_the_retention_window() {
    let store = InMemoryConversationStore::new();
    // Enough scripted answers plus a name for the mid-stream name request.
    let mut oracle = MockOracle::new();
    for i in 0..20 {
        oracle = oracle.with_answer(format!("Answer {i}."));
    }
    let manager = manager(oracle, store.clone());
    let s = session("s-window");

    for i in 0..3 {
        manager.handle_question(&format!("question {i}"), &s).await.unwrap();
    }
    manager.handle_question("question 3", &s).await.unwrap(); // name request
    manager.handle_question("dev", &s).await.unwrap(); // name capture
    for i in 4..18 {
        manager.handle_question(&format!("question {i}"), &s).await.unwrap();
        let count = store.count_messages(&s, None).await.unwrap();
        assert!(
            count <= RETENTION_WINDOW as u64,
            "window exceeded after question {i}: {count}"
        );
    }

    // Oldest messages were evicted first.
    let remaining = store.messages_for(&s);
    assert_eq!(remaining.len(), RETENTION_WINDOW);
    assert!(remaining.iter().all(|m| m.question != "question 0"));
    assert!(remaining.iter().any(|m| m.question == "question 17"));
}

// ─── Profile analytics ──────────────────────────────────────────────────

#[tokio::test]
async fn profile_tracks_counter_topics_and_first_question() {
    let oracle = MockOracle::new().with_answer("A1.").with_answer("A2.").with_answer("A3.");
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle, store.clone());
    let s = session("s-analytics");

    manager.handle_question("tell me about incubation", &s).await.unwrap();
    manager.handle_question("what about funding?", &s).await.unwrap();
    manager.handle_question("more funding details", &s).await.unwrap();

    let profile = store.find_profile(&s).await.unwrap().unwrap();
    assert_eq!(profile.total_messages, 3);
    assert_eq!(profile.topics_asked, vec!["incubation", "funding"]);
    assert_eq!(profile.first_question.as_deref(), Some("tell me about incubation"));
}

// ─── Reset ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_clears_history_but_keeps_the_profile() {
    let oracle = MockOracle::new().with_answer("A1.");
    let store = InMemoryConversationStore::new();
    let manager = manager(oracle, store.clone());
    let s = session("s-reset");

    manager.handle_question("a question", &s).await.unwrap();
    assert_eq!(store.messages_for(&s).len(), 1);

    let ack = manager.reset_session(&s).await.unwrap();
    assert_eq!(ack, "🔄 Conversation history cleared. How can I help you?");
    assert!(store.messages_for(&s).is_empty());

    // Idempotent: a second reset succeeds on an empty session.
    let ack = manager.reset_session(&s).await.unwrap();
    assert_eq!(ack, "🔄 Conversation history cleared. How can I help you?");
    assert!(store.find_profile(&s).await.unwrap().is_some());
}

// ─── Input validation ───────────────────────────────────────────────────

#[tokio::test]
async fn blank_questions_are_rejected() {
    let manager = manager(MockOracle::new(), InMemoryConversationStore::new());
    let s = session("s-blank");

    assert!(matches!(
        manager.handle_question("   ", &s).await,
        Err(DialogueError::EmptyQuestion)
    ));
}
