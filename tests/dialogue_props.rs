//! Property tests for the dialogue domain rules.

use proptest::prelude::*;
use std::sync::Arc;

use incubation_concierge::adapters::ai::MockOracle;
use incubation_concierge::adapters::memory::InMemoryConversationStore;
use incubation_concierge::application::{DialogueManager, SupportContact};
use incubation_concierge::domain::dialogue::{classify, is_greeting, title_case, RETENTION_WINDOW};
use incubation_concierge::domain::foundation::SessionId;
use incubation_concierge::ports::ConversationStore;

const KNOWN_TOPICS: [&str; 10] = [
    "incubation",
    "consultancy",
    "co-location",
    "research",
    "sppu-rpf",
    "pipeline",
    "funding",
    "mentorship",
    "facilities",
    "general",
];

proptest! {
    #[test]
    fn classify_always_returns_a_known_label(question in ".{0,200}") {
        prop_assert!(KNOWN_TOPICS.contains(&classify(&question)));
    }

    #[test]
    fn classify_ignores_case(question in "[a-zA-Z ]{0,80}") {
        prop_assert_eq!(classify(&question), classify(&question.to_uppercase()));
    }

    #[test]
    fn greeting_detection_survives_case_and_padding(
        index in 0usize..8,
        left in " {0,5}",
        right in " {0,5}",
    ) {
        let greetings = [
            "hi", "hello", "hey", "hii", "hiii",
            "good morning", "good afternoon", "good evening",
        ];
        let padded = format!("{left}{}{right}", greetings[index].to_uppercase());
        prop_assert!(is_greeting(&padded));
    }

    #[test]
    fn title_case_is_idempotent(input in "[a-zA-Z' -]{0,40}") {
        let once = title_case(&input);
        prop_assert_eq!(title_case(&once), once);
    }

    #[test]
    fn retained_history_never_exceeds_the_window(count in 1usize..25) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let store = InMemoryConversationStore::new();
            let manager = DialogueManager::new(
                Arc::new(MockOracle::new()),
                Arc::new(store.clone()),
                SupportContact {
                    email: "support@example.org".to_string(),
                    phone: "+91 11111 22222".to_string(),
                },
            );
            let session = SessionId::new("prop-window").unwrap();

            for i in 0..count {
                // Questions are phrased so none is a greeting and the name
                // request (answered on the next turn) still counts as input.
                manager
                    .handle_question(&format!("question number {i}"), &session)
                    .await
                    .unwrap();
                let stored = store.count_messages(&session, None).await.unwrap();
                assert!(
                    stored <= RETENTION_WINDOW as u64,
                    "window exceeded at message {i}: {stored}"
                );
            }
        });
    }
}
