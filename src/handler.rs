use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::compose::MessageComposer;
use crate::model::message::{ChatSpace, TriggerMessage};
use crate::notify::Notifier;
use crate::providers::CardSource;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed trigger payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("no space provided in request")]
    MissingSpace,
    #[error("invalid space name {0:?}: expected spaces/<id>")]
    InvalidSpace(String),
    #[error("failed to retrieve cards: {0:#}")]
    Tracker(anyhow::Error),
    #[error("failed to deliver message to {space}: {error:#}")]
    Delivery {
        space: ChatSpace,
        error: anyhow::Error,
    },
}

impl RelayError {
    /// Whether the failure was caused by the caller rather than a downstream service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedPayload(_) | Self::MissingSpace | Self::InvalidSpace(_)
        )
    }
}

/// What a successful run posted, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub space: ChatSpace,
    pub cards: usize,
    pub text: String,
    pub url: Option<String>,
}

/// Runs one trigger: read the space, count the cards, post the message.
pub struct Relay {
    cards: Arc<dyn CardSource>,
    composer: MessageComposer,
    notifier: Arc<dyn Notifier>,
}

impl Relay {
    pub fn new(
        cards: Arc<dyn CardSource>,
        composer: MessageComposer,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            cards,
            composer,
            notifier,
        }
    }

    pub fn retrieve_space(body: &[u8]) -> Result<ChatSpace, RelayError> {
        let msg: TriggerMessage = serde_json::from_slice(body)?;
        let name = msg.space_name().ok_or(RelayError::MissingSpace)?;
        ChatSpace::parse(name).ok_or_else(|| RelayError::InvalidSpace(name.to_string()))
    }

    pub async fn handle(&self, body: &[u8]) -> Result<Delivery, RelayError> {
        let space = Self::retrieve_space(body)
            .inspect_err(|e| error!(error = %e, "Rejected trigger"))?;

        let cards = self.cards.retrieve_cards().await.map_err(|e| {
            error!(
                space = %space,
                source = self.cards.name(),
                error = %format!("{e:#}"),
                "Card retrieval failed"
            );
            RelayError::Tracker(e)
        })?;

        let message = self.composer.compose(cards.len());

        if let Err(e) = self.notifier.notify(&message, &space).await {
            error!(
                space = %space,
                notifier = self.notifier.name(),
                error = %format!("{e:#}"),
                "Chat delivery failed"
            );
            return Err(RelayError::Delivery { space, error: e });
        }

        info!(space = %space, cards = cards.len(), "Review count posted");
        Ok(Delivery {
            space,
            cards: cards.len(),
            text: message.text,
            url: message.url,
        })
    }
}

#[cfg(test)]
pub mod tests {
    use std::sync::Mutex;

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::model::board::{Card, Creator};
    use crate::model::message::NotificationMessage;

    pub fn card(id: u64) -> Card {
        Card {
            id,
            name: String::new(),
            note: Some(format!("PR #{id}")),
            creator: Creator {
                login: "octocat".into(),
            },
            content_url: None,
        }
    }

    /// A card source that counts calls and returns canned cards or a failure.
    pub struct MockCardSource {
        cards: Vec<Card>,
        should_fail: bool,
        pub calls: Arc<Mutex<usize>>,
    }

    impl MockCardSource {
        pub fn with_cards(count: u64) -> Self {
            Self {
                cards: (1..=count).map(card).collect(),
                should_fail: false,
                calls: Arc::new(Mutex::new(0)),
            }
        }

        pub fn failing() -> Self {
            Self {
                should_fail: true,
                ..Self::with_cards(0)
            }
        }
    }

    #[async_trait]
    impl CardSource for MockCardSource {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn retrieve_cards(&self) -> Result<Vec<Card>> {
            *self.calls.lock().unwrap() += 1;
            if self.should_fail {
                anyhow::bail!("Mock tracker failure");
            }
            Ok(self.cards.clone())
        }
    }

    /// A notifier that records every delivery.
    pub struct MockNotifier {
        should_fail: bool,
        pub sent: Arc<Mutex<Vec<(ChatSpace, NotificationMessage)>>>,
    }

    impl MockNotifier {
        pub fn new() -> Self {
            Self {
                should_fail: false,
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn failing() -> Self {
            Self {
                should_fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn notify(&self, message: &NotificationMessage, space: &ChatSpace) -> Result<()> {
            if self.should_fail {
                anyhow::bail!("Mock delivery failure");
            }
            self.sent
                .lock()
                .unwrap()
                .push((space.clone(), message.clone()));
            Ok(())
        }
    }

    pub fn relay(cards: MockCardSource, notifier: MockNotifier) -> Relay {
        Relay::new(
            Arc::new(cards),
            MessageComposer::new("https://example.test/board"),
            Arc::new(notifier),
        )
    }

    #[tokio::test]
    async fn posts_card_count_to_requested_space() {
        let notifier = MockNotifier::new();
        let sent = notifier.sent.clone();
        let relay = relay(MockCardSource::with_cards(4), notifier);

        let delivery = relay
            .handle(br#"{"space":{"name":"spaces/ABC123"}}"#)
            .await
            .unwrap();

        assert_eq!(delivery.space, ChatSpace::parse("spaces/ABC123").unwrap());
        assert_eq!(delivery.cards, 4);
        assert_eq!(delivery.url.as_deref(), Some("https://example.test/board"));
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChatSpace::parse("spaces/ABC123").unwrap());
        assert!(sent[0].1.text.contains('4'));
        assert!(sent[0].1.text.contains("https://example.test/board"));
    }

    #[tokio::test]
    async fn missing_space_makes_no_outbound_calls() {
        let cards = MockCardSource::with_cards(4);
        let calls = cards.calls.clone();
        let notifier = MockNotifier::new();
        let sent = notifier.sent.clone();
        let relay = relay(cards, notifier);

        let bodies: [&[u8]; 3] = [br#"{}"#, br#"{"space":{}}"#, br#"{"space":{"name":""}}"#];
        for body in bodies {
            let err = relay.handle(body).await.unwrap_err();
            assert!(matches!(err, RelayError::MissingSpace));
            assert!(err.is_client_error());
        }

        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn space_names_that_escape_the_message_url_are_rejected() {
        let cards = MockCardSource::with_cards(4);
        let calls = cards.calls.clone();
        let notifier = MockNotifier::new();
        let sent = notifier.sent.clone();
        let relay = relay(cards, notifier);

        let bodies: [&[u8]; 4] = [
            br#"{"space":{"name":"spaces/../x"}}"#,
            br#"{"space":{"name":"spaces/A?b="}}"#,
            br#"{"space":{"name":"spaces/../../v1/spaces/OTHER/members?x="}}"#,
            br#"{"space":{"name":" spaces/ABC123 "}}"#,
        ];
        for body in bodies {
            let err = relay.handle(body).await.unwrap_err();
            assert!(matches!(err, RelayError::InvalidSpace(_)), "got {err:?}");
            assert!(err.is_client_error());
        }

        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_makes_no_outbound_calls() {
        let cards = MockCardSource::with_cards(1);
        let calls = cards.calls.clone();
        let relay = relay(cards, MockNotifier::new());

        let err = relay.handle(b"not json").await.unwrap_err();

        assert!(matches!(err, RelayError::MalformedPayload(_)));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn tracker_failure_sends_nothing() {
        let notifier = MockNotifier::new();
        let sent = notifier.sent.clone();
        let relay = relay(MockCardSource::failing(), notifier);

        let err = relay
            .handle(br#"{"space":{"name":"spaces/ABC123"}}"#)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Tracker(_)));
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("Mock tracker failure"));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_after_successful_retrieval() {
        let cards = MockCardSource::with_cards(3);
        let calls = cards.calls.clone();
        let relay = relay(cards, MockNotifier::failing());

        let err = relay
            .handle(br#"{"space":{"name":"spaces/ABC123"}}"#)
            .await
            .unwrap_err();

        assert_eq!(*calls.lock().unwrap(), 1);
        match err {
            RelayError::Delivery { space, .. } => assert_eq!(space.as_str(), "spaces/ABC123"),
            other => panic!("expected delivery error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_column_still_notifies() {
        let notifier = MockNotifier::new();
        let sent = notifier.sent.clone();
        let relay = relay(MockCardSource::with_cards(0), notifier);

        let delivery = relay
            .handle(br#"{"space":{"name":"spaces/XYZ"}}"#)
            .await
            .unwrap();

        assert_eq!(delivery.cards, 0);
        assert!(sent.lock().unwrap()[0].1.text.contains("There are 0 PRs"));
    }
}
