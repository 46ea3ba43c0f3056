use crate::model::message::NotificationMessage;

/// Turns a card count into the text posted to chat.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    reference_url: String,
}

impl MessageComposer {
    pub fn new(reference_url: impl Into<String>) -> Self {
        Self {
            reference_url: reference_url.into(),
        }
    }

    pub fn compose(&self, card_count: usize) -> NotificationMessage {
        NotificationMessage {
            text: format!(
                "There are {card_count} PRs awaiting code review \n{}",
                self.reference_url
            ),
            url: Some(self.reference_url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = "https://github.com/orgs/test-org/projects/1";

    #[test]
    fn message_embeds_count_and_board_link() {
        let composer = MessageComposer::new(BOARD);
        for n in [0, 1, 4, 37, 1000] {
            let msg = composer.compose(n);
            assert!(msg.text.contains(&format!("There are {n} PRs")));
            assert!(msg.text.contains(BOARD));
            assert_eq!(msg.url.as_deref(), Some(BOARD));
        }
    }

    #[test]
    fn exact_template() {
        let msg = MessageComposer::new(BOARD).compose(4);
        assert_eq!(
            msg.text,
            "There are 4 PRs awaiting code review \nhttps://github.com/orgs/test-org/projects/1"
        );
    }
}
