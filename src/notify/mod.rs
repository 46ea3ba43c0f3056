pub mod google_chat;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::message::{ChatSpace, NotificationMessage};

/// Delivers a composed message to a chat space.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn notify(&self, message: &NotificationMessage, space: &ChatSpace) -> Result<()>;
}
