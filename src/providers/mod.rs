pub mod github;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::board::Card;

/// Lists the cards sitting in the watched column.
#[async_trait]
pub trait CardSource: Send + Sync {
    fn name(&self) -> &str;
    async fn retrieve_cards(&self) -> Result<Vec<Card>>;
}
