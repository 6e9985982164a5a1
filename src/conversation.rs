//! Ancestor chain lookup for `conv`.

use crate::error::CommandError;
use crate::feeds::FeedClient;
use crate::store::{ItemStore, LocalId};
use std::collections::VecDeque;
use std::sync::Arc;

/// Upper bound on the length of a resolved chain, target included. Stops
/// the walk on long or cyclic reply graphs.
pub const MAX_CHAIN: usize = 10;

pub struct ConversationResolver {
    client: Arc<dyn FeedClient>,
    limit: usize,
}

impl ConversationResolver {
    pub fn new(client: Arc<dyn FeedClient>) -> Self {
        Self {
            client,
            limit: MAX_CHAIN,
        }
    }

    /// Walks the in-reply-to references of `target` backwards and returns
    /// the chain oldest first, ending with `target`.
    ///
    /// Ancestors already in the store are used as-is; the rest are looked up
    /// one at a time and adopted into the store. A failed lookup ends the
    /// walk with whatever has been collected.
    pub async fn resolve(
        &self,
        store: &mut ItemStore,
        target: LocalId,
    ) -> Result<Vec<LocalId>, CommandError> {
        let item = store.get(target).ok_or_else(|| CommandError::missing(target))?;
        let mut parent = item.content().in_reply_to();
        let mut chain = VecDeque::from([target]);

        while let Some(remote_id) = parent {
            if chain.len() >= self.limit {
                tracing::debug!(%target, limit = self.limit, "conversation truncated");
                break;
            }

            let local_id = match store.find_remote(remote_id) {
                Some(local_id) => local_id,
                None => match self.client.item(remote_id).await {
                    Ok(raw) => store.adopt(raw),
                    Err(e) => {
                        tracing::warn!(remote_id, error = %e, "ancestor lookup failed");
                        break;
                    }
                },
            };

            chain.push_front(local_id);
            parent = store
                .get(local_id)
                .and_then(|item| item.content().in_reply_to());
        }

        Ok(chain.into())
    }
}
