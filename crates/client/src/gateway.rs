//! Write path for the user service.
//!
//! A mutation is sent exactly once, never retried. Only when the
//! service accepts it are the mutation's declared tags invalidated in
//! the query cache; a failed write leaves every cached read untouched.

use crate::api::{ApiClient, ApiError, Mutation};
use crate::cache::QueryCache;

#[derive(Clone)]
pub struct MutationGateway {
    client: ApiClient,
    cache: QueryCache,
}

impl MutationGateway {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    /// Runs one mutation against the service and, on success, applies
    /// its invalidations.
    pub async fn run<M: Mutation>(&self, mutation: M) -> Result<M::Response, ApiError> {
        let tags = mutation.invalidates();
        let mut client = self.client.clone();
        let response = client.call(mutation).await?;
        tracing::debug!(tags = tags.len(), "mutation accepted");
        for tag in &tags {
            self.cache.invalidate(tag);
        }
        Ok(response)
    }
}
