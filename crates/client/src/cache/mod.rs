//! Query cache over the user service, one section per resource shape.
//!
//! Reads go through here instead of the [`ApiClient`] directly: the
//! cache serves fresh snapshots without a request, coalesces duplicate
//! requests, and reacts to tag invalidations from mutations.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::users::{GetUserRequest, ListUsersRequest, UserRecord, UsersPage};
use crate::api::{ApiClient, Query, Tag};

pub mod resource;

pub use resource::{Fetcher, QuerySnapshot, QueryStatus, ResourceCache, SectionStats};

/// Counters for all sections together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub pages: SectionStats,
    pub users: SectionStats,
}

/// The cache sections the console works against: user listing pages
/// keyed by page number and single user records keyed by id.
#[derive(Clone)]
pub struct QueryCache {
    client: ApiClient,
    pages: ResourceCache<u64, UsersPage>,
    users: ResourceCache<u64, UserRecord>,
}

impl QueryCache {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            pages: ResourceCache::new("users-page"),
            users: ResourceCache::new("user-detail"),
        }
    }

    /// One page of the user listing. `force` bypasses a fresh cached
    /// value but still joins a request already in flight.
    pub async fn users_page(&self, page: u64, force: bool) -> QuerySnapshot<UsersPage> {
        let request = ListUsersRequest { page };
        let key = request.key();
        let tags = request.tags();
        let fetcher = page_fetcher(self.client.clone(), request);
        self.pages.fetch(key, tags, fetcher, force).await
    }

    /// A single user record.
    pub async fn user(&self, id: u64, force: bool) -> QuerySnapshot<UserRecord> {
        let request = GetUserRequest { id };
        let key = request.key();
        let tags = request.tags();
        let fetcher = user_fetcher(self.client.clone(), request);
        self.users.fetch(key, tags, fetcher, force).await
    }

    pub fn subscribe_page(&self, page: u64) -> Option<watch::Receiver<QuerySnapshot<UsersPage>>> {
        self.pages.subscribe(&page)
    }

    pub fn subscribe_user(&self, id: u64) -> Option<watch::Receiver<QuerySnapshot<UserRecord>>> {
        self.users.subscribe(&id)
    }

    /// Applies one invalidation tag across every section.
    pub fn invalidate(&self, tag: &Tag) {
        tracing::debug!(%tag, "invalidating");
        self.pages.invalidate(tag);
        self.users.invalidate(tag);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            pages: self.pages.stats(),
            users: self.users.stats(),
        }
    }
}

fn page_fetcher(client: ApiClient, request: ListUsersRequest) -> Fetcher<UsersPage> {
    Arc::new(move || {
        let mut client = client.clone();
        let request = request.clone();
        Box::pin(async move { client.call(request).await })
    })
}

fn user_fetcher(client: ApiClient, request: GetUserRequest) -> Fetcher<UserRecord> {
    Arc::new(move || {
        let mut client = client.clone();
        let request = request.clone();
        Box::pin(async move {
            let response = client.call(request).await?;
            Ok(response.data)
        })
    })
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::session::SessionStore;

    #[tokio::test]
    async fn test_empty_cache_reports_empty_stats() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::open(dir.path().join("session.v1"));
        let base = Url::parse("http://127.0.0.1:9/api").unwrap();
        let client = ApiClient::new(&base, None, session).unwrap();
        let cache = QueryCache::new(client);

        cache.invalidate(&Tag::UsersList);
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
