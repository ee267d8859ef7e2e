use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::UserRecord;
use crate::api::{endpoint, ApiRequest, Query, Tag};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersRequest {
    pub page: u64,
}

/// One page of the user collection, with the pagination frame the service
/// reports alongside the records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersPage {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub data: Vec<UserRecord>,
}

impl ApiRequest for ListUsersRequest {
    type Response = UsersPage;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client
            .get(endpoint(base_url, "users"))
            .query(&[("page", self.page)])
    }
}

impl Query for ListUsersRequest {
    type Key = u64;

    fn key(&self) -> u64 {
        self.page
    }

    /// Every page carries the collection tag, so creates and deletes
    /// outdate all of them at once.
    fn tags(&self) -> Vec<Tag> {
        vec![Tag::UsersList]
    }
}
