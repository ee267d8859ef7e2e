use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::UserRecord;
use crate::api::{endpoint, ApiRequest, Query, Tag};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserRequest {
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserResponse {
    pub data: UserRecord,
}

impl ApiRequest for GetUserRequest {
    type Response = GetUserResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(endpoint(base_url, &format!("users/{}", self.id)))
    }
}

impl Query for GetUserRequest {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }

    fn tags(&self) -> Vec<Tag> {
        vec![Tag::User(self.id)]
    }
}
