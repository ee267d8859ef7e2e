use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{endpoint, ApiRequest, Mutation, Tag};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    pub id: u64,
}

/// The service acknowledges a delete with 204 and an empty body.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeleteUserResponse;

impl ApiRequest for DeleteUserRequest {
    type Response = DeleteUserResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.delete(endpoint(base_url, &format!("users/{}", self.id)))
    }
}

impl Mutation for DeleteUserRequest {
    fn invalidates(&self) -> Vec<Tag> {
        vec![Tag::User(self.id), Tag::UsersList]
    }
}
