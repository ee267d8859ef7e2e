use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::api::{endpoint, is_valid_email, ApiRequest, Mutation, Tag, ValidationError};

/// Job title applied when the caller does not provide one.
pub const DEFAULT_JOB: &str = "New User";

/// Payload for creating a user. The service takes a joined display name
/// rather than the first/last split it returns on reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub job: String,
    pub email: String,
    pub avatar: String,
}

/// Echo of the accepted payload plus the server-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub name: String,
    pub job: String,
    pub email: String,
    pub avatar: String,
    pub id: String,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::Required("email"));
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::Email(self.email.clone()));
        }
        if self.avatar.trim().is_empty() {
            return Err(ValidationError::Required("avatar"));
        }
        Ok(())
    }
}

impl ApiRequest for CreateUserRequest {
    type Response = CreateUserResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "users")).json(&self)
    }
}

impl Mutation for CreateUserRequest {
    fn invalidates(&self) -> Vec<Tag> {
        vec![Tag::UsersList]
    }
}
