use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::api::{endpoint, is_valid_email, ApiRequest, Mutation, Tag, ValidationError};

/// Fields to change; absent fields are left untouched by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub id: u64,
    #[serde(flatten)]
    pub body: UpdateUserBody,
}

/// Echo of the applied fields plus the server-side timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    #[serde(flatten)]
    pub body: UpdateUserBody,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UpdateUserBody {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.job.is_none() && self.email.is_none() && self.avatar.is_none()
    }

    /// True when the update touches a field shown in list rows.
    pub fn touches_listing(&self) -> bool {
        self.name.is_some() || self.email.is_some() || self.avatar.is_some()
    }
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.body.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(name) = &self.body.name {
            if name.trim().is_empty() {
                return Err(ValidationError::Required("name"));
            }
        }
        if let Some(email) = &self.body.email {
            if !is_valid_email(email) {
                return Err(ValidationError::Email(email.clone()));
            }
        }
        Ok(())
    }
}

impl ApiRequest for UpdateUserRequest {
    type Response = UpdateUserResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client
            .put(endpoint(base_url, &format!("users/{}", self.id)))
            .json(&self.body)
    }
}

impl Mutation for UpdateUserRequest {
    fn invalidates(&self) -> Vec<Tag> {
        let mut tags = vec![Tag::User(self.id)];
        // List rows render name, email and avatar; a job-only edit leaves
        // cached pages alone.
        if self.body.touches_listing() {
            tags.push(Tag::UsersList);
        }
        tags
    }
}
