use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{endpoint, is_valid_email, ApiRequest, Mutation, Tag, ValidationError};

pub const PASSWORD_MIN_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::Required("email"));
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::Email(self.email.clone()));
        }
        if self.password.len() < PASSWORD_MIN_LEN {
            return Err(ValidationError::PasswordTooShort(PASSWORD_MIN_LEN));
        }
        Ok(())
    }
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "login")).json(&self)
    }
}

impl Mutation for LoginRequest {
    fn invalidates(&self) -> Vec<Tag> {
        Vec::new()
    }
}
