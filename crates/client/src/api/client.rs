use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use url::Url;

use super::error::ApiError;
use super::ApiRequest;
use crate::session::SessionStore;

/// HTTP client for the user service. Consults the shared session store on
/// every call so a token stored after login is attached without rebuilding
/// the client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    session: SessionStore,
    client: Client,
}

impl ApiClient {
    /// Builds a client for `base`. The optional API key is sent as a
    /// static `x-api-key` header on every request.
    pub fn new(
        base: &Url,
        api_key: Option<HeaderValue>,
        session: SessionStore,
    ) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            default_headers.insert("x-api-key", key);
        }
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            base: base.clone(),
            session,
            client,
        })
    }

    /// Sends exactly one request for `request` and decodes the response.
    /// No retries; a 2xx with an empty body decodes as JSON null, which is
    /// how deletes acknowledge.
    pub async fn call<T: ApiRequest>(&mut self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.base, &self.client);
        let response = self.authorize(request_builder).send().await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            if body.is_empty() {
                serde_json::from_value(serde_json::Value::Null)
                    .map_err(|e| ApiError::Decode(e.to_string()))
            } else {
                serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
            }
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::rejection(status, body))
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
