//! Wire operations against the remote user service.
//!
//! Each operation lives in its own module and declares how to build its
//! HTTP request. Reads additionally implement [`Query`] (a cache key plus
//! the tags the cached entry carries) and writes implement [`Mutation`]
//! (the tags a successful write outdates).

use std::fmt;
use std::hash::Hash;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

pub mod client;
pub mod error;
pub mod login;
pub mod users;

pub use client::ApiClient;
pub use error::ApiError;

/// Cache tag linking reads to the mutations that outdate them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// The user collection, any page of it.
    UsersList,
    /// A single user record.
    User(u64),
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::UsersList => write!(f, "users-list"),
            Tag::User(id) => write!(f, "user:{}", id),
        }
    }
}

/// An operation the [`ApiClient`] can send.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}

/// A cacheable read. The key must be stable for identical parameters;
/// the tags link the cached entry to the mutations that outdate it and
/// are fixed when the entry is created.
pub trait Query: ApiRequest + Clone + Send + Sync + 'static {
    type Key: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    fn tags(&self) -> Vec<Tag>;
}

/// A write. Declared invalidations are applied by the gateway only after
/// the request succeeds.
pub trait Mutation: ApiRequest {
    fn invalidates(&self) -> Vec<Tag>;
}

/// Field-level problems caught before a request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("invalid email address: {0}")]
    Email(String),
    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("no fields to update")]
    EmptyUpdate,
}

/// Joins a path onto the configured base URL, which may itself carry a
/// path segment such as `/api`.
pub(crate) fn endpoint(base_url: &Url, path: &str) -> String {
    format!("{}/{}", base_url.as_str().trim_end_matches('/'), path)
}

/// Lenient address shape check: a non-empty local part, an `@`, a dotted
/// domain, no whitespace.
pub(crate) fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
