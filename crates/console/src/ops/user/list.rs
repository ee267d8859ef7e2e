use std::fmt;

use clap::Args;
use comfy_table::Table;
use owo_colors::OwoColorize;

use client::api::users::UserRecord;
use client::ApiError;

use crate::op::NotLoggedIn;

/// Show a page of the user collection.
///
/// Pages are served from the local cache once fetched; `--refresh` asks the
/// service again even when a cached page exists.
#[derive(Args, Debug, Clone)]
pub struct List {
    /// Page of the collection to show
    #[arg(long, default_value = "1")]
    pub page: u64,

    /// Case-insensitive filter over names and email addresses
    #[arg(long)]
    pub search: Option<String>,

    /// Bypass the cache and fetch the page again
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug)]
pub struct ListOutput {
    pub rows: Vec<UserRecord>,
    pub page: u64,
    pub total_pages: u64,
    pub total: u64,
    pub stale: bool,
    pub filtered: bool,
}

impl fmt::Display for ListOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            if self.filtered {
                writeln!(f, "No users match the filter")?;
            } else {
                writeln!(f, "No users on this page")?;
            }
        } else {
            let mut table = Table::new();
            table.set_header(vec!["ID", "NAME", "EMAIL", "AVATAR"]);
            for user in &self.rows {
                table.add_row(vec![
                    user.id.to_string(),
                    user.full_name(),
                    user.email.clone(),
                    user.avatar.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            writeln!(f, "{table}")?;
        }
        write!(
            f,
            "page {} of {} ({} users)",
            self.page, self.total_pages, self.total
        )?;
        if self.stale {
            write!(f, " {}", "(stale)".yellow())?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Auth(#[from] NotLoggedIn),

    #[error("the service rejected the session ({0}); run `roster login` again")]
    SessionRejected(ApiError),

    #[error("could not load users: {0}")]
    Api(ApiError),
}

impl From<ApiError> for ListError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            ListError::SessionRejected(err)
        } else {
            ListError::Api(err)
        }
    }
}

#[async_trait::async_trait]
impl crate::op::Op for List {
    type Error = ListError;
    type Output = ListOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        crate::op::require_session(ctx)?;

        let snapshot = ctx.state.cache.users_page(self.page, self.refresh).await;
        let stale = snapshot.stale;
        let page = snapshot.into_result()?;

        let rows: Vec<UserRecord> = match &self.search {
            Some(needle) => page
                .data
                .iter()
                .filter(|user| user.matches(needle))
                .cloned()
                .collect(),
            None => page.data.clone(),
        };

        Ok(ListOutput {
            rows,
            page: page.page,
            total_pages: page.total_pages,
            total: page.total,
            stale,
            filtered: self.search.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use client::state::{AppConfig, AppState};

    use crate::op::{Op, OpContext};

    #[tokio::test]
    async fn test_listing_requires_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::init(Some(dir.path().to_path_buf()), AppConfig::default()).unwrap();
        let ctx = OpContext {
            config_dir: None,
            state,
        };

        let op = List {
            page: 1,
            search: None,
            refresh: false,
        };
        let err = op.execute(&ctx).await.unwrap_err();
        assert!(matches!(err, ListError::Auth(_)));
    }
}
