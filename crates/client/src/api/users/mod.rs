//! Operations on the user collection.

use serde::{Deserialize, Serialize};

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

pub use create::{CreateUserRequest, CreateUserResponse, DEFAULT_JOB};
pub use delete::{DeleteUserRequest, DeleteUserResponse};
pub use get::{GetUserRequest, GetUserResponse};
pub use list::{ListUsersRequest, UsersPage};
pub use update::{UpdateUserBody, UpdateUserRequest, UpdateUserResponse};

/// A user record as the service returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive substring match over the full name and email.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let haystack = format!("{} {} {}", self.first_name, self.last_name, self.email);
        haystack.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn janet() -> UserRecord {
        UserRecord {
            id: 2,
            email: "janet.weaver@reqres.in".to_string(),
            first_name: "Janet".to_string(),
            last_name: "Weaver".to_string(),
            avatar: Some("https://reqres.in/img/faces/2-image.jpg".to_string()),
        }
    }

    #[test]
    fn test_matches_name_and_email() {
        let user = janet();
        assert!(user.matches("janet"));
        assert!(user.matches("WEAVER"));
        assert!(user.matches("janet weaver"));
        assert!(user.matches("reqres.in"));
        assert!(!user.matches("tobias"));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(janet().full_name(), "Janet Weaver");
    }
}
