use super::EntityKind;
use serde::{Deserialize, Serialize};

/// A blog owned by one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
}

/// Owner reference as embedded by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

impl EntityKind for Blog {
    const NAME: &'static str = "blog";
    const COLLECTION: &'static str = "blogs";
}

impl Blog {
    /// Owner login, or an empty string when the blog has no user.
    pub fn owner_login(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.login.as_deref())
            .unwrap_or("")
    }

    pub fn summary(&self) -> String {
        let id = self.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        let owner = self.owner_login();
        if owner.is_empty() {
            format!("#{} {} ({})", id, self.name, self.handle)
        } else {
            format!("#{} {} ({}) by {}", id, self.name, self.handle, owner)
        }
    }
}
