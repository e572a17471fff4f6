use serde::Serialize;
use serde_json::Map;

use crate::{auth::session::Identity, profiles::{repo_types::Profile, services::default_username}};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchBox {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMenu {
    pub display_name: String,
    pub email: String,
    pub sign_out: &'static str,
}

/// Top bar: optional search box plus the identity menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchBox>,
    pub user: UserMenu,
}

impl HeaderView {
    /// `search` is the current query when the page has search enabled.
    pub fn new(identity: &Identity, profile: Option<&Profile>, search: Option<&str>) -> Self {
        let display_name = profile
            .map(|p| p.username.clone())
            .unwrap_or_else(|| default_username(&identity.email, &Map::new()));
        Self {
            search: search.map(|q| SearchBox {
                query: q.to_string(),
            }),
            user: UserMenu {
                display_name,
                email: identity.email.clone(),
                sign_out: "/auth/sign-out",
            },
        }
    }
}
