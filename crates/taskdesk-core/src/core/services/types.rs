use std::collections::BTreeMap;

pub use crate::storage::credentials::TokenSource;

/// Authentication state as reported by `auth status`.
#[derive(Debug, Clone)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub token_source: Option<TokenSource>,
    pub server_url: Option<String>,
}

/// Server-side list parameters shared by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Endpoint-specific equality filters (`status`, `priority`, `role`...).
    pub filters: BTreeMap<String, String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListParams {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(sort_order.into());
        self
    }

    /// Filter value by key, ignoring empty strings.
    pub fn filter(&self, key: &str) -> Option<String> {
        self.filters.get(key).filter(|v| !v.is_empty()).cloned()
    }

    pub fn non_empty_search(&self) -> Option<String> {
        self.search.clone().filter(|s| !s.trim().is_empty())
    }
}
