//! Paging defaults for the member listing.
//!
//! # Invariants
//! - `default_page_size` is within `1..=max_page_size`.
//! - Requests above `max_page_size` are rejected, never clamped.

use crate::model::member::MemberField;
use crate::query::{Direction, Sort};

pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const MAX_PAGE_SIZE: u32 = 2000;

/// Listing parameter defaults and limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingConfig {
    /// Used when the request carries no `size`.
    pub default_page_size: u32,
    /// Largest accepted `size`.
    pub max_page_size: u32,
    /// Used when the request carries no `sort`.
    pub default_sort: Sort<MemberField>,
    /// Parameter prefix, e.g. `member` reads `member_page`/`member_size`/`member_sort`.
    pub qualifier: Option<String>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            default_sort: Sort::by(Direction::Asc, MemberField::Age),
            qualifier: None,
        }
    }
}

impl PagingConfig {
    /// Same limits, parameters read under `{qualifier}_`.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Request parameter name after applying the qualifier.
    pub fn param_name(&self, name: &str) -> String {
        match self.qualifier.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}_{name}"),
            _ => name.to_string(),
        }
    }
}
