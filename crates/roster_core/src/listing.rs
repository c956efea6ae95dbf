//! Member listing adapter for an HTTP-style query string.
//!
//! # Responsibility
//! - Turn `page`/`size`/`sort` request parameters into a `PageRequest`.
//! - Render one page of `MemberView`s as the listing response body.
//!
//! # Invariants
//! - Invalid parameters fail the request; nothing is silently clamped.
//! - Missing parameters fall back to `PagingConfig` defaults.
//! - `sort` is repeatable; earlier occurrences take precedence.

use crate::config::PagingConfig;
use crate::model::member::MemberField;
use crate::model::view::MemberView;
use crate::query::{Direction, Field, Order, Page, PageRequest, QueryError, QueryResult, Sort};
use crate::repo::member_repo::MemberRepository;
use crate::repo::RepoResult;
use crate::service::member_service::MemberService;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::form_urlencoded;

static SORT_PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:,\s*([^,\s]*)\s*)?$").expect("valid sort regex")
});

/// Listing response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListing {
    pub content: Vec<MemberView>,
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<Page<MemberView>> for MemberListing {
    fn from(page: Page<MemberView>) -> Self {
        Self {
            number: page.number(),
            size: page.size(),
            number_of_elements: page.number_of_elements(),
            total_elements: page.total_elements(),
            total_pages: page.total_pages(),
            first: page.is_first(),
            last: page.is_last(),
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            content: page.into_content(),
        }
    }
}

/// Parses listing parameters from a query string (leading `?` optional).
pub fn parse_listing_request(
    query: &str,
    config: &PagingConfig,
) -> QueryResult<PageRequest<MemberField>> {
    let page_key = config.param_name("page");
    let size_key = config.param_name("size");
    let sort_key = config.param_name("sort");

    let mut page = None;
    let mut size = None;
    let mut orders = Vec::new();

    let query = query.strip_prefix('?').unwrap_or(query);
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let key = key.as_ref();
        if key == page_key {
            page = Some(parse_integer(&page_key, &value)?);
        } else if key == size_key {
            size = Some(parse_integer(&size_key, &value)?);
        } else if key == sort_key {
            orders.push(parse_sort_param(&value)?);
        }
    }

    let size = size.unwrap_or_else(|| i64::from(config.default_page_size));
    if size > i64::from(config.max_page_size) {
        return Err(QueryError::PageSizeTooLarge {
            size,
            max: config.max_page_size,
        });
    }

    let sort = if orders.is_empty() {
        config.default_sort.clone()
    } else {
        Sort::from_orders(orders)
    };
    PageRequest::of_sorted(page.unwrap_or(0), size, sort)
}

/// Runs the listing: parse parameters, page every member, project to views.
pub fn list_members<R: MemberRepository>(
    service: &MemberService<R>,
    query: &str,
    config: &PagingConfig,
) -> RepoResult<MemberListing> {
    let request = parse_listing_request(query, config)?;
    let page = service.list_member_views(&request)?;
    Ok(MemberListing::from(page))
}

/// Parses one `field[,direction]` sort parameter.
pub fn parse_sort_param(value: &str) -> QueryResult<Order<MemberField>> {
    let captures = SORT_PARAM_RE
        .captures(value)
        .ok_or_else(|| QueryError::MalformedSort(value.to_string()))?;

    let name = &captures[1];
    let field = MemberField::from_name(name)
        .ok_or_else(|| QueryError::UnknownField(name.to_string()))?;
    let direction = match captures.get(2) {
        Some(direction) => direction.as_str().parse::<Direction>()?,
        None => Direction::Asc,
    };

    Ok(Order { field, direction })
}

fn parse_integer(name: &str, value: &str) -> QueryResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| QueryError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        })
}
