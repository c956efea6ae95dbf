//! Sort keys, page requests, and result windows.
//!
//! # Invariants
//! - A `PageRequest` always has `size >= 1`; construction rejects anything else.
//! - `Page::total_pages` is `ceil(total_elements / size)`.
//! - A page index past the end yields empty content, not an error.

use super::{Field, QueryError, QueryResult};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(QueryError::InvalidSortDirection(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order<F: Field> {
    pub field: F,
    pub direction: Direction,
}

impl<F: Field> Order<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

/// Ordered list of sort keys. Earlier keys take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort<F: Field> {
    orders: Vec<Order<F>>,
}

impl<F: Field> Default for Sort<F> {
    fn default() -> Self {
        Self::unsorted()
    }
}

impl<F: Field> Sort<F> {
    pub fn unsorted() -> Self {
        Self { orders: Vec::new() }
    }

    pub fn by(direction: Direction, field: F) -> Self {
        Self {
            orders: vec![Order { field, direction }],
        }
    }

    pub fn from_orders(orders: impl IntoIterator<Item = Order<F>>) -> Self {
        Self {
            orders: orders.into_iter().collect(),
        }
    }

    /// Appends a lower-precedence key.
    pub fn and(mut self, order: Order<F>) -> Self {
        self.orders.push(order);
        self
    }

    pub fn orders(&self) -> &[Order<F>] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Zero-based page index, positive page size, and sort keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F: Field> {
    page: u32,
    size: u32,
    sort: Sort<F>,
}

impl<F: Field> PageRequest<F> {
    /// Unsorted request; ordering falls back to identity.
    pub fn of(page: i64, size: i64) -> QueryResult<Self> {
        Self::of_sorted(page, size, Sort::unsorted())
    }

    pub fn of_sorted(page: i64, size: i64, sort: Sort<F>) -> QueryResult<Self> {
        if page < 0 {
            return Err(QueryError::InvalidPageIndex(page));
        }
        let page = u32::try_from(page).map_err(|_| QueryError::PageIndexTooLarge {
            page,
            max: u32::MAX,
        })?;
        if size <= 0 {
            return Err(QueryError::InvalidPageSize(size));
        }
        let size = u32::try_from(size).map_err(|_| QueryError::PageSizeTooLarge {
            size,
            max: u32::MAX,
        })?;
        Ok(Self { page, size, sort })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort<F> {
        &self.sort
    }

    /// Number of rows preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Same size and sort, following page.
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
            sort: self.sort.clone(),
        }
    }
}

/// Bounded result window with total-count metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    content: Vec<T>,
    number: u32,
    size: u32,
    total_elements: u64,
}

impl<T> Page<T> {
    pub(crate) fn new(content: Vec<T>, number: u32, size: u32, total_elements: u64) -> Self {
        Self {
            content,
            number,
            size,
            total_elements,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Zero-based index of this page.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Requested page size, not the content length.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn map<U>(self, mapper: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(mapper).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// Bounded result window without a total count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    content: Vec<T>,
    number: u32,
    size: u32,
    has_next: bool,
}

impl<T> Slice<T> {
    /// Builds a slice from a `size + 1` over-fetch, trimming the probe row.
    pub(crate) fn from_overfetch(mut fetched: Vec<T>, number: u32, size: u32) -> Self {
        let limit = size as usize;
        let has_next = fetched.len() > limit;
        fetched.truncate(limit);
        Self {
            content: fetched,
            number,
            size,
            has_next,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next
    }

    pub fn map<U>(self, mapper: impl FnMut(T) -> U) -> Slice<U> {
        Slice {
            content: self.content.into_iter().map(mapper).collect(),
            number: self.number,
            size: self.size,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Page, PageRequest, Slice};
    use crate::model::member::MemberField;
    use crate::query::QueryError;

    #[test]
    fn direction_parses_case_insensitively_and_rejects_garbage() {
        assert_eq!("DESC".parse::<Direction>(), Ok(Direction::Desc));
        assert_eq!(" asc ".parse::<Direction>(), Ok(Direction::Asc));
        assert_eq!(
            "sideways".parse::<Direction>(),
            Err(QueryError::InvalidSortDirection("sideways".to_string()))
        );
    }

    #[test]
    fn page_request_rejects_non_positive_size_and_negative_page() {
        assert_eq!(
            PageRequest::<MemberField>::of(0, 0),
            Err(QueryError::InvalidPageSize(0))
        );
        assert_eq!(
            PageRequest::<MemberField>::of(0, -3),
            Err(QueryError::InvalidPageSize(-3))
        );
        assert_eq!(
            PageRequest::<MemberField>::of(-1, 5),
            Err(QueryError::InvalidPageIndex(-1))
        );
    }

    #[test]
    fn page_request_rejects_index_beyond_u32() {
        let page = i64::from(u32::MAX) + 1;
        assert_eq!(
            PageRequest::<MemberField>::of(page, 5),
            Err(QueryError::PageIndexTooLarge {
                page,
                max: u32::MAX
            })
        );
    }

    #[test]
    fn page_request_offset_spans_previous_pages() {
        let request = PageRequest::<MemberField>::of(3, 7).expect("valid request");
        assert_eq!(request.offset(), 21);
        assert_eq!(request.next().page(), 4);
    }

    #[test]
    fn page_metadata_follows_totals() {
        let page = Page::new(vec![1, 2, 3], 0, 3, 5);
        assert_eq!(page.total_pages(), 2);
        assert!(page.is_first());
        assert!(page.has_next());
        assert!(!page.is_last());
        assert!(!page.has_previous());

        let last = Page::new(vec![4, 5], 1, 3, 5);
        assert!(last.is_last());
        assert!(last.has_previous());
    }

    #[test]
    fn empty_page_has_zero_total_pages() {
        let page: Page<u8> = Page::new(Vec::new(), 0, 10, 0);
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_first());
        assert!(page.is_last());
    }

    #[test]
    fn page_map_preserves_metadata() {
        let page = Page::new(vec![1, 2], 1, 2, 6).map(|value| value * 10);
        assert_eq!(page.content(), &[10, 20]);
        assert_eq!(page.number(), 1);
        assert_eq!(page.total_elements(), 6);
    }

    #[test]
    fn slice_trims_overfetched_probe_row() {
        let slice = Slice::from_overfetch(vec![1, 2, 3, 4], 0, 3);
        assert_eq!(slice.content(), &[1, 2, 3]);
        assert!(slice.has_next());

        let tail = Slice::from_overfetch(vec![4, 5], 1, 3);
        assert_eq!(tail.content(), &[4, 5]);
        assert!(!tail.has_next());
        assert!(tail.is_last());
    }
}
