use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;
/// Largest integer a JSON client can hold exactly (2^53 - 1).
pub const MAX_PAGE: u64 = 9_007_199_254_740_991;

/// Requested page window. `page` is in `1..=MAX_PAGE`, `limit` in `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page.min(MAX_PAGE) },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit.min(MAX_LIMIT) },
        }
    }

    /// Base-10 parse; anything unparsable or zero falls back to the default.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(0);
        Self::new(parse(page), parse(limit))
    }

    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }

    /// Links to the neighbouring pages given the collection total.
    pub fn links(&self, total: u64) -> PaginationResult {
        let next = (self.end_index() < total).then(|| PageLink {
            page: self.page.saturating_add(1),
            limit: self.limit,
        });
        let prev = (self.start_index() > 0).then(|| PageLink {
            page: self.page - 1,
            limit: self.limit,
        });
        PaginationResult { next, prev }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_use_defaults() {
        assert_eq!(Pagination::parse(None, None), Pagination::new(1, 20));
    }

    #[test]
    fn malformed_values_use_defaults() {
        let p = Pagination::parse(Some("abc"), Some("-5"));
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 20);

        let p = Pagination::parse(Some("0"), Some("2.5"));
        assert_eq!(p, Pagination::default());

        let p = Pagination::parse(Some(" 4 "), Some("10"));
        assert_eq!((p.page, p.limit), (4, 10));
    }

    #[test]
    fn first_page_of_45() {
        let links = Pagination::new(1, 20).links(45);
        assert_eq!(links.next, Some(PageLink { page: 2, limit: 20 }));
        assert_eq!(links.prev, None);
    }

    #[test]
    fn last_page_of_45() {
        let p = Pagination::new(3, 20);
        assert_eq!(p.start_index(), 40);
        let links = p.links(45);
        assert_eq!(links.next, None);
        assert_eq!(links.prev, Some(PageLink { page: 2, limit: 20 }));
    }

    #[test]
    fn exact_fit_has_no_next() {
        let links = Pagination::new(2, 20).links(40);
        assert!(links.next.is_none());
        assert!(links.prev.is_some());
    }

    #[test]
    fn huge_values_are_clamped() {
        let p = Pagination::new(u64::MAX, u64::MAX);
        assert_eq!((p.page, p.limit), (MAX_PAGE, MAX_LIMIT));
        assert!(p.links(10).next.is_none());
        assert_eq!(
            p.links(10).prev,
            Some(PageLink {
                page: MAX_PAGE - 1,
                limit: MAX_LIMIT
            })
        );
    }

    #[test]
    fn oversized_limit_is_clamped_on_parse() {
        let p = Pagination::parse(Some("2"), Some("18446744073709551615"));
        assert_eq!((p.page, p.limit), (2, MAX_LIMIT));
        assert_eq!(p.start_index(), MAX_LIMIT);
    }

    #[test]
    fn absent_links_are_not_serialized() {
        let json = serde_json::to_value(Pagination::new(1, 20).links(5)).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
