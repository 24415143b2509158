// Page window over a server-paginated container list

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination block of a list response. `total_pages` is derived when the server omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationPayload {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationDomainModel {
    current_page: u32,
    page_size: u32,
    total_items: u64,
    total_pages: u32,
}

impl Default for PaginationDomainModel {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationDomainModel {
    /// Page 1 of an empty list.
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_items: 0,
            total_pages: 0,
        }
    }

    pub fn from_api_response(raw: PaginationPayload) -> Self {
        let page_size = raw.limit.max(1);
        let total_pages = raw
            .total_pages
            .unwrap_or_else(|| pages_for(raw.total, page_size));
        Self {
            current_page: raw.page.clamp(1, total_pages.max(1)),
            page_size,
            total_items: raw.total,
            total_pages,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// 1-based index of the first item on this page; 0 for an empty list.
    pub fn start_item(&self) -> u64 {
        if self.total_items == 0 {
            return 0;
        }
        let start = (self.current_page as u64 - 1) * self.page_size as u64 + 1;
        start.min(self.end_item())
    }

    pub fn end_item(&self) -> u64 {
        (self.current_page as u64 * self.page_size as u64).min(self.total_items)
    }

    pub fn next_page(&self) -> Self {
        if !self.has_next_page() {
            return self.clone();
        }
        self.at_page(self.current_page + 1)
    }

    pub fn previous_page(&self) -> Self {
        if !self.has_previous_page() {
            return self.clone();
        }
        self.at_page(self.current_page - 1)
    }

    pub fn first_page(&self) -> Self {
        self.at_page(1)
    }

    /// Clamped into `1..=max(total_pages, 1)`.
    pub fn with_page(&self, page: u32) -> Self {
        self.at_page(page.clamp(1, self.total_pages.max(1)))
    }

    /// Resets to page 1 so the window cannot land past the end.
    pub fn with_page_size(&self, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        Self {
            current_page: 1,
            page_size,
            total_items: self.total_items,
            total_pages: pages_for(self.total_items, page_size),
        }
    }

    fn at_page(&self, current_page: u32) -> Self {
        Self {
            current_page,
            ..self.clone()
        }
    }
}

fn pages_for(total: u64, page_size: u32) -> u32 {
    u32::try_from(total.div_ceil(page_size.max(1) as u64)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u32, limit: u32, total: u64) -> PaginationDomainModel {
        PaginationDomainModel::from_api_response(PaginationPayload {
            page,
            limit,
            total,
            total_pages: None,
        })
    }

    #[test]
    fn derives_total_pages_when_missing() {
        assert_eq!(page(1, 10, 25).total_pages(), 3);
        assert_eq!(page(1, 10, 30).total_pages(), 3);
        assert_eq!(page(1, 10, 0).total_pages(), 0);
    }

    #[test]
    fn empty_list_has_zero_window() {
        let p = page(1, 10, 0);
        assert_eq!(p.start_item(), 0);
        assert_eq!(p.end_item(), 0);
        assert!(!p.has_next_page());
        assert!(!p.has_previous_page());
    }

    #[test]
    fn last_page_is_partial() {
        let p = page(3, 10, 25);
        assert_eq!(p.start_item(), 21);
        assert_eq!(p.end_item(), 25);
        assert_eq!(p.next_page(), p);
    }

    #[test]
    fn server_page_past_the_end_is_clamped() {
        let p = page(3, 10, 5);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.start_item(), 1);
        assert_eq!(p.end_item(), 5);

        let inconsistent = PaginationDomainModel::from_api_response(PaginationPayload {
            page: 3,
            limit: 10,
            total: 5,
            total_pages: Some(4),
        });
        assert!(inconsistent.start_item() <= inconsistent.end_item());
    }

    #[test]
    fn huge_totals_saturate_page_count() {
        assert_eq!(page(1, 1, u64::MAX).total_pages(), u32::MAX);
    }

    #[test]
    fn with_page_clamps_into_range() {
        let p = page(1, 10, 25);
        assert_eq!(p.with_page(0).current_page(), 1);
        assert_eq!(p.with_page(9).current_page(), 3);
    }

    #[test]
    fn page_size_change_resets_to_first_page() {
        let p = page(3, 10, 25).with_page_size(5);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_pages(), 5);
        assert_eq!(p.with_page_size(0).page_size(), 1);
    }
}
