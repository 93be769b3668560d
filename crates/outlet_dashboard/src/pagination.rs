//! Client-side pagination for listing tables.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number after clamping into range.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    /// Slice `items` into the requested page. Out-of-range page numbers are
    /// clamped to the nearest valid page; an empty list has one empty page.
    pub fn of(items: &[T], page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);
        let start = (page - 1) * per_page;
        let end = (start + per_page).min(total_items);
        Self {
            items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
            page,
            per_page,
            total_items,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Index (0-based, over the whole list) of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }
}
