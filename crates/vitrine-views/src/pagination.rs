//! Page-number pagination for listings.

use serde::{Deserialize, Serialize};

/// `?page=` query parameter, 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

impl PageQuery {
    /// Requested page, defaulting to 1; page 0 is treated as 1.
    pub fn number(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

/// One page of a listing plus navigation data for templates.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_page: Option<usize>,
    pub next_page: Option<usize>,
}

/// Slice `items` down to page `page` (1-based) of `per_page` entries.
///
/// A page past the end yields no items but keeps the requested number, so
/// templates can still link back.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Paginated<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);

    let start = (page - 1).saturating_mul(per_page);
    let items: Vec<T> = items.into_iter().skip(start).take(per_page).collect();

    let has_prev = page > 1;
    let has_next = page < total_pages;

    Paginated {
        items,
        page,
        per_page,
        total,
        total_pages,
        has_prev,
        has_next,
        prev_page: has_prev.then(|| (page - 1).min(total_pages)),
        next_page: has_next.then_some(page + 1),
    }
}
