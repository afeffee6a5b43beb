//! Fixed-size page windows over a `FilteredSet`.

use super::{FilteredSet, RecordHandle};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// One window of a filtered set. `page` and `total_pages` are both 0 when the
/// set is empty.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub items: &'a [RecordHandle],
    pub page: usize,
    pub total_pages: usize,
}

/// Page navigation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Navigation {
    First,
    Previous,
    Next,
    Last,
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// A page size of 0 is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size)
    }

    /// Clamps `requested` into `1..=total_pages`, or 0 when there are no pages.
    pub fn clamp(requested: usize, total_pages: usize) -> usize {
        if total_pages == 0 {
            0
        } else {
            requested.clamp(1, total_pages)
        }
    }

    /// Returns the window for `requested`, clamped to an existing page.
    pub fn page<'a>(&self, set: &'a FilteredSet, requested: usize) -> Page<'a> {
        let count = set.len();
        let total_pages = self.total_pages(count);
        let page = Self::clamp(requested, total_pages);

        let items = if page == 0 {
            &set.as_slice()[..0]
        } else {
            let start = (page - 1) * self.page_size;
            let end = (page * self.page_size).min(count);
            &set.as_slice()[start..end]
        };

        Page {
            items,
            page,
            total_pages,
        }
    }

    /// The page reached from `current` by `nav`, never leaving `1..=total_pages`.
    pub fn navigate(nav: Navigation, current: usize, total_pages: usize) -> usize {
        let target = match nav {
            Navigation::First => 1,
            Navigation::Previous => current.saturating_sub(1),
            Navigation::Next => current.saturating_add(1),
            Navigation::Last => total_pages,
        };
        Self::clamp(target, total_pages)
    }
}
