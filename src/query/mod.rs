//! Query engine.
//!
//! Pure functions over a snapshot of toys: filter, then sort, then cut a
//! page. Nothing here touches the store or mutates its input.

mod filter;
mod sort;

pub use filter::{LabelMatch, StockFilter, ToyFilter};
pub use sort::{compare_names, SortBy, SortField, SortOrder};

use crate::types::Toy;

/// A zero-based page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub size: usize,
}

impl Page {
    pub fn new(index: usize, size: usize) -> Self {
        Self { index, size }
    }

    fn bounds(&self, len: usize) -> (usize, usize) {
        let size = self.size.max(1);
        let start = self.index.saturating_mul(size).min(len);
        let end = start.saturating_add(size).min(len);
        (start, end)
    }
}

/// Filter, sort and paginate `snapshot`.
///
/// With `page` set to `None` the whole sorted result is returned. A page
/// past the end yields an empty vector.
pub fn query(snapshot: &[Toy], filter: &ToyFilter, sort: &SortBy, page: Option<Page>) -> Vec<Toy> {
    let matcher = filter.compile();
    let mut matched: Vec<&Toy> = snapshot.iter().filter(|t| matcher.matches(t)).collect();

    // sort_by is stable: ties keep snapshot order
    matched.sort_by(|a, b| sort.compare(a, b));

    let window = match page {
        Some(page) => {
            let (start, end) = page.bounds(matched.len());
            &matched[start..end]
        }
        None => &matched[..],
    };

    window.iter().map(|t| (*t).clone()).collect()
}

/// Number of toys in `snapshot` matching `filter`.
pub fn count(snapshot: &[Toy], filter: &ToyFilter) -> usize {
    let matcher = filter.compile();
    snapshot.iter().filter(|t| matcher.matches(t)).count()
}

/// Number of pages needed for `total` results at `page_size` per page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    (total + size - 1) / size
}
