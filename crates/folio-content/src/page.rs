//! Pagination and section header info

use serde::{Deserialize, Serialize};

/// Cards per page when a listing does not say otherwise
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Number of pages the full listing spans
    pub total_page: usize,
}

impl<T> Page<T> {
    /// A single page holding every item
    #[must_use]
    pub fn all(data: Vec<T>) -> Self {
        let total_page = usize::from(!data.is_empty());
        Self { data, total_page }
    }

    /// Map page items, keeping the page count
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total_page: self.total_page,
        }
    }
}

/// Slice page `page` (1-based) of `items`
///
/// Page `0` is read as page `1`. A zero `page_size` falls back to
/// [`DEFAULT_PAGE_SIZE`]. Pages past the end are empty but still report the
/// full page count.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    let total_page = items.len().div_ceil(page_size);
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    let data = items.into_iter().skip(start).take(page_size).collect();
    Page { data, total_page }
}

/// Section display metadata from a directory's `_index.md`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Section title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Section description
    #[serde(default)]
    pub description: String,
    /// Header background image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_image: Option<String>,
}

impl PageInfo {
    /// Set the title shown for this listing
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
