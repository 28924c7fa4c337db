//! Page-number pagination shared by every listing.

use crate::{EngineError, ResultEngine};

/// Items per page.
pub const PAGE_SIZE: u64 = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Convert every item, failing on the first error.
    pub(crate) fn try_map<U, F>(self, f: F) -> ResultEngine<Page<U>>
    where
        F: FnMut(T) -> ResultEngine<U>,
    {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<ResultEngine<_>>()?,
            page: self.page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        })
    }
}

/// Reject page 0; pages start at 1.
pub(crate) fn validate_page(page: u64) -> ResultEngine<u64> {
    if page == 0 {
        return Err(EngineError::InvalidField("page must be >= 1".to_string()));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_is_rejected() {
        assert!(validate_page(0).is_err());
        assert_eq!(validate_page(3).unwrap(), 3);
    }

    #[test]
    fn has_next_stops_on_last_page() {
        let page = Page::<u8> {
            items: vec![],
            page: 2,
            total_items: 40,
            total_pages: 2,
        };
        assert!(!page.has_next());
    }
}
