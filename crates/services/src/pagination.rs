//! Offset pagination arithmetic shared by the user and thread listings.

use domains::DomainError;

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page_number: u32,
    page_size: u32,
}

impl PageParams {
    pub fn new(page_number: u32, page_size: u32) -> Result<Self, DomainError> {
        if page_number == 0 {
            return Err(DomainError::validation("page number starts at 1"));
        }
        if page_size == 0 {
            return Err(DomainError::validation("page size must be positive"));
        }
        Ok(Self { page_number, page_size })
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// More results exist past this page.
pub fn has_next(total: u64, skip: u64, returned: usize) -> bool {
    total > skip + returned as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_is_previous_pages_times_size() {
        assert_eq!(PageParams::new(1, 20).unwrap().skip(), 0);
        assert_eq!(PageParams::new(3, 20).unwrap().skip(), 40);
        assert_eq!(PageParams::new(3, 20).unwrap().limit(), 20);
    }

    #[test]
    fn zero_page_or_size_is_rejected() {
        assert!(PageParams::new(0, 20).is_err());
        assert!(PageParams::new(1, 0).is_err());
    }

    #[test]
    fn exact_boundary_has_no_next_page() {
        // 40 matches, page 2 of 20 returns the last 20.
        assert!(!has_next(40, 20, 20));
        assert!(has_next(41, 20, 20));
        assert!(!has_next(0, 0, 0));
    }
}
