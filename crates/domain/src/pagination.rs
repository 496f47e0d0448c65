//! Page-number pagination for order listings.

/// Page size used when the client gives none, or an unusable one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 50;

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Creates a page request. The page size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Resolves raw query parameters.
    ///
    /// A missing or empty `page` means page 1; any other value that is not a
    /// positive integer is rejected with `None`. A `page_size` that is
    /// missing, non-numeric or non-positive falls back to the default, and
    /// anything above the ceiling is capped.
    pub fn from_params(page: Option<&str>, page_size: Option<&str>) -> Option<Self> {
        let page = match page.map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw.parse::<u32>().ok().filter(|p| *p >= 1)?,
        };

        let page_size = page_size
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(i64::from(MAX_PAGE_SIZE)) as u32)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Some(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Rows on a full page.
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// Returns true if this page exists in a result set of `total` rows.
    /// Page 1 always exists, even when the set is empty.
    pub fn is_within(&self, total: u64) -> bool {
        self.page == 1 || self.offset() < total
    }
}

/// One page of results together with the size of the whole set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Number of the following page, if there is one.
    pub fn next(&self) -> Option<u32> {
        let seen = u64::from(self.page) * u64::from(self.page_size);
        (seen < self.count).then(|| self.page + 1)
    }

    /// Number of the preceding page, if there is one.
    pub fn previous(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    /// Transforms every result, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
