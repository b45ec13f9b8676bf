//! Paginator.

/// One page of an ordered sequence plus its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub visible: &'a [T],
    pub page_count: usize,
    /// The requested page, clamped to `1..=page_count`.
    pub clamped_page: usize,
    /// Zero-based offset of the first visible item.
    pub start: usize,
    pub total: usize,
}

impl<T> Page<'_, T> {
    /// 1-based inclusive range of items shown, or `None` when empty.
    ///
    /// ```
    /// use plasmid_browser::view::paginate;
    ///
    /// let items: Vec<u32> = (1..=120).collect();
    /// let page = paginate(&items, 50, 3);
    /// assert_eq!(page.showing(), Some((101, 120)));
    /// ```
    #[must_use]
    pub fn showing(&self) -> Option<(usize, usize)> {
        if self.total == 0 {
            return None;
        }
        Some((self.start + 1, self.start + self.visible.len()))
    }

    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.clamped_page <= 1
    }

    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.clamped_page >= self.page_count
    }
}

/// Number of pages needed for `total` items; never zero.
#[must_use]
pub const fn page_count(total: usize, page_size: usize) -> usize {
    let size = if page_size == 0 { 1 } else { page_size };
    let pages = total.div_ceil(size);
    if pages == 0 {
        1
    } else {
        pages
    }
}

/// Clamps a 1-based page index into `1..=page_count`.
#[must_use]
pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

/// Slices `items` into the requested page.
///
/// A `page_size` of zero is treated as one. Never fails.
#[must_use]
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    let size = page_size.max(1);
    let total = items.len();
    let page_count = page_count(total, size);
    let clamped_page = clamp_page(page, page_count);
    let start = (clamped_page - 1) * size;
    let end = total.min(start + size);

    Page {
        visible: items.get(start..end).unwrap_or(&[]),
        page_count,
        clamped_page,
        start,
        total,
    }
}
