use serde::Serialize;

/// Fixed-size, 1-indexed pages over a borrowed list.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: usize,
}

/// One page of a [`Paginator`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total: usize,
}

impl<T> Page<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 1 && self.page_index <= self.page_count
    }
}

impl<'a, T> Paginator<'a, T> {
    pub fn new(items: &'a [T], page_size: usize) -> Self {
        Self { items, page_size }
    }

    /// Zero when the page size is zero
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.items.len().div_ceil(self.page_size)
    }

    /// Slice `[(n-1)*size, n*size)`; out of range gives an empty slice
    pub fn slice(&self, page_index: usize) -> &'a [T] {
        if page_index == 0 || page_index > self.page_count() {
            return &[];
        }
        let start = (page_index - 1) * self.page_size;
        let end = (start + self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    pub fn page(&self, page_index: usize) -> Page<'a, T> {
        Page {
            items: self.slice(page_index),
            page_index,
            page_size: self.page_size,
            page_count: self.page_count(),
            total: self.items.len(),
        }
    }

    pub fn has_next(&self, page_index: usize) -> bool {
        page_index < self.page_count()
    }

    pub fn has_previous(&self, page_index: usize) -> bool {
        page_index > 1 && page_index <= self.page_count()
    }
}
