/// Rows shown per earnings page.
pub const PAGE_SIZE: usize = 12;

/// Client-side pages over a fully fetched list. Pages are 1-based.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    page: usize,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>) -> Self {
        Paginator { items, page: 1 }
    }

    /// At least one, so an empty list still has a (blank) first page.
    pub fn last_page(&self) -> usize {
        self.items.len().div_ceil(PAGE_SIZE).max(1)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Moves to `page`, clamped into `1..=last_page`.
    pub fn go_to(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.last_page());
        self.page
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.page + 1)
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.page.saturating_sub(1))
    }

    pub fn current(&self) -> &[T] {
        let start = (self.page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.items.len());
        self.items.get(start..end).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_hold_twelve_rows() {
        let mut pages = Paginator::new((1..=25).collect::<Vec<_>>());
        assert_eq!(pages.last_page(), 3);
        assert_eq!(pages.current().len(), 12);
        pages.go_to(3);
        assert_eq!(pages.current(), &[25]);
    }

    #[test]
    fn page_index_is_clamped() {
        let mut pages = Paginator::new((1..=13).collect::<Vec<_>>());
        assert_eq!(pages.go_to(0), 1);
        assert_eq!(pages.go_to(99), 2);
        assert_eq!(pages.next(), 2);
        assert_eq!(pages.prev(), 1);
        assert_eq!(pages.prev(), 1);
    }

    #[test]
    fn empty_list_has_one_blank_page() {
        let pages: Paginator<u8> = Paginator::new(Vec::new());
        assert_eq!(pages.last_page(), 1);
        assert!(pages.current().is_empty());
    }
}
