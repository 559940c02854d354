use serde::Serialize;

/// Fixed row count per table page.
pub const PAGE_SIZE: usize = 10;

/// Current table page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub page: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self { page: 1 }
    }
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size)
}

/// The contiguous slice of `items` shown on `page`. Out-of-range pages
/// yield an empty slice.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

/// Tracks the page-select dropdown so it is only rebuilt when the page
/// count actually changes; otherwise the selection is merely reasserted.
/// Rebuilding on every redraw would drop the control's focus state.
#[derive(Debug, Default)]
pub struct PaginationControls {
    option_count: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DropdownUpdate {
    Rebuild,
    Reselect,
}

impl PaginationControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile(&mut self, total_pages: usize) -> DropdownUpdate {
        if self.option_count != total_pages {
            self.option_count = total_pages;
            DropdownUpdate::Rebuild
        } else {
            DropdownUpdate::Reselect
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_25_items_into_10_10_5() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(total_pages(items.len(), PAGE_SIZE), 3);
        assert_eq!(page_slice(&items, 1, PAGE_SIZE).len(), 10);
        assert_eq!(page_slice(&items, 2, PAGE_SIZE).len(), 10);
        assert_eq!(page_slice(&items, 3, PAGE_SIZE).len(), 5);
        assert_eq!(page_slice(&items, 4, PAGE_SIZE).len(), 0);
    }

    #[test]
    fn concatenated_pages_reproduce_the_input_exactly_once() {
        let items: Vec<u32> = (0..47).collect();
        let pages = total_pages(items.len(), PAGE_SIZE);

        let mut rebuilt = Vec::new();
        for page in 1..=pages {
            rebuilt.extend_from_slice(page_slice(&items, page, PAGE_SIZE));
        }
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn empty_input_has_zero_pages() {
        let items: Vec<u32> = Vec::new();
        assert_eq!(total_pages(items.len(), PAGE_SIZE), 0);
        assert_eq!(page_slice(&items, 1, PAGE_SIZE).len(), 0);
    }

    #[test]
    fn dropdown_rebuilds_only_when_page_count_changes() {
        let mut controls = PaginationControls::new();
        // first render always populates the empty dropdown
        assert_eq!(controls.reconcile(3), DropdownUpdate::Rebuild);
        assert_eq!(controls.reconcile(3), DropdownUpdate::Reselect);
        assert_eq!(controls.reconcile(3), DropdownUpdate::Reselect);
        assert_eq!(controls.reconcile(4), DropdownUpdate::Rebuild);
        assert_eq!(controls.reconcile(4), DropdownUpdate::Reselect);
        assert_eq!(controls.reconcile(0), DropdownUpdate::Rebuild);
    }
}
