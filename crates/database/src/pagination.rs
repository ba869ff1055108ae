//! Page-number pagination for listing queries.

use serde::Serialize;

/// Splits a listing into fixed-size pages.
///
/// Page lookup is forgiving: a missing or malformed page number falls back to
/// the first page and an out-of-range number falls back to the last one.
///
/// ```
/// use yatube_database::Paginator;
///
/// let paginator = Paginator::new(10);
/// let window = paginator.window(13, Some("2"));
/// assert_eq!(window.number, 2);
/// assert_eq!(window.limit, 10);
/// assert_eq!(window.offset, 10);
/// assert_eq!(window.num_pages, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

/// The slice of a listing selected for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn num_pages(&self, count: i64) -> i64 {
        let per_page = self.per_page as i64;
        if count <= 0 {
            return 1;
        }
        (count + per_page - 1) / per_page
    }

    pub fn window(&self, count: i64, requested: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(value)) if value < 1 || value > num_pages => num_pages,
            Some(Ok(value)) => value,
        };
        let limit = self.per_page as i64;

        PageWindow {
            number,
            num_pages,
            limit,
            offset: (number - 1) * limit,
        }
    }
}

/// One page of results plus the navigation data templates need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<i64>,
    pub next_page_number: Option<i64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, count: i64) -> Self {
        let has_previous = window.number > 1;
        let has_next = window.number < window.num_pages;

        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            count,
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| window.number - 1),
            next_page_number: has_next.then(|| window.number + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn page_range(&self) -> std::ops::RangeInclusive<i64> {
        1..=self.num_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_still_has_one_page() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.num_pages(0), 1);

        let window = paginator.window(0, Some("3"));
        assert_eq!(window.number, 1);
        assert_eq!(window.offset, 0);
    }

    #[test]
    fn thirteen_items_split_into_ten_and_three() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.num_pages(13), 2);

        let first = paginator.window(13, None);
        assert_eq!((first.number, first.offset), (1, 0));

        let second = paginator.window(13, Some("2"));
        assert_eq!((second.number, second.offset), (2, 10));
    }

    #[test]
    fn malformed_page_falls_back_to_first() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.window(40, Some("abc")).number, 1);
        assert_eq!(paginator.window(40, Some("")).number, 1);
    }

    #[test]
    fn out_of_range_page_falls_back_to_last() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.window(40, Some("99")).number, 4);
        assert_eq!(paginator.window(40, Some("0")).number, 4);
        assert_eq!(paginator.window(40, Some("-2")).number, 4);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let paginator = Paginator::new(0);
        assert_eq!(paginator.per_page(), 1);
    }

    #[test]
    fn page_navigation_flags() {
        let paginator = Paginator::new(10);
        let window = paginator.window(25, Some("2"));
        let page = Page::new(vec![(); 10], window, 25);

        assert!(page.has_previous);
        assert!(page.has_next);
        assert_eq!(page.previous_page_number, Some(1));
        assert_eq!(page.next_page_number, Some(3));
        assert_eq!(page.page_range().count(), 3);
    }
}
