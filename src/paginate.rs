/// Posts per page on every listing.
pub const PAGE_SIZE: i64 = 10;

/// One page of an ordered listing.
///
/// An empty listing still has a single empty page. A page number that does
/// not parse falls back to the first page; one outside the listing falls back
/// to the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
}

impl Page {
    pub fn get(count: i64, per_page: i64, requested: Option<&str>) -> Self {
        let num_pages = if count <= 0 { 1 } else { (count + per_page - 1) / per_page };

        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n < 1 || n > num_pages => num_pages,
            Some(Ok(n)) => n,
        };

        Self {
            number,
            num_pages,
            count,
            per_page,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn previous(&self) -> Option<i64> {
        (self.number > 1).then(|| self.number - 1)
    }

    pub fn next(&self) -> Option<i64> {
        (self.number < self.num_pages).then(|| self.number + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_has_one_page() {
        let page = Page::get(0, PAGE_SIZE, None);
        assert_eq!((page.number, page.num_pages, page.offset()), (1, 1, 0));
        assert_eq!(page.previous(), None);
        assert_eq!(page.next(), None);
    }

    #[test]
    fn out_of_range_pages_clamp_to_last() {
        assert_eq!(Page::get(25, PAGE_SIZE, Some("9")).number, 3);
        assert_eq!(Page::get(25, PAGE_SIZE, Some("0")).number, 3);
        assert_eq!(Page::get(25, PAGE_SIZE, Some("-2")).number, 3);
    }

    #[test]
    fn malformed_pages_fall_back_to_first() {
        assert_eq!(Page::get(25, PAGE_SIZE, Some("two")).number, 1);
        assert_eq!(Page::get(25, PAGE_SIZE, Some("")).number, 1);
    }

    #[test]
    fn middle_page_links_both_ways() {
        let page = Page::get(25, PAGE_SIZE, Some("2"));
        assert_eq!(page.offset(), 10);
        assert_eq!(page.previous(), Some(1));
        assert_eq!(page.next(), Some(3));
    }
}
