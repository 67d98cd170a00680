use serde::{Deserialize, Serialize};

/// Paged list response.
///
/// `result` is `null` on the wire when the requested page lies past the last
/// one; the totals are still reported so clients can recover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub result: Option<Vec<T>>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
}

impl<T> Paginated<T> {
    pub fn is_out_of_range(&self) -> bool {
        self.result.is_none()
    }

    /// Converts the items while keeping the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            result: self.result.map(|items| items.into_iter().map(f).collect()),
            total: self.total,
            page: self.page,
            pages: self.pages,
            limit: self.limit,
        }
    }
}

/// `ceil(total / page_size)`, and 0 for an empty collection.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Wraps one page of items in the pagination envelope.
pub fn paginate<T>(items: Vec<T>, total: u64, page: u64, page_size: u64) -> Paginated<T> {
    let pages = total_pages(total, page_size);
    let out_of_range = pages != 0 && page > pages;

    Paginated {
        result: if out_of_range { None } else { Some(items) },
        total,
        page,
        pages,
        limit: page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_first_of_three_pages() {
        let page = paginate(vec![1; 10], 25, 1, 10);

        assert_eq!(page.pages, 3);
        assert_eq!(page.total, 25);
        assert_eq!(page.limit, 10);
        assert_eq!(page.result.as_ref().map(Vec::len), Some(10));
    }

    #[test]
    fn test_page_past_the_end_is_null() {
        let page = paginate(Vec::<u32>::new(), 25, 4, 10);

        assert!(page.is_out_of_range());
        assert_eq!(page.pages, 3);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 4);

        let json = serde_json::to_value(&page).expect("should serialize");
        assert!(json["result"].is_null());
        assert_eq!(json["total"], 25);
    }

    #[test]
    fn test_empty_collection_is_never_out_of_range() {
        let page = paginate(Vec::<u32>::new(), 0, 7, 10);

        assert_eq!(page.pages, 0);
        assert_eq!(page.result, Some(Vec::new()));

        let json = serde_json::to_value(&page).expect("should serialize");
        assert_eq!(json["result"], serde_json::json!([]));
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(25, 10, 3)]
    #[case(5, 1, 5)]
    #[case(u64::MAX, u64::MAX, 1)]
    fn test_total_pages(#[case] total: u64, #[case] size: u64, #[case] expected: u64) {
        assert_eq!(total_pages(total, size), expected);
    }

    #[test]
    fn test_last_partial_page_is_in_range() {
        let page = paginate(vec!["a"; 5], 25, 3, 10);
        assert!(!page.is_out_of_range());
    }

    #[test]
    fn test_map_keeps_envelope() {
        let page = paginate(vec![1, 2], 12, 2, 10).map(|n| n * 10);

        assert_eq!(page.result, Some(vec![10, 20]));
        assert_eq!((page.total, page.page, page.pages, page.limit), (12, 2, 2, 10));
    }
}
