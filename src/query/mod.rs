//! List-query normalization
//!
//! Turns raw query-string parameters (`q`, `device`, `sort`, `page`, `limit`)
//! into a canonical [`ListQuery`]. Normalization never fails: anything
//! unparsable falls back to its default.

pub mod pagination;

pub use pagination::{paginate, total_pages, Paginated};

use crate::db::{Filter, SortDirection, StoreQuery};
use crate::inventory::DeviceKind;
use std::collections::HashMap;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Which document fields a list query may touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchTarget {
    /// Field matched against the search text
    pub name_field: Option<&'static str>,
    /// Field holding the device kind, for collections spanning several kinds
    pub kind_field: Option<&'static str>,
}

impl SearchTarget {
    pub const fn named(field: &'static str) -> Self {
        Self {
            name_field: Some(field),
            kind_field: None,
        }
    }

    pub const fn with_kind_field(mut self, field: &'static str) -> Self {
        self.kind_field = Some(field);
        self
    }
}

/// Canonical list parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Trimmed and lower-cased; empty means no search
    pub search: String,
    pub device: Option<DeviceKind>,
    pub sort: SortDirection,
    pub page: u64,
    pub page_size: u64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            device: None,
            sort: SortDirection::Ascending,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Looks a parameter up by name, ignoring ASCII case.
///
/// An exact lower-case key wins; otherwise the lexically smallest matching key
/// is used so the outcome never depends on map iteration order.
fn param(params: &HashMap<String, String>, name: &str) -> Option<String> {
    params
        .get(name)
        .or_else(|| {
            params
                .iter()
                .filter(|(key, _)| key.eq_ignore_ascii_case(name))
                .min_by(|a, b| a.0.cmp(b.0))
                .map(|(_, value)| value)
        })
        .map(|value| value.trim().to_lowercase())
}

fn positive_or(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

impl ListQuery {
    /// Builds a query from raw parameters.
    pub fn normalize(params: &HashMap<String, String>) -> Self {
        let search = param(params, "q").unwrap_or_default();

        let device = param(params, "device").and_then(|d| d.parse::<DeviceKind>().ok());

        let sort = match param(params, "sort").as_deref() {
            Some("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };

        Self {
            search,
            device,
            sort,
            page: positive_or(param(params, "page"), DEFAULT_PAGE),
            page_size: positive_or(param(params, "limit"), DEFAULT_PAGE_SIZE),
        }
    }

    /// Pins the device filter, overriding whatever the client sent.
    pub fn for_device(mut self, kind: DeviceKind) -> Self {
        self.device = Some(kind);
        self
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Conditions for both the page query and the total count.
    pub fn filter(&self, target: SearchTarget) -> Filter {
        let mut filter = Filter::new();

        if let (Some(field), Some(kind)) = (target.kind_field, self.device) {
            filter = filter.eq(field, kind.as_str());
        }

        if let Some(field) = target.name_field {
            if !self.search.is_empty() {
                filter = filter.contains(field, &self.search);
            }
        }

        filter
    }

    pub fn to_store_query(&self, target: SearchTarget) -> StoreQuery {
        StoreQuery {
            filter: self.filter(target),
            skip: self.skip(),
            limit: self.page_size,
            sort: self.sort,
        }
    }
}
