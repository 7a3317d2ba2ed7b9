// ============================================================================
// Filter, Sort & Pagination Criteria
// ============================================================================
//
// Pure value types describing which slice of the remote data set the grid
// shows. Any change to filters or sorting starts again at page 1.
//
// ============================================================================

use chrono::NaiveDate;
use std::fmt;

/// Rows per page requested by the dashboard.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Filter values shared by the page query and the totals query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub employee: Option<String>,
    pub customer: Option<String>,
}

/// Partial update of [`Filters`].
///
/// For each field `None` leaves the current value alone and `Some(None)`
/// clears it. Blank strings count as clearing. The sort key travels with the
/// filters so a new query can be issued as a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaPatch {
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub status: Option<Option<String>>,
    pub employee: Option<Option<String>>,
    pub customer: Option<Option<String>>,
    pub sort: Option<Option<SortKey>>,
}

impl CriteriaPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn status(mut self, value: Option<&str>) -> Self {
        self.status = Some(normalize(value));
        self
    }

    pub fn employee(mut self, value: Option<&str>) -> Self {
        self.employee = Some(normalize(value));
        self
    }

    pub fn customer(mut self, value: Option<&str>) -> Self {
        self.customer = Some(normalize(value));
        self
    }

    pub fn sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort = Some(Some(SortKey {
            field: field.to_string(),
            direction,
        }));
        self
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Everything needed to request one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    pub filters: Filters,
    pub page: u32,
    pub page_size: u32,
    pub sort: Option<SortKey>,
}

impl Default for Criteria {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Criteria {
    pub fn new(page_size: u32) -> Self {
        Self {
            filters: Filters::default(),
            page: 1,
            page_size: page_size.max(1),
            sort: None,
        }
    }

    /// Merge a patch and go back to the first page.
    pub fn apply(&mut self, patch: CriteriaPatch) {
        let filters = &mut self.filters;
        if let Some(v) = patch.start_date {
            filters.start_date = v;
        }
        if let Some(v) = patch.end_date {
            filters.end_date = v;
        }
        if let Some(v) = patch.status {
            filters.status = v;
        }
        if let Some(v) = patch.employee {
            filters.employee = v;
        }
        if let Some(v) = patch.customer {
            filters.customer = v;
        }
        if let Some(sort) = patch.sort {
            self.sort = sort;
        }
        self.page = 1;
    }

    /// Sort by `field`; asking for the current field again flips direction.
    pub fn toggle_sort(&mut self, field: &str) -> &SortKey {
        let direction = match &self.sort {
            Some(current) if current.field == field => current.direction.flipped(),
            _ => SortDirection::Asc,
        };
        self.page = 1;
        self.sort.insert(SortKey {
            field: field.to_string(),
            direction,
        })
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// Position within the result set of the last successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl Pagination {
    pub fn empty(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total_count.div_ceil(u64::from(self.page_size.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_merges_and_resets_page() {
        let mut criteria = Criteria::default().with_page(4);
        criteria.apply(CriteriaPatch::new().status(Some("Sim")).employee(Some("Ana")));
        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.filters.status.as_deref(), Some("Sim"));

        criteria.apply(CriteriaPatch::new().employee(Some("  ")));
        assert_eq!(criteria.filters.status.as_deref(), Some("Sim"));
        assert_eq!(criteria.filters.employee, None);
    }

    #[test]
    fn test_toggle_sort() {
        let mut criteria = Criteria::default();
        assert_eq!(criteria.toggle_sort("schedule_date").direction, SortDirection::Asc);
        assert_eq!(criteria.toggle_sort("schedule_date").direction, SortDirection::Desc);

        let key = criteria.toggle_sort("other_field").clone();
        assert_eq!(key.field, "other_field");
        assert_eq!(key.direction, SortDirection::Asc);
    }

    #[test]
    fn test_patch_sets_sort_and_keeps_filters() {
        let mut criteria = Criteria::default().with_page(2);
        criteria.apply(CriteriaPatch::new().status(Some("Sim")));
        criteria.apply(CriteriaPatch::new().sort("gross_total", SortDirection::Desc));

        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.filters.status.as_deref(), Some("Sim"));
        assert_eq!(
            criteria.sort,
            Some(SortKey {
                field: "gross_total".to_string(),
                direction: SortDirection::Desc,
            })
        );

        criteria.apply(CriteriaPatch::new().employee(Some("Ana")));
        assert_eq!(criteria.sort.as_ref().map(|s| s.direction), Some(SortDirection::Desc));
    }

    #[test]
    fn test_toggle_sort_resets_page() {
        let mut criteria = Criteria::default().with_page(3);
        criteria.toggle_sort("gross_total");
        assert_eq!(criteria.page, 1);
    }

    #[test]
    fn test_total_pages() {
        let mut pagination = Pagination::empty(30);
        assert_eq!(pagination.total_pages(), 0);
        assert!(!pagination.contains(1));

        pagination.total_count = 65;
        assert_eq!(pagination.total_pages(), 3);
        assert!(pagination.contains(3));
        assert!(!pagination.contains(4));
        assert!(!pagination.contains(0));

        pagination.total_count = 60;
        assert_eq!(pagination.total_pages(), 2);
    }

    #[test]
    fn test_prev_next() {
        let pagination = Pagination {
            current_page: 1,
            page_size: 30,
            total_count: 31,
        };
        assert!(!pagination.has_prev());
        assert!(pagination.has_next());
    }
}
