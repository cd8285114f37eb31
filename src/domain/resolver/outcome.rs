use crate::domain::record::FilterSpec;

/// Result of a resolution plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOutcome<T> {
    pub value: T,
    /// True when no backing-store fetch was needed
    pub from_cache: bool,
}

impl<T> ResolutionOutcome<T> {
    pub fn cached(value: T) -> Self {
        Self {
            value,
            from_cache: true,
        }
    }

    pub fn fetched(value: T) -> Self {
        Self {
            value,
            from_cache: false,
        }
    }

    pub fn new(value: T, from_cache: bool) -> Self {
        Self { value, from_cache }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResolutionOutcome<U> {
        ResolutionOutcome {
            value: f(self.value),
            from_cache: self.from_cache,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Parameters of a listing request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: FilterSpec,
    /// 1-based page number; only page-scoped resolvers read it
    pub page: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    pub fn page(mut self, number: u32) -> Self {
        self.page = Some(number);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_source_flag() {
        let outcome = ResolutionOutcome::cached(vec![1, 2, 3]).map(|v| v.len());

        assert_eq!(outcome.value, 3);
        assert!(outcome.from_cache);
    }

    #[test]
    fn test_fetched_is_not_from_cache() {
        assert!(!ResolutionOutcome::fetched(()).from_cache);
    }

    #[test]
    fn test_list_query_builder() {
        let query = ListQuery::new()
            .with_filter(FilterSpec::new().with("status", "active"))
            .page(3);

        assert_eq!(query.page, Some(3));
        assert_eq!(query.filter.len(), 1);
    }
}
