use store::{OrderQuery, SearchScope};

/// Listing filters taken from query parameters.
///
/// Empty values are dropped. `status` and `size` are upper-cased and matched
/// exactly against stored codes, so `?status=in_transit` matches while
/// `?status=In Transit` does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilters {
    pub status: Option<String>,
    pub size: Option<String>,
    pub search: Option<String>,
}

impl OrderFilters {
    pub fn new(status: Option<&str>, size: Option<&str>, search: Option<&str>) -> Self {
        Self {
            status: non_empty(status).map(str::to_uppercase),
            size: non_empty(size).map(str::to_uppercase),
            search: non_empty(search).map(str::to_string),
        }
    }

    /// Applies the filters to `query`.
    pub fn apply(&self, mut query: OrderQuery, scope: SearchScope) -> OrderQuery {
        if let Some(status) = &self.status {
            query = query.order_status(status.as_str());
        }
        if let Some(size) = &self.size {
            query = query.size(size.as_str());
        }
        if let Some(search) = &self.search {
            query = query.search(search.as_str(), scope);
        }
        query
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
