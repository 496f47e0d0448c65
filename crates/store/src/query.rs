use crate::{OrderRecord, UserId};

/// Which columns the free-text `search` filter looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Substring of the order id only.
    #[default]
    OrderId,
    /// Substring of the order id, or case-insensitive substring of the
    /// owner's username.
    OrderIdOrUsername,
}

/// Builder for order listing queries.
///
/// All filters are optional and combined with AND. Results are always
/// ordered newest first (`created_at` descending, then id descending).
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Restrict to orders owned by this user.
    pub customer_id: Option<UserId>,

    /// Exact match against the stored status code.
    pub order_status: Option<String>,

    /// Exact match against the stored size code.
    pub size: Option<String>,

    /// Free-text search, interpreted according to `search_scope`.
    pub search: Option<String>,

    pub search_scope: SearchScope,

    /// Maximum number of orders to return.
    pub limit: Option<usize>,

    /// Number of orders to skip.
    pub offset: Option<usize>,
}

impl OrderQuery {
    /// Creates a new unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query over a single customer's orders.
    pub fn for_customer(customer_id: UserId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    /// Filters by exact status code.
    pub fn order_status(mut self, code: impl Into<String>) -> Self {
        self.order_status = Some(code.into());
        self
    }

    /// Filters by exact size code.
    pub fn size(mut self, code: impl Into<String>) -> Self {
        self.size = Some(code.into());
        self
    }

    /// Filters by free-text search.
    pub fn search(mut self, text: impl Into<String>, scope: SearchScope) -> Self {
        self.search = Some(text.into());
        self.search_scope = scope;
        self
    }

    /// Limits the number of orders returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many orders before returning results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// One window of a listing plus the size of the whole filtered set.
#[derive(Debug, Clone, Default)]
pub struct OrderSlice {
    /// Number of orders matching the filters, ignoring limit and offset.
    pub total: u64,
    pub records: Vec<OrderRecord>,
}

/// Escapes `%`, `_` and `\` so user text is matched literally by `LIKE`.
pub(crate) fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_for_customer() {
        let query = OrderQuery::for_customer(UserId::new(3));

        assert_eq!(query.customer_id, Some(UserId::new(3)));
        assert!(query.order_status.is_none());
        assert!(query.search.is_none());
    }

    #[test]
    fn query_builder_chain() {
        let query = OrderQuery::new()
            .order_status("PENDING")
            .size("LARGE")
            .search("ali", SearchScope::OrderIdOrUsername)
            .limit(10)
            .offset(20);

        assert_eq!(query.order_status.as_deref(), Some("PENDING"));
        assert_eq!(query.size.as_deref(), Some("LARGE"));
        assert_eq!(query.search.as_deref(), Some("ali"));
        assert_eq!(query.search_scope, SearchScope::OrderIdOrUsername);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.offset, Some(20));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ab"), "%ab%");
        assert_eq!(like_pattern("50%_x"), "%50\\%\\_x%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
